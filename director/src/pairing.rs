//! Single-window pairing transport.
//!
//! Mirrors the command protocol over a direct window-to-window channel:
//! handlers validate, mutate the session, and return the reply message for
//! the dispatch layer to post. Mutating messages answer with an updated
//! `DECO_LIST_UPDATE` so the paired controller re-renders immediately.

use protocol::WindowMessage;

use crate::session::DirectorSession;

/// Handle one inbound pairing message, returning the reply to post back,
/// if any. `DECO_LIST_UPDATE` is outbound-only and yields no reply.
pub fn handle_window_message(
    session: &mut DirectorSession,
    message: &WindowMessage,
) -> Option<WindowMessage> {
    match message {
        WindowMessage::RequestDecoList => Some(deco_list_update(session)),
        WindowMessage::DecoSelect { id } => {
            if id.as_str().is_empty() {
                session.clear_selection();
            } else {
                // Unknown id leaves the selection untouched (semantic no-op).
                let _ = session.select(vec![id.clone()]);
            }
            Some(deco_list_update(session))
        }
        WindowMessage::DecoControl { id, action, direction } => {
            session.control_deco(id, *action, *direction);
            Some(deco_list_update(session))
        }
        WindowMessage::DecoListUpdate { .. } => None,
    }
}

fn deco_list_update(session: &DirectorSession) -> WindowMessage {
    let snapshot = session.snapshot();
    WindowMessage::DecoListUpdate {
        data: snapshot.deco_list,
        scene: snapshot.scene,
        selected_id: snapshot.selected_ids.first().cloned(),
    }
}

#[cfg(test)]
#[path = "pairing_test.rs"]
mod tests;

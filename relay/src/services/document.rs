//! Document service — per-field merge and command stamping.
//!
//! DESIGN
//! ======
//! The session document is last-writer-wins per field: the director owns
//! `pcState`, controllers own `command`, and neither write ever clobbers
//! the other field. Commands are stamped with a strictly monotonic
//! timestamp on write, so the director can reject replays with a single
//! comparison. Mutation and fan-out both happen under the session write
//! lock, which gives every subscriber events in hub write order.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use protocol::{Command, CommandEnvelope, PcState, SessionId, StoreEvent};

use crate::services::session::notify;
use crate::state::AppState;

/// Upsert `pcState` in the session document. Creates the session if it
/// does not exist yet; the outstanding `command` is left untouched.
pub async fn publish_snapshot(state: &AppState, session: &SessionId, pc_state: PcState) {
    let mut sessions = state.sessions.write().await;
    let entry = sessions.entry(session.clone()).or_default();
    entry.doc.pc_state = Some(pc_state);
    entry.last_write = Instant::now();
    notify(entry, &StoreEvent::Changed { doc: entry.doc.clone() });
}

/// Upsert `command`, stamped with the current wall clock.
pub async fn send_command(state: &AppState, session: &SessionId, command: Command) {
    send_command_at(state, session, command, unix_millis()).await;
}

/// Upsert `command` at an explicit clock reading.
///
/// The stamp is `max(now_ms, previous + 1)`: wall-clock milliseconds when
/// the clock is ahead, a bump past the previous stamp otherwise. Strictly
/// monotonic per session even across same-millisecond writes and clock
/// regressions.
pub async fn send_command_at(state: &AppState, session: &SessionId, command: Command, now_ms: i64) {
    let mut sessions = state.sessions.write().await;
    let entry = sessions.entry(session.clone()).or_default();
    let previous = entry.doc.command.as_ref().map_or(0, |envelope| envelope.timestamp);
    let timestamp = now_ms.max(previous + 1);
    entry.doc.command = Some(CommandEnvelope { command, timestamp });
    entry.last_write = Instant::now();
    notify(entry, &StoreEvent::Changed { doc: entry.doc.clone() });
}

/// Wall clock in Unix milliseconds.
fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
}

#[cfg(test)]
#[path = "document_test.rs"]
mod tests;

//! Message set for the single-window pairing transport.
//!
//! When director and controller run in the same browsing context they talk
//! over a direct window-to-window channel instead of the shared session
//! document. The message set mirrors the command protocol: a request/reply
//! pair for the deco list plus targeted select and control messages.

use serde::{Deserialize, Serialize};

use crate::{DecoId, DecoRef, Direction, MultiAction};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WindowMessage {
    /// Controller asks the director for the current deco list.
    RequestDecoList,
    /// Director publishes the current list, scene, and primary selection.
    DecoListUpdate {
        data: Vec<DecoRef>,
        scene: i32,
        #[serde(rename = "selectedId")]
        selected_id: Option<DecoId>,
    },
    /// Single-select one item; an empty id clears the selection.
    DecoSelect { id: DecoId },
    /// Fixed-step nudge/rotate/scale of one item.
    DecoControl {
        id: DecoId,
        action: MultiAction,
        direction: Direction,
    },
}

#[cfg(test)]
#[path = "window_test.rs"]
mod tests;

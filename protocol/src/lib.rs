//! Shared wire model for the director/controller sync protocol.
//!
//! This crate owns the representation used by `director`, `controller`,
//! `relay`, and `cli`: the controller→director command vocabulary, the
//! director→controller snapshot shape, the session document held by the
//! relay, and the store request/event frames that move both over the wire.
//! Everything here is plain JSON over text frames; field names are pinned
//! with serde renames so the wire shape never drifts with Rust naming.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod transform;
pub mod window;

pub use transform::{to_canvas_space, to_controller_space};
pub use window::WindowMessage;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The session id is empty, too long, or contains forbidden characters.
    #[error("invalid session id: {0:?}")]
    InvalidSessionId(String),
}

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Opaque decoration identifier, assigned by the director at creation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecoId(String);

impl DecoId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DecoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DecoId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

const SESSION_ID_MAX_LEN: usize = 64;

/// Validated session identifier binding one director to its controllers.
///
/// Carried as the `?session=` query parameter; restricted to ASCII
/// alphanumerics plus `-` and `_`, at most 64 characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SessionId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = !s.is_empty()
            && s.len() <= SESSION_ID_MAX_LEN
            && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(s.to_owned()))
        } else {
            Err(ProtocolError::InvalidSessionId(s.to_owned()))
        }
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// COORDINATE SPACES
// =============================================================================

/// A position in director canvas space, normalized to `[0,1]²`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasPoint {
    pub x: f64,
    pub y: f64,
}

/// A position in controller touch-pad space, normalized to `[0,1]²`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MobilePoint {
    pub x: f64,
    pub y: f64,
}

// =============================================================================
// SNAPSHOT (director → controller)
// =============================================================================

/// Controller-facing projection of one decoration.
///
/// Positions are already in controller space so the controller renders
/// without knowing the canvas orientation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecoRef {
    pub id: DecoId,
    pub x_mobile: f64,
    pub y_mobile: f64,
}

/// Full director→controller state publication.
///
/// Leveled, not event-sourced: every publish carries the whole current
/// scene so a dropped intermediate snapshot is healed by the next one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PcState {
    pub scene: i32,
    #[serde(rename = "decoList")]
    pub deco_list: Vec<DecoRef>,
    #[serde(rename = "selectedIds")]
    pub selected_ids: Vec<DecoId>,
}

// =============================================================================
// COMMANDS (controller → director)
// =============================================================================

/// Single-item control verb. Only `move` exists today; the enum keeps the
/// wire field explicit so new verbs don't change the payload shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OneAction {
    Move,
}

/// Fixed-step control verb applied to the whole selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiAction {
    Move,
    Rotate,
    Scale,
}

/// Step direction for [`MultiAction`], in screen coordinates (y grows down).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A controller→director instruction.
///
/// At-most-one-outstanding: a new command overwrites the previous one in
/// the session document, it is never queued.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "snake_case")]
pub enum Command {
    /// Replace the selection with the given set. An empty list clears.
    SelectMulti { ids: Vec<DecoId> },
    /// Move one selected item to a controller-space position.
    ControlOne {
        id: DecoId,
        action: OneAction,
        x_mobile: f64,
        y_mobile: f64,
    },
    /// Apply a fixed-step nudge/rotate/scale to every selected item.
    ControlMulti {
        action: MultiAction,
        direction: Direction,
    },
    /// Remove all selected items from the current scene.
    DeleteMulti,
}

/// A [`Command`] as stored in the session document, stamped by the relay.
///
/// Timestamps are strictly monotonic per session, so the director can
/// ignore replays and out-of-date overwrites with a single comparison.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    #[serde(flatten)]
    pub command: Command,
    pub timestamp: i64,
}

// =============================================================================
// SESSION DOCUMENT
// =============================================================================

/// The shared last-writer-wins document, one per session.
///
/// `command` and `pc_state` are written by opposite sides and merged per
/// field; publishing a snapshot never clobbers the outstanding command.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionDoc {
    #[serde(default)]
    pub command: Option<CommandEnvelope>,
    #[serde(rename = "pcState", default)]
    pub pc_state: Option<PcState>,
}

// =============================================================================
// STORE WIRE OPS (client ↔ relay)
// =============================================================================

/// Client→relay request carried as one JSON text frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StoreRequest {
    /// Upsert `pcState` in the session document (director side).
    PublishSnapshot {
        #[serde(rename = "pcState")]
        pc_state: PcState,
    },
    /// Upsert `command` in the session document (controller side).
    SendCommand { command: Command },
}

/// Relay→subscriber notification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StoreEvent {
    /// The session document changed; carries the full current document.
    Changed { doc: SessionDoc },
    /// The transport dropped. Synthesized client-side on connection loss so
    /// the UI shows "waiting" instead of stale state.
    Disconnected,
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;

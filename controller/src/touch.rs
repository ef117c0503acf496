//! Touch session tracker — per-identifier state machines with command
//! throttling.
//!
//! DESIGN
//! ======
//! Each physical touch identifier runs `Idle → Armed → Dragging → Idle`,
//! where Idle is represented by absence from the session map: a throttle
//! expiring after teardown finds nothing and is a no-op by construction.
//! Only selected pads arm, so an accidental finger on an unselected pad
//! can never start a drag.
//!
//! THROTTLING
//! ==========
//! Every move updates the local pad position immediately; the network
//! command is rate-limited to one `control_one` per 50 ms per touch via a
//! cool-down stamp armed on send. The position observed while the
//! cool-down is live is NOT flushed when it expires — the final
//! pre-release position may go untransmitted until the next move event or
//! the next director snapshot. This drop policy is intentional (leveled
//! state heals it); see DESIGN.md before changing the sampling.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use protocol::{Command, DecoId, OneAction};

/// Minimum spacing between `control_one` sends per touch identifier.
pub const COMMAND_COOLDOWN: Duration = Duration::from_millis(50);

// =============================================================================
// TYPES
// =============================================================================

/// Dimensions of the controller pad frame, in controller pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PadBounds {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchPhase {
    /// Touch started over a selected pad; no move seen yet.
    Armed,
    /// At least one move processed; the finger owns this pad's position.
    Dragging,
}

#[derive(Debug)]
struct TouchSession {
    pad: DecoId,
    phase: TouchPhase,
    cooldown_until: Option<Instant>,
}

/// Result of one processed move event.
#[derive(Clone, Debug, PartialEq)]
pub struct TouchMove {
    pub pad: DecoId,
    /// Clamped position in pad-frame pixels, applied locally right away.
    pub x: f64,
    pub y: f64,
    /// Throttled network command, present at most once per cool-down.
    pub command: Option<Command>,
}

/// All active touch sessions for one controller surface.
#[derive(Debug)]
pub struct TouchTracker {
    sessions: HashMap<u64, TouchSession>,
    bounds: PadBounds,
}

// =============================================================================
// TRACKER
// =============================================================================

impl TouchTracker {
    #[must_use]
    pub fn new(bounds: PadBounds) -> Self {
        Self { sessions: HashMap::new(), bounds }
    }

    #[must_use]
    pub fn bounds(&self) -> PadBounds {
        self.bounds
    }

    /// Touch-start over a pad. Arms only if the pad is selected; returns
    /// whether a session was created.
    pub fn touch_start(&mut self, touch: u64, pad: &DecoId, selected: bool) -> bool {
        if !selected {
            return false;
        }
        self.sessions.insert(
            touch,
            TouchSession { pad: pad.clone(), phase: TouchPhase::Armed, cooldown_until: None },
        );
        true
    }

    /// Process one move event at an explicit clock reading.
    ///
    /// Returns `None` for unknown identifiers (never armed, or already
    /// torn down). Positions are clamped to the pad frame.
    pub fn touch_move_at(&mut self, touch: u64, x: f64, y: f64, now: Instant) -> Option<TouchMove> {
        let session = self.sessions.get_mut(&touch)?;
        session.phase = TouchPhase::Dragging;

        let x = x.clamp(0.0, self.bounds.width);
        let y = y.clamp(0.0, self.bounds.height);

        let command = if session.cooldown_until.is_none_or(|until| now >= until) {
            session.cooldown_until = Some(now + COMMAND_COOLDOWN);
            Some(Command::ControlOne {
                id: session.pad.clone(),
                action: OneAction::Move,
                x_mobile: x / self.bounds.width,
                y_mobile: y / self.bounds.height,
            })
        } else {
            None
        };

        Some(TouchMove { pad: session.pad.clone(), x, y, command })
    }

    /// Touch-end/cancel: tear down the session without emitting a final
    /// command.
    pub fn touch_end(&mut self, touch: u64) {
        self.sessions.remove(&touch);
    }

    /// Force every session back to Idle (scene switch). No commands are
    /// emitted for Armed or Dragging touches.
    pub fn clear(&mut self) {
        self.sessions.clear();
    }

    #[must_use]
    pub fn phase(&self, touch: u64) -> Option<TouchPhase> {
        self.sessions.get(&touch).map(|s| s.phase)
    }

    #[must_use]
    pub fn is_dragging(&self, pad: &DecoId) -> bool {
        self.sessions
            .values()
            .any(|s| s.phase == TouchPhase::Dragging && s.pad == *pad)
    }

    /// Pads currently owned by a Dragging touch.
    #[must_use]
    pub fn dragging_pads(&self) -> HashSet<DecoId> {
        self.sessions
            .values()
            .filter(|s| s.phase == TouchPhase::Dragging)
            .map(|s| s.pad.clone())
            .collect()
    }

    #[must_use]
    pub fn active_touches(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
#[path = "touch_test.rs"]
mod tests;

//! Controller session — glue between store events, touch input, and pads.
//!
//! DESIGN
//! ======
//! The session holds the read-mirrored projection of director state:
//! connection status, current scene, the selection mirror, and the pad
//! set. Touch entry points return the `StoreRequest` to put on the wire,
//! if any — the session never performs I/O itself, so an embedding app
//! (or a test) owns the transport. Sends are fire-and-forget: a failed
//! write is the transport's problem and the next snapshot heals the view.

use std::collections::HashSet;
use std::time::Instant;

use protocol::{Command, DecoId, SessionId, StoreEvent, StoreRequest};
use tracing::debug;

use crate::config::ControllerConfig;
use crate::pads::PadSet;
use crate::touch::{PadBounds, TouchTracker};

/// Transport status, surfaced so the UI can show "waiting" instead of
/// silently rendering stale pads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

pub struct ControllerSession {
    session_id: SessionId,
    status: ConnectionStatus,
    scene: Option<i32>,
    selection: HashSet<DecoId>,
    tracker: TouchTracker,
    pads: PadSet,
    bounds: PadBounds,
}

impl ControllerSession {
    #[must_use]
    pub fn new(config: &ControllerConfig, bounds: PadBounds) -> Self {
        Self {
            session_id: config.session.clone(),
            status: ConnectionStatus::Connecting,
            scene: None,
            selection: HashSet::new(),
            tracker: TouchTracker::new(bounds),
            pads: PadSet::new(),
            bounds,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    #[must_use]
    pub fn scene(&self) -> Option<i32> {
        self.scene
    }

    #[must_use]
    pub fn selection(&self) -> &HashSet<DecoId> {
        &self.selection
    }

    #[must_use]
    pub fn pads(&self) -> &PadSet {
        &self.pads
    }

    #[must_use]
    pub fn tracker(&self) -> &TouchTracker {
        &self.tracker
    }

    // =========================================================================
    // STORE EVENTS
    // =========================================================================

    /// Apply one store event at an explicit clock reading.
    pub fn handle_event(&mut self, event: &StoreEvent, now: Instant) {
        match event {
            StoreEvent::Changed { doc } => {
                self.status = ConnectionStatus::Connected;
                let Some(pc_state) = &doc.pc_state else {
                    return;
                };

                if self.scene != Some(pc_state.scene) {
                    // Scene switch: every Armed/Dragging touch goes straight
                    // back to Idle, without a final command, so nothing stale
                    // can reference the old scene's ids.
                    if self.scene.is_some() {
                        debug!(
                            from = ?self.scene,
                            to = pc_state.scene,
                            "scene switch; clearing touches and selection"
                        );
                    }
                    self.tracker.clear();
                    self.selection.clear();
                    self.scene = Some(pc_state.scene);
                }

                self.selection = pc_state.selected_ids.iter().cloned().collect();
                let dragging = self.tracker.dragging_pads();
                self.pads
                    .reconcile(&pc_state.deco_list, &self.selection, &dragging, self.bounds, now);
            }
            StoreEvent::Disconnected => {
                self.status = ConnectionStatus::Disconnected;
            }
        }
    }

    /// Advance pad animations (entry promotion, exit removal).
    pub fn sweep(&mut self, now: Instant) {
        self.pads.sweep(now);
    }

    // =========================================================================
    // TOUCH EVENTS
    // =========================================================================

    /// Touch-start over a pad. A selected pad arms a drag session; a tap
    /// on an unselected pad single-selects it instead.
    pub fn touch_start(&mut self, touch: u64, pad: &DecoId) -> Option<StoreRequest> {
        if self.selection.contains(pad) {
            self.tracker.touch_start(touch, pad, true);
            return None;
        }
        if !self.pads.contains(pad) {
            debug!(%pad, "touch-start on unknown pad; ignored");
            return None;
        }
        Some(StoreRequest::SendCommand {
            command: Command::SelectMulti { ids: vec![pad.clone()] },
        })
    }

    /// Touch move: updates the local pad immediately and returns the
    /// throttled command request, if the cool-down allows one.
    pub fn touch_move(&mut self, touch: u64, x: f64, y: f64, now: Instant) -> Option<StoreRequest> {
        let mv = self.tracker.touch_move_at(touch, x, y, now)?;
        self.pads.set_local_position(&mv.pad, mv.x, mv.y);
        mv.command.map(|command| StoreRequest::SendCommand { command })
    }

    /// Touch-end/cancel: deterministic teardown, no final command.
    pub fn touch_end(&mut self, touch: u64) {
        self.tracker.touch_end(touch);
    }

    /// Clear the selection on both surfaces.
    #[must_use]
    pub fn clear_selection(&self) -> StoreRequest {
        StoreRequest::SendCommand { command: Command::SelectMulti { ids: vec![] } }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

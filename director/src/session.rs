//! Director session — command application and snapshot building.
//!
//! DESIGN
//! ======
//! Commands are level-triggered: the relay stamps each envelope with a
//! strictly monotonic timestamp, and the session ignores anything at or
//! below the last applied stamp. Semantic no-ops (unknown ids, empty
//! selection) are logged at debug and never raised as errors — the
//! protocol self-heals on the next valid command or snapshot.

use protocol::{
    Command, CommandEnvelope, DecoId, DecoRef, Direction, MobilePoint, MultiAction, OneAction,
    PcState, to_canvas_space, to_controller_space,
};
use tracing::debug;

use crate::hand::{Detection, HandRotation};
use crate::scene::{DecoIdGen, Decoration, SceneError, SceneTable};

/// Canvas units moved per nudge step.
const MOVE_STEP: f64 = 5.0;
/// Degrees rotated per rotate step.
const ROTATE_STEP_DEG: f64 = 5.0;
/// Relative size change per scale step.
const SCALE_STEP: f64 = 0.02;
/// Smallest width/height a scale step may leave behind.
pub const MIN_DIMENSION: f64 = 20.0;

const DEFAULT_DECO_WIDTH: f64 = 100.0;
const DEFAULT_DECO_HEIGHT: f64 = 100.0;

// =============================================================================
// TYPES
// =============================================================================

/// Director canvas dimensions in pixels, used to scale normalized
/// controller coordinates into decoration positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

/// One director surface: the scene table plus everything needed to apply
/// commands and publish snapshots.
#[derive(Debug)]
pub struct DirectorSession {
    table: SceneTable,
    canvas: CanvasSize,
    ids: DecoIdGen,
    hand: HandRotation,
    last_applied_ts: i64,
}

impl DirectorSession {
    /// # Errors
    ///
    /// Returns `BadSlotCount` unless there are six to eight backgrounds.
    pub fn new(backgrounds: Vec<String>, canvas: CanvasSize) -> Result<Self, SceneError> {
        Ok(Self {
            table: SceneTable::new(backgrounds)?,
            canvas,
            ids: DecoIdGen::new(),
            hand: HandRotation::new(),
            last_applied_ts: 0,
        })
    }

    #[must_use]
    pub fn table(&self) -> &SceneTable {
        &self.table
    }

    #[must_use]
    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    // =========================================================================
    // LOCAL EDITS (director-side widgets)
    // =========================================================================

    /// Create a decoration at a canvas position (asset click). The new item
    /// lands in the current scene with default dimensions.
    pub fn create_deco(&mut self, x: f64, y: f64, now_ms: i64) -> DecoId {
        let id = self.ids.next(now_ms);
        let deco = Decoration {
            id: id.clone(),
            scene: self.table.current_scene(),
            x,
            y,
            width: DEFAULT_DECO_WIDTH,
            height: DEFAULT_DECO_HEIGHT,
            rotation_deg: 0.0,
            mirror: 1,
        };
        // Scene index comes from the table itself, so insert cannot fail.
        let _ = self.table.insert(deco);
        id
    }

    pub fn move_deco(&mut self, id: &DecoId, x: f64, y: f64) -> bool {
        match self.table.get_mut(id) {
            Some(deco) => {
                deco.x = x;
                deco.y = y;
                true
            }
            None => false,
        }
    }

    pub fn resize_deco(&mut self, id: &DecoId, width: f64, height: f64) -> bool {
        match self.table.get_mut(id) {
            Some(deco) => {
                deco.width = width.max(MIN_DIMENSION);
                deco.height = height.max(MIN_DIMENSION);
                true
            }
            None => false,
        }
    }

    pub fn rotate_deco(&mut self, id: &DecoId, rotation_deg: f64) -> bool {
        match self.table.get_mut(id) {
            Some(deco) => {
                deco.rotation_deg = rotation_deg;
                true
            }
            None => false,
        }
    }

    pub fn flip_deco(&mut self, id: &DecoId) -> bool {
        match self.table.get_mut(id) {
            Some(deco) => {
                deco.mirror = -deco.mirror;
                true
            }
            None => false,
        }
    }

    /// Replace the selection from the director's own UI.
    pub fn select(&mut self, ids: Vec<DecoId>) -> bool {
        self.table.set_selection(ids)
    }

    pub fn clear_selection(&mut self) {
        self.table.clear_selection();
    }

    /// Delete every selected item (delete-button path). Selection entries
    /// are dropped atomically with the items themselves.
    pub fn delete_selected(&mut self) -> usize {
        let selected = self.table.selection().to_vec();
        self.table.remove_many(&selected)
    }

    /// Switch scenes, clearing the selection.
    ///
    /// # Errors
    ///
    /// Returns `SceneOutOfRange` if the index has no slot.
    pub fn switch_scene(&mut self, scene: usize) -> Result<(), SceneError> {
        self.table.switch_to(scene)
    }

    // =========================================================================
    // COMMAND APPLICATION (controller → director)
    // =========================================================================

    /// Apply a stamped envelope from the session document.
    ///
    /// Returns `true` if scene state changed (the caller republishes the
    /// snapshot). Envelopes at or below the last applied stamp are replays
    /// of the outstanding command and are ignored.
    pub fn apply_envelope(&mut self, envelope: &CommandEnvelope) -> bool {
        if envelope.timestamp <= self.last_applied_ts {
            debug!(
                timestamp = envelope.timestamp,
                last = self.last_applied_ts,
                "ignoring stale command envelope"
            );
            return false;
        }
        self.last_applied_ts = envelope.timestamp;
        self.apply_command(&envelope.command)
    }

    /// Apply one command. Returns `true` if scene state changed.
    pub fn apply_command(&mut self, command: &Command) -> bool {
        match command {
            Command::SelectMulti { ids } => {
                let applied = self.table.set_selection(ids.clone());
                if !applied {
                    debug!("select_multi references an id outside the current scene; ignored");
                }
                applied
            }
            Command::ControlOne { id, action: OneAction::Move, x_mobile, y_mobile } => {
                if !self.table.is_selected(id) {
                    debug!(%id, "control_one target not selected; ignored");
                    return false;
                }
                let canvas = to_canvas_space(MobilePoint { x: *x_mobile, y: *y_mobile });
                let x = canvas.x * self.canvas.width;
                let y = canvas.y * self.canvas.height;
                self.move_deco(id, x, y)
            }
            Command::ControlMulti { action, direction } => {
                let selected = self.table.selection().to_vec();
                if selected.is_empty() {
                    debug!("control_multi with empty selection; ignored");
                    return false;
                }
                for id in &selected {
                    if let Some(deco) = self.table.get_mut(id) {
                        apply_step(deco, *action, *direction);
                    }
                }
                true
            }
            Command::DeleteMulti => {
                let selected = self.table.selection().to_vec();
                if selected.is_empty() {
                    debug!("delete_multi with empty selection; ignored");
                    return false;
                }
                self.table.remove_many(&selected) > 0
            }
        }
    }

    /// Apply one fixed step to a single item regardless of selection
    /// (window-pairing `DECO_CONTROL` path).
    pub fn control_deco(&mut self, id: &DecoId, action: MultiAction, direction: Direction) -> bool {
        match self.table.get_mut(id) {
            Some(deco) => {
                apply_step(deco, action, direction);
                true
            }
            None => {
                debug!(%id, "deco_control target not found; ignored");
                false
            }
        }
    }

    // =========================================================================
    // HAND GESTURE
    // =========================================================================

    /// Feed one hand detection; the derived angle delta rotates every
    /// selected item. A zero-hand frame resets the gesture to neutral.
    pub fn track_hand(&mut self, detection: &Detection) -> bool {
        let delta = self.hand.update(detection);
        if delta == 0.0 {
            return false;
        }
        let selected = self.table.selection().to_vec();
        if selected.is_empty() {
            return false;
        }
        for id in &selected {
            if let Some(deco) = self.table.get_mut(id) {
                deco.rotation_deg += delta;
            }
        }
        true
    }

    // =========================================================================
    // SNAPSHOT (director → controller)
    // =========================================================================

    /// Build the current `pcState` snapshot. Positions are normalized to
    /// the canvas and mapped into controller space; ordering follows the
    /// current scene's slot order.
    #[must_use]
    pub fn snapshot(&self) -> PcState {
        let deco_list = self
            .table
            .current_ids()
            .iter()
            .filter_map(|id| self.table.get(id))
            .map(|deco| {
                let normalized = protocol::CanvasPoint {
                    x: deco.x / self.canvas.width,
                    y: deco.y / self.canvas.height,
                };
                let mobile = to_controller_space(normalized);
                DecoRef { id: deco.id.clone(), x_mobile: mobile.x, y_mobile: mobile.y }
            })
            .collect();

        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        PcState {
            scene: self.table.current_scene() as i32,
            deco_list,
            selected_ids: self.table.selection().to_vec(),
        }
    }
}

// =============================================================================
// FIXED STEPS
// =============================================================================

fn apply_step(deco: &mut Decoration, action: MultiAction, direction: Direction) {
    match action {
        MultiAction::Move => {
            let (dx, dy) = match direction {
                Direction::Up => (0.0, -MOVE_STEP),
                Direction::Down => (0.0, MOVE_STEP),
                Direction::Left => (-MOVE_STEP, 0.0),
                Direction::Right => (MOVE_STEP, 0.0),
            };
            deco.x += dx;
            deco.y += dy;
        }
        MultiAction::Rotate => {
            let step = match direction {
                Direction::Right | Direction::Up => ROTATE_STEP_DEG,
                Direction::Left | Direction::Down => -ROTATE_STEP_DEG,
            };
            deco.rotation_deg += step;
        }
        MultiAction::Scale => {
            let factor = match direction {
                Direction::Up | Direction::Right => 1.0 + SCALE_STEP,
                Direction::Down | Direction::Left => 1.0 - SCALE_STEP,
            };
            deco.width = (deco.width * factor).max(MIN_DIMENSION);
            deco.height = (deco.height * factor).max(MIN_DIMENSION);
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

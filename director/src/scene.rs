//! Scene table — slots, decorations, and the selection set.
//!
//! DESIGN
//! ======
//! Decorations live in one map keyed by id; each scene slot keeps an
//! ordered id list so snapshot ordering is stable across publishes.
//! Selection is a subset of the current scene's ids and every mutation
//! here maintains that invariant: deleting a selected item drops it from
//! the selection in the same call, and switching scenes clears it.

use std::collections::HashMap;

use protocol::DecoId;

pub const MIN_SLOTS: usize = 6;
pub const MAX_SLOTS: usize = 8;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("scene table requires {MIN_SLOTS} to {MAX_SLOTS} slots, got {0}")]
    BadSlotCount(usize),
    #[error("scene index out of range: {0}")]
    SceneOutOfRange(usize),
}

/// One decoration on the director canvas. Positions and dimensions are in
/// canvas pixels; `mirror` is the horizontal flip sign (±1).
#[derive(Clone, Debug, PartialEq)]
pub struct Decoration {
    pub id: DecoId,
    pub scene: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation_deg: f64,
    pub mirror: i8,
}

/// One scene slot: a background reference plus the ordered item list.
#[derive(Clone, Debug, Default)]
pub struct SceneSlot {
    pub background: String,
    deco_order: Vec<DecoId>,
}

impl SceneSlot {
    fn new(background: String) -> Self {
        Self { background, deco_order: Vec::new() }
    }
}

/// The director's decoration table: six-to-eight scene slots, exactly one
/// current scene, and the current selection.
#[derive(Debug)]
pub struct SceneTable {
    slots: Vec<SceneSlot>,
    current: usize,
    decos: HashMap<DecoId, Decoration>,
    selection: Vec<DecoId>,
}

// =============================================================================
// ID GENERATION
// =============================================================================

/// Monotonic-time-derived id generator.
///
/// Ids are `deco-<ms>`; the floor bumps past the last issued value so two
/// creations in the same millisecond still get distinct ids.
#[derive(Debug, Default)]
pub struct DecoIdGen {
    floor_ms: i64,
}

impl DecoIdGen {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, now_ms: i64) -> DecoId {
        let ms = now_ms.max(self.floor_ms + 1);
        self.floor_ms = ms;
        DecoId::new(format!("deco-{ms}"))
    }
}

// =============================================================================
// SCENE TABLE
// =============================================================================

impl SceneTable {
    /// Build a table with one slot per background reference.
    ///
    /// # Errors
    ///
    /// Returns `BadSlotCount` unless there are six to eight backgrounds.
    pub fn new(backgrounds: Vec<String>) -> Result<Self, SceneError> {
        let count = backgrounds.len();
        if !(MIN_SLOTS..=MAX_SLOTS).contains(&count) {
            return Err(SceneError::BadSlotCount(count));
        }
        Ok(Self {
            slots: backgrounds.into_iter().map(SceneSlot::new).collect(),
            current: 0,
            decos: HashMap::new(),
            selection: Vec::new(),
        })
    }

    #[must_use]
    pub fn current_scene(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Switch the current scene, clearing the selection.
    ///
    /// # Errors
    ///
    /// Returns `SceneOutOfRange` if the index has no slot.
    pub fn switch_to(&mut self, scene: usize) -> Result<(), SceneError> {
        if scene >= self.slots.len() {
            return Err(SceneError::SceneOutOfRange(scene));
        }
        self.current = scene;
        self.selection.clear();
        Ok(())
    }

    /// Insert a decoration into its scene's slot order.
    ///
    /// # Errors
    ///
    /// Returns `SceneOutOfRange` if the decoration names a missing slot.
    pub fn insert(&mut self, deco: Decoration) -> Result<(), SceneError> {
        let slot = self
            .slots
            .get_mut(deco.scene)
            .ok_or(SceneError::SceneOutOfRange(deco.scene))?;
        slot.deco_order.push(deco.id.clone());
        self.decos.insert(deco.id.clone(), deco);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &DecoId) -> Option<&Decoration> {
        self.decos.get(id)
    }

    pub fn get_mut(&mut self, id: &DecoId) -> Option<&mut Decoration> {
        self.decos.get_mut(id)
    }

    /// Ordered ids of the current scene.
    #[must_use]
    pub fn current_ids(&self) -> &[DecoId] {
        &self.slots[self.current].deco_order
    }

    #[must_use]
    pub fn contains_in_current(&self, id: &DecoId) -> bool {
        self.decos.get(id).is_some_and(|d| d.scene == self.current)
    }

    #[must_use]
    pub fn selection(&self) -> &[DecoId] {
        &self.selection
    }

    #[must_use]
    pub fn is_selected(&self, id: &DecoId) -> bool {
        self.selection.contains(id)
    }

    /// Replace the selection. An empty list clears; if any id is missing
    /// from the current scene the whole replace is a no-op.
    pub fn set_selection(&mut self, ids: Vec<DecoId>) -> bool {
        if !ids.iter().all(|id| self.contains_in_current(id)) {
            return false;
        }
        self.selection = ids;
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Remove decorations by id, dropping them from slot orders and the
    /// selection in the same mutation. Returns how many were removed.
    pub fn remove_many(&mut self, ids: &[DecoId]) -> usize {
        let mut removed = 0;
        for id in ids {
            let Some(deco) = self.decos.remove(id) else {
                continue;
            };
            if let Some(slot) = self.slots.get_mut(deco.scene) {
                slot.deco_order.retain(|d| d != id);
            }
            self.selection.retain(|d| d != id);
            removed += 1;
        }
        removed
    }

    #[must_use]
    pub fn deco_count(&self) -> usize {
        self.decos.len()
    }
}

#[cfg(test)]
#[path = "scene_test.rs"]
mod tests;

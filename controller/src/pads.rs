//! Pad reconciliation engine.
//!
//! DESIGN
//! ======
//! Snapshots are leveled: each one carries the full deco list, and this
//! module diffs it against the rendered pad set. Creates enter at opacity
//! zero (`Entering`, promoted by `sweep`), updates skip any pad owned by
//! a Dragging touch (the finger is authoritative mid-drag), and removals
//! are never synchronous — a departed pad turns `Exiting` and is dropped
//! by `sweep` after a 300 ms grace so the exit animation can play. Exit
//! bookkeeping is keyed by id and never double-schedules, so removal is
//! guaranteed even when further reconciles land during the grace window.
//!
//! Ordinals are human-facing labels assigned at pad creation from a
//! counter that never reuses values, so a label freed by a deletion can
//! not reappear on an item created in the same pass.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use protocol::{DecoId, DecoRef};

use crate::touch::PadBounds;

/// How long an exiting pad stays rendered before removal.
pub const EXIT_GRACE: Duration = Duration::from_millis(300);

// =============================================================================
// TYPES
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PadPhase {
    /// Just created; rendered at opacity 0 until the next sweep.
    Entering,
    /// Fully visible.
    Active,
    /// Departed from the snapshot; fading out until its grace deadline.
    Exiting,
}

/// Controller-side visual proxy for one director decoration.
#[derive(Clone, Debug, PartialEq)]
pub struct Pad {
    pub id: DecoId,
    /// Human-facing label; unique for the life of the controller session.
    pub ordinal: u64,
    pub x: f64,
    pub y: f64,
    pub selected: bool,
    pub phase: PadPhase,
}

/// The rendered pad set, keyed by decoration id.
#[derive(Debug)]
pub struct PadSet {
    pads: HashMap<DecoId, Pad>,
    exit_deadlines: HashMap<DecoId, Instant>,
    next_ordinal: u64,
}

impl Default for PadSet {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// RECONCILIATION
// =============================================================================

impl PadSet {
    #[must_use]
    pub fn new() -> Self {
        Self { pads: HashMap::new(), exit_deadlines: HashMap::new(), next_ordinal: 1 }
    }

    /// Diff the rendered set against a snapshot's deco list.
    ///
    /// Idempotent: reconciling twice with identical inputs yields the same
    /// id→position/phase mapping as reconciling once.
    pub fn reconcile(
        &mut self,
        refs: &[DecoRef],
        selected: &HashSet<DecoId>,
        dragging: &HashSet<DecoId>,
        bounds: PadBounds,
        now: Instant,
    ) {
        for deco_ref in refs {
            let x = deco_ref.x_mobile * bounds.width;
            let y = deco_ref.y_mobile * bounds.height;
            let is_selected = selected.contains(&deco_ref.id);

            match self.pads.get_mut(&deco_ref.id) {
                None => {
                    let ordinal = self.next_ordinal;
                    self.next_ordinal += 1;
                    self.pads.insert(
                        deco_ref.id.clone(),
                        Pad {
                            id: deco_ref.id.clone(),
                            ordinal,
                            x,
                            y,
                            selected: is_selected,
                            phase: PadPhase::Entering,
                        },
                    );
                }
                Some(pad) => {
                    if pad.phase == PadPhase::Exiting {
                        // Revived before its grace elapsed.
                        self.exit_deadlines.remove(&deco_ref.id);
                        pad.phase = PadPhase::Active;
                    }
                    if !dragging.contains(&deco_ref.id) {
                        pad.x = x;
                        pad.y = y;
                        pad.selected = is_selected;
                    }
                }
            }
        }

        let incoming: HashSet<&DecoId> = refs.iter().map(|r| &r.id).collect();
        for (id, pad) in &mut self.pads {
            if !incoming.contains(id) && pad.phase != PadPhase::Exiting {
                pad.phase = PadPhase::Exiting;
                pad.selected = false;
                self.exit_deadlines.entry(id.clone()).or_insert(now + EXIT_GRACE);
            }
        }
    }

    /// Drop every pad whose exit grace has elapsed and promote `Entering`
    /// pads to `Active`.
    pub fn sweep(&mut self, now: Instant) {
        let expired: Vec<DecoId> = self
            .exit_deadlines
            .iter()
            .filter(|&(_, deadline)| *deadline <= now)
            .map(|(id, _)| id.clone())
            .collect();
        for id in expired {
            self.exit_deadlines.remove(&id);
            self.pads.remove(&id);
        }
        for pad in self.pads.values_mut() {
            if pad.phase == PadPhase::Entering {
                pad.phase = PadPhase::Active;
            }
        }
    }

    /// Immediate local position update for a pad under an active drag.
    pub fn set_local_position(&mut self, id: &DecoId, x: f64, y: f64) {
        if let Some(pad) = self.pads.get_mut(id) {
            pad.x = x;
            pad.y = y;
        }
    }

    #[must_use]
    pub fn get(&self, id: &DecoId) -> Option<&Pad> {
        self.pads.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &DecoId) -> bool {
        self.pads.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pads.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pads.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pad> {
        self.pads.values()
    }

    /// Rendered id→(position, phase) mapping, for equality checks.
    #[must_use]
    pub fn rendered(&self) -> HashMap<DecoId, (f64, f64, PadPhase)> {
        self.pads
            .iter()
            .map(|(id, pad)| (id.clone(), (pad.x, pad.y, pad.phase)))
            .collect()
    }
}

#[cfg(test)]
#[path = "pads_test.rs"]
mod tests;

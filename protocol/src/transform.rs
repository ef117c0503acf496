//! Mapping between director canvas space and controller touch-pad space.
//!
//! The controller surface is physically rotated 90° relative to the
//! director canvas, so the transform is an axis swap plus one mirror.
//! Both functions are pure, total over `[0,1]²`, and exact inverses of
//! each other.

use crate::{CanvasPoint, MobilePoint};

/// Map a canvas-normalized position into controller space.
#[must_use]
pub fn to_controller_space(p: CanvasPoint) -> MobilePoint {
    MobilePoint { x: 1.0 - p.y, y: p.x }
}

/// Map a controller-normalized position back into canvas space.
#[must_use]
pub fn to_canvas_space(p: MobilePoint) -> CanvasPoint {
    CanvasPoint { x: p.y, y: 1.0 - p.x }
}

#[cfg(test)]
#[path = "transform_test.rs"]
mod tests;

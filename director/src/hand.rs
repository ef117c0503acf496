//! Hand-tracking collaborator seam.
//!
//! The computer-vision model lives outside this workspace; an application
//! implements [`HandTracker`] over whatever landmark detector it has, one
//! call per video frame. Only the wrist (index 0) and the index fingertip
//! (index 8) are consumed here: [`HandRotation`] derives the wrist→tip
//! angle and reports successive deltas, which the director applies as
//! rotation to the selection.

use serde::{Deserialize, Serialize};

/// Landmark index of the wrist.
pub const WRIST: usize = 0;
/// Landmark index of the index fingertip.
pub const INDEX_TIP: usize = 8;
/// Landmarks per detected hand.
pub const LANDMARKS_PER_HAND: usize = 21;

#[derive(Debug, thiserror::Error)]
pub enum HandError {
    #[error("hand detector failed: {0}")]
    Detector(String),
}

/// One normalized hand-joint coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Result of one detection call: zero hands (empty) or one hand of 21
/// landmarks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub landmarks: Vec<Landmark>,
}

impl Detection {
    /// A zero-hands detection.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

/// External landmark-detection capability, one call per video frame.
pub trait HandTracker: Send {
    /// # Errors
    ///
    /// Returns [`HandError::Detector`] if the underlying model fails.
    fn detect(&mut self, frame: &[u8], timestamp_ms: i64) -> Result<Detection, HandError>;
}

/// Derives rotation deltas from successive wrist→fingertip angles.
#[derive(Debug, Default)]
pub struct HandRotation {
    last_angle_deg: Option<f64>,
}

impl HandRotation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one detection and return the rotation delta in degrees.
    ///
    /// The first frame of a gesture yields 0 (no previous angle). A
    /// zero-hands or malformed result (fewer than 9 landmarks) resets the
    /// derived state to neutral and yields 0.
    pub fn update(&mut self, detection: &Detection) -> f64 {
        if detection.landmarks.len() <= INDEX_TIP {
            self.last_angle_deg = None;
            return 0.0;
        }
        let wrist = detection.landmarks[WRIST];
        let tip = detection.landmarks[INDEX_TIP];
        let angle = (tip.y - wrist.y).atan2(tip.x - wrist.x).to_degrees();
        let delta = self.last_angle_deg.map_or(0.0, |last| angle - last);
        self.last_angle_deg = Some(angle);
        delta
    }

    /// Current derived angle, or 0 (neutral) when no hand is tracked.
    #[must_use]
    pub fn angle_deg(&self) -> f64 {
        self.last_angle_deg.unwrap_or(0.0)
    }
}

#[cfg(test)]
#[path = "hand_test.rs"]
mod tests;

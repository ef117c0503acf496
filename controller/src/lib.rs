//! Controller surface: touch input and the mirrored pad view.
//!
//! DESIGN
//! ======
//! The controller never owns scene state. It mirrors the director's
//! snapshots into a pad set, turns raw multi-touch events into throttled
//! commands, and sends those through the relay. Everything here is a
//! sans-I/O state machine driven by explicit events and an explicit
//! clock, so touch timing and reconciliation are deterministic in tests.

pub mod config;
pub mod pads;
pub mod session;
pub mod touch;

pub use config::{ConfigError, ControllerConfig};
pub use pads::{Pad, PadPhase, PadSet};
pub use session::{ConnectionStatus, ControllerSession};
pub use touch::{PadBounds, TouchTracker};

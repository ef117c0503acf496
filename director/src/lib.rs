//! Director surface: the authoritative scene/item state.
//!
//! DESIGN
//! ======
//! The director owns the only writable copy of the decoration table.
//! Controllers never mutate it directly — they send commands through the
//! relay, the director applies them here, and the resulting state is
//! mirrored back as a full snapshot. All types are sans-I/O state
//! machines: methods take events and return values, never spawn or block.

pub mod hand;
pub mod pairing;
pub mod scene;
pub mod session;

pub use scene::{Decoration, SceneError, SceneTable};
pub use session::{CanvasSize, DirectorSession};

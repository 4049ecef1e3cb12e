//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Runtime code is responsible for translating platform events into `InputEvent`s.

mod mode;
mod types;

pub use mode::StereoMode;
pub use types::{InputEvent, Key};

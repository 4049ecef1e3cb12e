//! Time subsystem.
//!
//! Frame timing is used for statistics only; animation in this crate is
//! advanced per frame, not per second.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameReport, FrameStats, FrameTime};

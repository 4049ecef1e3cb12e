//! Stereo frame orchestration.
//!
//! [`FrameLoop`] owns the mode, rotation and frame phase and decides which
//! passes run; [`StereoPipeline`] owns the GPU resources and records them.
//! The two meet at the [`FramePasses`] trait so the sequencing can be checked
//! without a device.

mod config;
mod frame_loop;
mod pipeline;

pub use config::StereoConfig;
pub use frame_loop::{FrameLoop, FramePasses, FramePhase};
pub use pipeline::{GpuPasses, StereoPipeline};

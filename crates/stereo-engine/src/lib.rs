//! Stereo engine crate.
//!
//! This crate owns the platform + GPU runtime pieces and the stereo renderer
//! used by the viewer binary.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod stereo;

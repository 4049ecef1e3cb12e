//! Built-in WGSL sources.
//!
//! Each stage lives in its own file and is compiled independently by the
//! [`ProgramBuilder`](super::ProgramBuilder).

pub const SCENE_VERTEX: &str = include_str!("shaders/scene.vert.wgsl");
pub const SCENE_FRAGMENT: &str = include_str!("shaders/scene.frag.wgsl");

pub const COMPOSITE_VERTEX: &str = include_str!("shaders/composite.vert.wgsl");
pub const COMPOSITE_FRAGMENT: &str = include_str!("shaders/composite.frag.wgsl");

//! Pixel-space rectangles used for viewport layout.
//!
//! Rectangles are in physical pixels with the origin at the top-left, which
//! is what `wgpu::RenderPass::set_viewport` expects.

mod viewport;

pub use viewport::{side_by_side, ViewportRect};

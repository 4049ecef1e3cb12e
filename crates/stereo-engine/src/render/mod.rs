//! GPU rendering subsystem.
//!
//! Two passes make up a stereo frame:
//! - the scene pass draws the cube into one layer of the [`StereoTarget`]
//! - the composite pass samples one layer into a viewport of the window
//!
//! Each renderer owns its own pipeline and uniform buffers. Shared resources
//! (vertex buffers, the layered target) are borrowed for the duration of a
//! single pass.

mod composite;
mod ctx;
mod geometry;
mod program;
mod scene;
pub mod shaders;
mod target;

pub use composite::CompositeRenderer;
pub use ctx::RenderCtx;
pub use geometry::{
    BlitVertex, CubeVertex, GeometryBuffer, GeometryStore, BLIT_VERTICES, CUBE_VERTICES,
};
pub use program::{
    LinkedProgram, ProgramBuilder, ProgramError, ShaderProgram, ShaderStage, ATTR_NORMAL,
    ATTR_POSITION, DEFAULT_ATTRIBUTES,
};
pub use scene::{model_matrix, pseudo_projection, SceneRenderer, CUBE_DEPTH};
pub use target::{Eye, StereoTarget, COLOR_FORMAT, DEPTH_FORMAT, LAYER_COUNT, LAYER_SIZE};

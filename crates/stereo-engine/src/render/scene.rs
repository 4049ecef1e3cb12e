//! Cube pass: draws the lit cube into one layer of the stereo target.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use super::ctx::RenderCtx;
use super::geometry::{CubeVertex, GeometryBuffer};
use super::program::ShaderProgram;
use super::target::{Eye, StereoTarget, DEPTH_FORMAT, COLOR_FORMAT, LAYER_COUNT};

/// View-space depth of the cube center.
pub const CUBE_DEPTH: f32 = -3.0;

/// Rotation about +Y by `angle` radians, then a push to [`CUBE_DEPTH`].
pub fn model_matrix(angle: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 0.0, CUBE_DEPTH)) * Mat4::from_rotation_y(angle)
}

/// Minimal perspective: `w' = -z`, `z' = -z - 1`.
///
/// After the divide, depth is `1 - 1/(-z)`, which lands in `[0.5, 0.75]` for
/// the cube's view-space span `[-4, -2]`.
pub fn pseudo_projection() -> Mat4 {
    Mat4::from_cols(
        Vec4::X,
        Vec4::Y,
        Vec4::new(0.0, 0.0, -1.0, -1.0),
        Vec4::new(0.0, 0.0, -1.0, 0.0),
    )
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct SceneUniform {
    model: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
}

impl SceneUniform {
    fn new(angle: f32) -> Self {
        Self {
            model: model_matrix(angle).to_cols_array_2d(),
            projection: pseudo_projection().to_cols_array_2d(),
        }
    }
}

/// Per-layer uniform slot.
///
/// Both eyes are recorded into one submission, so each needs its own buffer;
/// a shared one would only hold the last write when the queue runs.
struct EyeUniform {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct SceneRenderer {
    pipeline: wgpu::RenderPipeline,
    eyes: [EyeUniform; LAYER_COUNT as usize],
}

impl SceneRenderer {
    pub fn new(ctx: &RenderCtx<'_>, program: &ShaderProgram) -> Self {
        let uniform_size = std::mem::size_of::<SceneUniform>() as u64;

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("stereo scene bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(uniform_size),
                        },
                        count: None,
                    }],
                });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("stereo scene pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    immediate_size: 0,
                });

        let buffers = [CubeVertex::layout()];
        let targets = [Some(wgpu::ColorTargetState {
            format: COLOR_FORMAT,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("stereo scene pipeline"),
            layout: Some(&pipeline_layout),
            vertex: program.vertex_state(&buffers),
            fragment: Some(program.fragment_state(&targets)),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let eyes = Eye::ALL.map(|eye| {
            let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("stereo scene ubo {}", eye.layer())),
                size: uniform_size,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("stereo scene bind group"),
                layout: &bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });
            EyeUniform { buffer, bind_group }
        });

        Self { pipeline, eyes }
    }

    /// Draws the cube rotated by `angle` into `eye`'s layer of `target`.
    ///
    /// The layer must already have been cleared this frame.
    pub fn render_eye(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &StereoTarget,
        cube: &GeometryBuffer,
        eye: Eye,
        angle: f32,
    ) {
        let slot = &self.eyes[eye.index()];
        queue.write_buffer(&slot.buffer, 0, bytemuck::bytes_of(&SceneUniform::new(angle)));

        let mut rpass = target.begin_layer_pass(encoder, eye);
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &slot.bind_group, &[]);
        cube.draw(&mut rpass);
    }
}

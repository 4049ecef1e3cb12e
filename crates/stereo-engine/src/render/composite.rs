//! Composite pass: blits one layer of the stereo color array into a window
//! viewport with a single full-screen triangle.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::ViewportRect;

use super::ctx::RenderCtx;
use super::geometry::{BlitVertex, GeometryBuffer};
use super::program::ShaderProgram;
use super::target::{Eye, StereoTarget, LAYER_COUNT};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct LayerUniform {
    layer: u32,
    _pad: [u32; 3], // 16-byte alignment
}

pub struct CompositeRenderer {
    pipeline: wgpu::RenderPipeline,

    /// One bind group per layer; each carries its own layer-index uniform.
    bind_groups: [wgpu::BindGroup; LAYER_COUNT as usize],
}

impl CompositeRenderer {
    pub fn new(ctx: &RenderCtx<'_>, program: &ShaderProgram, target: &StereoTarget) -> Self {
        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("stereo composite bgl"),
                    entries: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2Array,
                                multisampled: false,
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 2,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: wgpu::BufferSize::new(
                                    std::mem::size_of::<LayerUniform>() as u64,
                                ),
                            },
                            count: None,
                        },
                    ],
                });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("stereo composite pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    immediate_size: 0,
                });

        let buffers = [BlitVertex::layout()];
        let targets = [Some(wgpu::ColorTargetState {
            format: ctx.surface_format,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("stereo composite pipeline"),
            layout: Some(&pipeline_layout),
            vertex: program.vertex_state(&buffers),
            fragment: Some(program.fragment_state(&targets)),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            // 2-D blit: no depth test, no depth writes.
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("stereo composite sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_groups = Eye::ALL.map(|eye| {
            let ubo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("stereo composite layer ubo {}", eye.layer())),
                contents: bytemuck::bytes_of(&LayerUniform {
                    layer: eye.layer(),
                    _pad: [0; 3],
                }),
                usage: wgpu::BufferUsages::UNIFORM,
            });

            ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("stereo composite bind group"),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(target.color_array_view()),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: ubo.as_entire_binding(),
                    },
                ],
            })
        });

        Self {
            pipeline,
            bind_groups,
        }
    }

    /// Clears the whole window target.
    pub fn clear_window(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        color: wgpu::Color,
    ) {
        let _rpass = begin_window_pass(encoder, view, wgpu::LoadOp::Clear(color));
    }

    /// Samples `eye`'s layer into `rect` of the window target.
    ///
    /// Pixels outside `rect` are left untouched. Empty rectangles draw nothing.
    pub fn render_layer_to_viewport(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        blit: &GeometryBuffer,
        eye: Eye,
        rect: ViewportRect,
    ) {
        if rect.is_empty() {
            log::trace!("composite: empty viewport for {eye:?}, skipped");
            return;
        }

        let mut rpass = begin_window_pass(encoder, view, wgpu::LoadOp::Load);
        rpass.set_viewport(
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
            0.0,
            1.0,
        );
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_groups[eye.index()], &[]);
        blit.draw(&mut rpass);
    }
}

fn begin_window_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    load: wgpu::LoadOp<wgpu::Color>,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("stereo composite pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}

//! Layered offscreen render target.
//!
//! One 2-layer color array and one 2-layer depth array. Each layer is rendered
//! through its own pass whose color and depth attachments are views of the
//! same layer index; the pair is stored together so the two can never diverge.

use crate::device::report_gpu_errors;

/// Edge length of each layer, in pixels.
pub const LAYER_SIZE: u32 = 512;

/// Number of layers (one per eye).
pub const LAYER_COUNT: u32 = 2;

pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth16Unorm;

/// Eye / layer selector.
///
/// `Left` renders into layer 0 and is shown in the left half of the window,
/// `Right` into layer 1 and the right half.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    pub const ALL: [Eye; 2] = [Eye::Left, Eye::Right];

    #[inline]
    pub fn layer(self) -> u32 {
        match self {
            Eye::Left => 0,
            Eye::Right => 1,
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.layer() as usize
    }
}

/// Attachment views for one layer.
struct LayerAttachments {
    layer: u32,
    color: wgpu::TextureView,
    depth: wgpu::TextureView,
}

impl LayerAttachments {
    /// Both views are cut from one descriptor.
    fn new(color: &wgpu::Texture, depth: &wgpu::Texture, eye: Eye) -> Self {
        let layer = eye.layer();
        let label = format!("stereo layer {layer}");
        let desc = layer_view_desc(&label, layer);
        Self {
            layer,
            color: color.create_view(&desc),
            depth: depth.create_view(&desc),
        }
    }
}

pub struct StereoTarget {
    _color: wgpu::Texture,
    _depth: wgpu::Texture,
    color_array_view: wgpu::TextureView,
    layers: [LayerAttachments; LAYER_COUNT as usize],
    clear_color: wgpu::Color,
}

impl StereoTarget {
    pub fn new(device: &wgpu::Device, clear_color: wgpu::Color) -> Self {
        let size = wgpu::Extent3d {
            width: LAYER_SIZE,
            height: LAYER_SIZE,
            depth_or_array_layers: LAYER_COUNT,
        };

        let color = report_gpu_errors(device, "color texture", || {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some("stereo color array"),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: COLOR_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            })
        });

        let depth = report_gpu_errors(device, "depth texture", || {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some("stereo depth array"),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
        });

        let (color_array_view, layers) = report_gpu_errors(device, "setup", || {
            let array_view = color.create_view(&wgpu::TextureViewDescriptor {
                label: Some("stereo color array view"),
                dimension: Some(wgpu::TextureViewDimension::D2Array),
                array_layer_count: Some(LAYER_COUNT),
                ..Default::default()
            });
            let layers = Eye::ALL.map(|eye| LayerAttachments::new(&color, &depth, eye));
            (array_view, layers)
        });

        log::debug!(
            "stereo target: {LAYER_COUNT} layers of {LAYER_SIZE}x{LAYER_SIZE} ({COLOR_FORMAT:?} + {DEPTH_FORMAT:?})"
        );

        Self {
            _color: color,
            _depth: depth,
            color_array_view,
            layers,
            clear_color,
        }
    }

    /// Color array view with both layers, for sampling in the composite pass.
    pub fn color_array_view(&self) -> &wgpu::TextureView {
        &self.color_array_view
    }

    pub fn clear_color(&self) -> wgpu::Color {
        self.clear_color
    }

    /// Clears color and depth of one layer.
    ///
    /// A clear only touches the attached layer, so each layer needs its own
    /// call every frame.
    pub fn clear_layer(&self, encoder: &mut wgpu::CommandEncoder, eye: Eye) {
        let _rpass = self.begin_pass(
            encoder,
            eye,
            wgpu::LoadOp::Clear(self.clear_color),
            wgpu::LoadOp::Clear(1.0),
            "stereo clear layer",
        );
    }

    /// Opens a pass drawing into `eye`'s layer, keeping existing contents.
    ///
    /// The layer stays the draw target until the returned pass is dropped;
    /// dropping it hands the encoder back for the window pass.
    pub fn begin_layer_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        eye: Eye,
    ) -> wgpu::RenderPass<'e> {
        self.begin_pass(
            encoder,
            eye,
            wgpu::LoadOp::Load,
            wgpu::LoadOp::Load,
            "stereo layer pass",
        )
    }

    fn begin_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        eye: Eye,
        color_load: wgpu::LoadOp<wgpu::Color>,
        depth_load: wgpu::LoadOp<f32>,
        label: &str,
    ) -> wgpu::RenderPass<'e> {
        let layer = &self.layers[eye.index()];
        debug_assert_eq!(layer.layer, eye.layer());

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &layer.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &layer.depth,
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

/// Single-layer 2D view of an array texture.
fn layer_view_desc(label: &str, layer: u32) -> wgpu::TextureViewDescriptor<'_> {
    wgpu::TextureViewDescriptor {
        label: Some(label),
        dimension: Some(wgpu::TextureViewDimension::D2),
        base_array_layer: layer,
        array_layer_count: Some(1),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{capture_gpu_errors, noop_device};

    #[test]
    fn eyes_map_to_distinct_layers() {
        assert_eq!(Eye::Left.layer(), 0);
        assert_eq!(Eye::Right.layer(), 1);
        assert!(Eye::ALL.iter().all(|e| e.layer() < LAYER_COUNT));
    }

    #[test]
    fn eye_order_is_left_then_right() {
        assert_eq!(Eye::ALL, [Eye::Left, Eye::Right]);
    }

    // ── device resources ──────────────────────────────────────────────────

    #[test]
    fn layer_views_select_one_layer() {
        let desc = layer_view_desc("layer", 1);
        assert_eq!(desc.base_array_layer, 1);
        assert_eq!(desc.array_layer_count, Some(1));
        assert_eq!(desc.dimension, Some(wgpu::TextureViewDimension::D2));
    }

    #[test]
    fn color_and_depth_share_each_layer() {
        let (device, _queue) = noop_device();
        let (target, errors) =
            capture_gpu_errors(&device, || StereoTarget::new(&device, wgpu::Color::BLACK));
        assert!(errors.is_empty(), "{errors:?}");

        for (eye, layer) in Eye::ALL.iter().zip(&target.layers) {
            assert_eq!(layer.layer, eye.layer());
            assert_eq!(layer.color.texture(), &target._color);
            assert_eq!(layer.depth.texture(), &target._depth);
        }
        assert_eq!(target._color.depth_or_array_layers(), LAYER_COUNT);
        assert_eq!(target._depth.size(), target._color.size());
    }

    #[test]
    fn layer_passes_record_cleanly() {
        let (device, queue) = noop_device();
        let target = StereoTarget::new(&device, wgpu::Color::BLACK);

        let ((), errors) = capture_gpu_errors(&device, || {
            let mut encoder = device.create_command_encoder(&Default::default());
            for eye in Eye::ALL {
                target.clear_layer(&mut encoder, eye);
                drop(target.begin_layer_pass(&mut encoder, eye));
            }
            queue.submit([encoder.finish()]);
        });
        assert!(errors.is_empty(), "{errors:?}");
    }
}

use winit::window::{Window, WindowId};

use crate::device::{report_gpu_errors, Gpu, SurfaceErrorAction};
use crate::render::RenderCtx;
use crate::time::FrameTime;

use super::app::AppControl;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

/// The acquired window texture a frame draws into.
pub struct FrameTarget<'a> {
    pub view: &'a wgpu::TextureView,

    /// `(width, height)` of the acquired texture in physical pixels.
    ///
    /// Follows the configured surface, which can trail the live window size
    /// for a frame during a drag-resize.
    pub size: (u32, u32),
}

impl<'a> FrameTarget<'a> {
    pub fn new(texture: &wgpu::Texture, view: &'a wgpu::TextureView) -> Self {
        Self {
            view,
            size: (texture.width(), texture.height()),
        }
    }
}

/// Context passed to `core::App::on_init`.
pub struct InitCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a Gpu<'w>,
}

impl<'a, 'w> InitCtx<'a, 'w> {
    pub fn render_ctx(&self) -> RenderCtx<'_> {
        RenderCtx::new(self.gpu.device(), self.gpu.queue(), self.gpu.surface_format())
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub time: FrameTime,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Acquires the next surface texture, calls `draw` with a ready
    /// [`RenderCtx`], encoder and [`FrameTarget`], then submits and presents.
    ///
    /// A zero-sized drawable or a transient surface error skips the frame
    /// without calling `draw`. Recording and submission run inside the error
    /// scopes labelled `frame`; captured errors are logged only.
    pub fn render<F>(&mut self, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut wgpu::CommandEncoder, &FrameTarget<'_>),
    {
        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            return AppControl::Continue;
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                let action = self.gpu.handle_surface_error(err);
                if action == SurfaceErrorAction::Fatal {
                    return AppControl::Exit;
                }
                return AppControl::Continue;
            }
        };

        let gpu: &Gpu<'w> = &*self.gpu;
        let window = self.window.window;

        report_gpu_errors(gpu.device(), "frame", || {
            let rctx = RenderCtx::new(gpu.device(), gpu.queue(), gpu.surface_format());
            let target = FrameTarget::new(&frame.surface_texture.texture, &frame.view);
            draw(&rctx, &mut frame.encoder, &target);

            window.pre_present_notify();
            gpu.submit(frame);
        });

        AppControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::noop_device;

    #[test]
    fn frame_target_takes_size_from_texture() {
        let (device, _queue) = noop_device();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("surface stand-in"),
            size: wgpu::Extent3d {
                width: 801,
                height: 399,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Bgra8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&Default::default());

        let target = FrameTarget::new(&texture, &view);
        assert_eq!(target.size, (801, 399));
        assert_eq!(target.view, &view);
    }
}

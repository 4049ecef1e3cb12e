use crate::coords::ViewportRect;
use crate::device::report_gpu_errors;
use crate::render::{
    shaders, CompositeRenderer, Eye, GeometryStore, ProgramBuilder, ProgramError, RenderCtx,
    SceneRenderer, StereoTarget,
};

use super::{FramePasses, StereoConfig};

/// Every GPU resource a stereo frame needs, built once at startup.
pub struct StereoPipeline {
    geometry: GeometryStore,
    target: StereoTarget,
    scene: SceneRenderer,
    composite: CompositeRenderer,
}

impl StereoPipeline {
    /// Builds both programs, the static geometry and the layered target.
    ///
    /// Fails if either program does not compile or link; nothing partially
    /// built survives the error.
    pub fn new(ctx: &RenderCtx<'_>, config: &StereoConfig) -> Result<Self, ProgramError> {
        let (scene_program, composite_program) = report_gpu_errors(ctx.device, "shaders", || {
            let scene =
                ProgramBuilder::new("scene", shaders::SCENE_VERTEX, shaders::SCENE_FRAGMENT)
                    .with_default_attributes()
                    .build(ctx.device)?;
            let composite = ProgramBuilder::new(
                "composite",
                shaders::COMPOSITE_VERTEX,
                shaders::COMPOSITE_FRAGMENT,
            )
            .with_default_attributes()
            .build(ctx.device)?;
            Ok::<_, ProgramError>((scene, composite))
        })?;

        let geometry = report_gpu_errors(ctx.device, "buffer", || GeometryStore::new(ctx.device));
        let target = StereoTarget::new(ctx.device, config.clear_color);

        let (scene, composite) = report_gpu_errors(ctx.device, "setup", || {
            (
                SceneRenderer::new(ctx, &scene_program),
                CompositeRenderer::new(ctx, &composite_program, &target),
            )
        });

        Ok(Self {
            geometry,
            target,
            scene,
            composite,
        })
    }

    /// Binds the pipeline to one frame's encoder and window view.
    pub fn passes<'a>(
        &'a self,
        queue: &'a wgpu::Queue,
        encoder: &'a mut wgpu::CommandEncoder,
        view: &'a wgpu::TextureView,
    ) -> GpuPasses<'a> {
        GpuPasses {
            pipeline: self,
            queue,
            encoder,
            view,
        }
    }
}

/// [`FramePasses`] recording into a wgpu command encoder.
pub struct GpuPasses<'a> {
    pipeline: &'a StereoPipeline,
    queue: &'a wgpu::Queue,
    encoder: &'a mut wgpu::CommandEncoder,
    view: &'a wgpu::TextureView,
}

impl FramePasses for GpuPasses<'_> {
    fn clear_layer(&mut self, eye: Eye) {
        self.pipeline.target.clear_layer(self.encoder, eye);
    }

    fn render_eye(&mut self, eye: Eye, angle: f32) {
        let p = self.pipeline;
        p.scene
            .render_eye(self.queue, self.encoder, &p.target, &p.geometry.cube, eye, angle);
    }

    fn clear_window(&mut self) {
        let p = self.pipeline;
        p.composite
            .clear_window(self.encoder, self.view, p.target.clear_color());
    }

    fn composite(&mut self, eye: Eye, rect: ViewportRect) {
        let p = self.pipeline;
        p.composite
            .render_layer_to_viewport(self.encoder, self.view, &p.geometry.blit, eye, rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{capture_gpu_errors, noop_device};
    use crate::input::{InputEvent, Key};
    use crate::stereo::{FrameLoop, FramePhase};

    const WINDOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8Unorm;

    fn window_view(device: &wgpu::Device, (width, height): (u32, u32)) -> wgpu::TextureView {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("window stand-in"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: WINDOW_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&Default::default())
    }

    #[test]
    fn pipeline_builds_without_gpu_errors() {
        let (device, queue) = noop_device();
        let ctx = RenderCtx::new(&device, &queue, WINDOW_FORMAT);
        let (pipeline, errors) =
            capture_gpu_errors(&device, || StereoPipeline::new(&ctx, &StereoConfig::default()));
        assert!(pipeline.is_ok());
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn frames_record_without_gpu_errors() {
        let (device, queue) = noop_device();
        let ctx = RenderCtx::new(&device, &queue, WINDOW_FORMAT);
        let pipeline = StereoPipeline::new(&ctx, &StereoConfig::default()).unwrap();
        let mut fl = FrameLoop::new(&StereoConfig::default());

        // Default window, an odd-width resize, then a frame after a mode toggle.
        for size in [(800, 400), (801, 401), (801, 401)] {
            let view = window_view(&device, size);
            let ((), errors) = capture_gpu_errors(&device, || {
                let mut encoder = device.create_command_encoder(&Default::default());
                fl.record_frame(&mut pipeline.passes(&queue, &mut encoder, &view), size);
                queue.submit([encoder.finish()]);
            });
            assert!(errors.is_empty(), "{size:?}: {errors:?}");
            assert_eq!(fl.phase(), FramePhase::Present);
            fl.finish_frame();
            fl.handle_input(InputEvent::KeyPressed(Key::Space));
        }
    }

    #[test]
    fn one_pixel_window_skips_composites_cleanly() {
        let (device, queue) = noop_device();
        let ctx = RenderCtx::new(&device, &queue, WINDOW_FORMAT);
        let pipeline = StereoPipeline::new(&ctx, &StereoConfig::default()).unwrap();
        let mut fl = FrameLoop::new(&StereoConfig::default());

        let view = window_view(&device, (1, 1));
        let ((), errors) = capture_gpu_errors(&device, || {
            let mut encoder = device.create_command_encoder(&Default::default());
            fl.record_frame(&mut pipeline.passes(&queue, &mut encoder, &view), (1, 1));
            queue.submit([encoder.finish()]);
        });
        assert!(errors.is_empty(), "{errors:?}");
    }
}

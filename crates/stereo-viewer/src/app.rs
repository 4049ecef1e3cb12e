use anyhow::Context;

use stereo_engine::core::{App, AppControl, FrameCtx, InitCtx};
use stereo_engine::input::InputEvent;
use stereo_engine::stereo::{FrameLoop, FramePhase, StereoConfig, StereoPipeline};
use stereo_engine::time::FrameStats;

/// Frames between two statistics lines.
const STATS_WINDOW: u32 = 600;

/// Side-by-side stereo viewer of a rotating cube.
pub struct StereoApp {
    config: StereoConfig,
    frame_loop: FrameLoop,
    stats: FrameStats,

    /// Built in `on_init`, once the GPU context exists.
    pipeline: Option<StereoPipeline>,
}

impl StereoApp {
    pub fn new(config: StereoConfig) -> Self {
        Self {
            frame_loop: FrameLoop::new(&config),
            stats: FrameStats::new(STATS_WINDOW),
            pipeline: None,
            config,
        }
    }
}

impl App for StereoApp {
    fn on_init(&mut self, ctx: &InitCtx<'_, '_>) -> anyhow::Result<()> {
        let info = ctx.gpu.adapter_info();
        log::info!("adapter: {} ({:?}, {:?})", info.name, info.backend, info.device_type);
        log::info!("driver: {} {}", info.driver, info.driver_info);
        log::info!("surface format: {:?}", ctx.gpu.surface_format());

        let pipeline = StereoPipeline::new(&ctx.render_ctx(), &self.config)
            .context("failed to build stereo pipeline")?;
        self.pipeline = Some(pipeline);

        let mode = self.frame_loop.mode();
        log::info!("stereo mode: {} ({mode}); Space toggles, Escape quits", mode.raw());
        Ok(())
    }

    fn on_input(&mut self, event: InputEvent) -> AppControl {
        self.frame_loop.handle_input(event)
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.frame_loop.is_shutdown() {
            return AppControl::Exit;
        }
        let Some(pipeline) = &self.pipeline else {
            return AppControl::Continue;
        };

        if let Some(report) = self.stats.record(ctx.time) {
            log::debug!(
                "{} frames, avg {:.2} ms ({:.1} fps), rotation {:.2} rad",
                report.frames,
                report.avg_dt * 1000.0,
                report.fps(),
                self.frame_loop.rotation()
            );
        }

        let frame_loop = &mut self.frame_loop;

        // Viewports follow the texture actually acquired this frame.
        let control = ctx.render(|rctx, encoder, target| {
            let mut passes = pipeline.passes(rctx.queue, encoder, target.view);
            frame_loop.record_frame(&mut passes, target.size);
        });

        // Skipped frames never reached Present and do not advance the rotation.
        if frame_loop.phase() == FramePhase::Present {
            frame_loop.finish_frame();
        }

        control
    }

    fn on_shutdown(&mut self) {
        self.frame_loop.shutdown();
        log::info!(
            "shutting down (mode {}, rotation {:.2} rad)",
            self.frame_loop.mode().raw(),
            self.frame_loop.rotation()
        );
    }
}

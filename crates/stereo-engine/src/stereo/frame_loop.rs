use std::fmt;

use crate::coords::{side_by_side, ViewportRect};
use crate::core::AppControl;
use crate::input::{InputEvent, Key, StereoMode};
use crate::render::Eye;

use super::StereoConfig;

/// GPU work a stereo frame is made of.
///
/// [`FrameLoop`] decides what runs and in which order; implementors only
/// record it. Calls arrive in this order every frame:
/// `clear_layer` ×2, `render_eye` ×2, `clear_window`, `composite` ×2.
pub trait FramePasses {
    /// Clears color and depth of `eye`'s layer.
    fn clear_layer(&mut self, eye: Eye);

    /// Draws the cube rotated by `angle` into `eye`'s layer.
    fn render_eye(&mut self, eye: Eye, angle: f32);

    /// Clears the window target.
    fn clear_window(&mut self);

    /// Samples `eye`'s layer into `rect` of the window target.
    fn composite(&mut self, eye: Eye, rect: ViewportRect);
}

/// Where the loop is within the current frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FramePhase {
    Idle,
    RenderEyeA,
    RenderEyeB,
    Composite,
    Present,

    /// Terminal; no further frames are recorded.
    Shutdown,
}

impl fmt::Display for FramePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FramePhase::Idle => "idle",
            FramePhase::RenderEyeA => "render eye A",
            FramePhase::RenderEyeB => "render eye B",
            FramePhase::Composite => "composite",
            FramePhase::Present => "present",
            FramePhase::Shutdown => "shutdown",
        };
        f.write_str(s)
    }
}

/// Per-frame stereo state: mode, accumulated rotation and frame phase.
///
/// Owned by the application and only touched from the event loop thread.
#[derive(Debug, Clone)]
pub struct FrameLoop {
    mode: StereoMode,
    rotation: f32,
    separation: f32,
    rotation_step: f32,
    phase: FramePhase,
}

impl FrameLoop {
    pub fn new(config: &StereoConfig) -> Self {
        Self {
            mode: config.initial_mode,
            rotation: 0.0,
            separation: config.separation,
            rotation_step: config.rotation_step,
            phase: FramePhase::Idle,
        }
    }

    #[inline]
    pub fn mode(&self) -> StereoMode {
        self.mode
    }

    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    #[inline]
    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.phase == FramePhase::Shutdown
    }

    /// Rotation used for `eye` this frame.
    ///
    /// The left eye is offset by `+mode * separation`, the right eye by the
    /// opposite amount.
    pub fn eye_angle(&self, eye: Eye) -> f32 {
        let offset = self.mode.factor() * self.separation;
        match eye {
            Eye::Left => self.rotation + offset,
            Eye::Right => self.rotation - offset,
        }
    }

    /// Applies one discrete input event.
    pub fn handle_input(&mut self, event: InputEvent) -> AppControl {
        match event {
            InputEvent::KeyPressed(Key::Escape) => {
                self.shutdown();
                AppControl::Exit
            }
            InputEvent::KeyPressed(Key::Space) => {
                self.mode.toggle();
                log::info!("stereo mode: {} ({})", self.mode.raw(), self.mode);
                AppControl::Continue
            }
            InputEvent::KeyPressed(_) => AppControl::Continue,
        }
    }

    /// Records one frame for a drawable of `size` physical pixels.
    ///
    /// The size is read fresh every call so a resize takes effect on the next
    /// frame. Leaves the loop in [`FramePhase::Present`]; call
    /// [`finish_frame`](Self::finish_frame) once the frame was submitted.
    pub fn record_frame<P: FramePasses + ?Sized>(&mut self, passes: &mut P, size: (u32, u32)) {
        if self.is_shutdown() {
            return;
        }

        for eye in Eye::ALL {
            passes.clear_layer(eye);
        }

        self.phase = FramePhase::RenderEyeA;
        passes.render_eye(Eye::Left, self.eye_angle(Eye::Left));

        self.phase = FramePhase::RenderEyeB;
        passes.render_eye(Eye::Right, self.eye_angle(Eye::Right));

        self.phase = FramePhase::Composite;
        passes.clear_window();
        let halves = side_by_side(size.0, size.1);
        for (eye, rect) in Eye::ALL.into_iter().zip(halves) {
            passes.composite(eye, rect);
        }

        self.phase = FramePhase::Present;
    }

    /// Advances the rotation after a presented frame and returns to idle.
    pub fn finish_frame(&mut self) {
        if self.is_shutdown() {
            return;
        }
        self.rotation += self.rotation_step;
        self.phase = FramePhase::Idle;
    }

    /// Enters the terminal phase.
    pub fn shutdown(&mut self) {
        if !self.is_shutdown() {
            log::debug!("frame loop: {} -> shutdown", self.phase);
        }
        self.phase = FramePhase::Shutdown;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[derive(Debug, Clone, PartialEq)]
    enum Pass {
        ClearLayer(Eye),
        RenderEye(Eye, f32),
        ClearWindow,
        Composite(Eye, ViewportRect),
    }

    #[derive(Default)]
    struct Recorder {
        passes: Vec<Pass>,
    }

    impl FramePasses for Recorder {
        fn clear_layer(&mut self, eye: Eye) {
            self.passes.push(Pass::ClearLayer(eye));
        }

        fn render_eye(&mut self, eye: Eye, angle: f32) {
            self.passes.push(Pass::RenderEye(eye, angle));
        }

        fn clear_window(&mut self) {
            self.passes.push(Pass::ClearWindow);
        }

        fn composite(&mut self, eye: Eye, rect: ViewportRect) {
            self.passes.push(Pass::Composite(eye, rect));
        }
    }

    fn frame_loop(mode: StereoMode) -> FrameLoop {
        FrameLoop::new(&StereoConfig {
            initial_mode: mode,
            ..StereoConfig::default()
        })
    }

    fn record(fl: &mut FrameLoop, size: (u32, u32)) -> Vec<Pass> {
        let mut rec = Recorder::default();
        fl.record_frame(&mut rec, size);
        rec.passes
    }

    fn angles(passes: &[Pass]) -> Vec<(Eye, f32)> {
        passes
            .iter()
            .filter_map(|p| match p {
                Pass::RenderEye(eye, angle) => Some((*eye, *angle)),
                _ => None,
            })
            .collect()
    }

    // ── ordering ──────────────────────────────────────────────────────────

    #[test]
    fn frame_records_passes_in_order() {
        let mut fl = frame_loop(StereoMode::OFF);
        let passes = record(&mut fl, (800, 400));

        assert_eq!(
            passes,
            vec![
                Pass::ClearLayer(Eye::Left),
                Pass::ClearLayer(Eye::Right),
                Pass::RenderEye(Eye::Left, 0.0),
                Pass::RenderEye(Eye::Right, 0.0),
                Pass::ClearWindow,
                Pass::Composite(Eye::Left, ViewportRect::new(0, 0, 400, 400)),
                Pass::Composite(Eye::Right, ViewportRect::new(400, 0, 400, 400)),
            ]
        );
    }

    #[test]
    fn phases_walk_through_frame() {
        let mut fl = frame_loop(StereoMode::OFF);
        assert_eq!(fl.phase(), FramePhase::Idle);

        record(&mut fl, (800, 400));
        assert_eq!(fl.phase(), FramePhase::Present);

        fl.finish_frame();
        assert_eq!(fl.phase(), FramePhase::Idle);
    }

    // ── eye angles ────────────────────────────────────────────────────────

    #[test]
    fn mode_off_renders_both_eyes_at_same_angle() {
        let mut fl = frame_loop(StereoMode::OFF);
        let a = angles(&record(&mut fl, (800, 400)));
        assert_eq!(a, vec![(Eye::Left, 0.0), (Eye::Right, 0.0)]);
    }

    #[test]
    fn positive_mode_separates_eyes_symmetrically() {
        let mut fl = frame_loop(StereoMode::POSITIVE);
        let a = angles(&record(&mut fl, (800, 400)));
        assert_relative_eq!(a[0].1, 0.05);
        assert_relative_eq!(a[1].1, -0.05);
    }

    #[test]
    fn negative_mode_mirrors_separation() {
        let fl = frame_loop(StereoMode::NEGATIVE);
        assert_relative_eq!(fl.eye_angle(Eye::Left), -0.05);
        assert_relative_eq!(fl.eye_angle(Eye::Right), 0.05);
    }

    #[test]
    fn rotation_advances_once_per_frame() {
        let mut fl = frame_loop(StereoMode::OFF);
        for _ in 0..3 {
            record(&mut fl, (800, 400));
            fl.finish_frame();
        }
        assert_relative_eq!(fl.rotation(), 0.03, epsilon = 1e-6);

        let a = angles(&record(&mut fl, (800, 400)));
        assert_relative_eq!(a[0].1, 0.03, epsilon = 1e-6);
    }

    #[test]
    fn eye_angles_center_on_rotation() {
        let mut fl = frame_loop(StereoMode::POSITIVE);
        for _ in 0..10 {
            fl.finish_frame();
        }
        let mid = (fl.eye_angle(Eye::Left) + fl.eye_angle(Eye::Right)) / 2.0;
        assert_relative_eq!(mid, fl.rotation(), epsilon = 1e-6);
    }

    // ── input ─────────────────────────────────────────────────────────────

    #[test]
    fn space_toggles_mode_each_press() {
        let mut fl = frame_loop(StereoMode::OFF);
        let seen: Vec<i8> = (0..4)
            .map(|_| {
                assert_eq!(fl.handle_input(InputEvent::KeyPressed(Key::Space)), AppControl::Continue);
                fl.mode().raw()
            })
            .collect();
        assert_eq!(seen, vec![1, -1, 0, 1]);
    }

    #[test]
    fn toggled_mode_applies_on_next_frame() {
        let mut fl = frame_loop(StereoMode::OFF);
        fl.handle_input(InputEvent::KeyPressed(Key::Space));
        let a = angles(&record(&mut fl, (800, 400)));
        assert!(a[0].1 > a[1].1);
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut fl = frame_loop(StereoMode::POSITIVE);
        for key in [Key::Unknown(28), Key::Unknown(42)] {
            assert_eq!(fl.handle_input(InputEvent::KeyPressed(key)), AppControl::Continue);
        }
        assert_eq!(fl.mode(), StereoMode::POSITIVE);
        assert_eq!(fl.phase(), FramePhase::Idle);
    }

    // ── shutdown ──────────────────────────────────────────────────────────

    #[test]
    fn escape_shuts_down() {
        let mut fl = frame_loop(StereoMode::POSITIVE);
        assert_eq!(fl.handle_input(InputEvent::KeyPressed(Key::Escape)), AppControl::Exit);
        assert!(fl.is_shutdown());
    }

    #[test]
    fn shutdown_is_terminal() {
        let mut fl = frame_loop(StereoMode::POSITIVE);
        fl.shutdown();

        assert!(record(&mut fl, (800, 400)).is_empty());
        fl.finish_frame();
        assert_eq!(fl.phase(), FramePhase::Shutdown);
        assert_eq!(fl.rotation(), 0.0);
    }

    // ── viewports ─────────────────────────────────────────────────────────

    fn composite_rects(passes: &[Pass]) -> Vec<(Eye, ViewportRect)> {
        passes
            .iter()
            .filter_map(|p| match p {
                Pass::Composite(eye, rect) => Some((*eye, *rect)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn resize_recomputes_viewports_next_frame() {
        let mut fl = frame_loop(StereoMode::POSITIVE);

        let before = composite_rects(&record(&mut fl, (800, 400)));
        fl.finish_frame();
        let after = composite_rects(&record(&mut fl, (1024, 300)));

        assert_eq!(before[1].1, ViewportRect::new(400, 0, 400, 400));
        assert_eq!(
            after,
            vec![
                (Eye::Left, ViewportRect::new(0, 0, 512, 300)),
                (Eye::Right, ViewportRect::new(512, 0, 512, 300)),
            ]
        );
    }

    #[test]
    fn left_layer_goes_left_right_layer_goes_right() {
        let mut fl = frame_loop(StereoMode::POSITIVE);
        for (w, h) in [(2, 1), (640, 480), (1921, 1080)] {
            let rects = composite_rects(&record(&mut fl, (w, h)));
            assert_eq!(rects[0].0, Eye::Left);
            assert_eq!(rects[0].1.x, 0);
            assert_eq!(rects[1].0, Eye::Right);
            assert!(rects[1].1.x >= rects[0].1.right());
            fl.finish_frame();
        }
    }
}

use crate::input::InputEvent;

use super::ctx::{FrameCtx, InitCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
///
/// All callbacks run on the event loop thread, in this order: `on_init` once,
/// then any number of `on_input` / `on_frame`, then `on_shutdown` once.
pub trait App {
    /// Called once after the window and GPU context exist.
    ///
    /// Build GPU resources here. An error aborts startup.
    fn on_init(&mut self, ctx: &InitCtx<'_, '_>) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called for every fresh key press.
    fn on_input(&mut self, event: InputEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per rendered frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Called once when the runtime is shutting down.
    fn on_shutdown(&mut self) {}
}

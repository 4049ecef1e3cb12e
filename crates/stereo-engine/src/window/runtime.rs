use std::fmt;

use anyhow::Context;
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, InitCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::{InputEvent, Key};
use crate::time::{FrameClock, FrameTime};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "stereo cube".to_string(),
            initial_size: LogicalSize::new(800.0, 400.0),
        }
    }
}

/// Why the runtime stopped before a normal shutdown.
#[derive(Debug)]
pub enum RuntimeError {
    /// The platform event loop could not be created.
    HostInit(anyhow::Error),
    /// The window or its GPU context could not be created.
    WindowCreation(anyhow::Error),
    /// `App::on_init` failed to build its GPU resources.
    ResourceBuild(anyhow::Error),
    /// The event loop terminated with an error.
    EventLoop(anyhow::Error),
}

impl RuntimeError {
    /// Process exit status for this failure; `0` is reserved for normal exit.
    pub fn exit_code(&self) -> u8 {
        match self {
            RuntimeError::HostInit(_) => 1,
            RuntimeError::WindowCreation(_) => 2,
            RuntimeError::ResourceBuild(_) => 3,
            RuntimeError::EventLoop(_) => 4,
        }
    }

    fn inner(&self) -> &anyhow::Error {
        match self {
            RuntimeError::HostInit(e)
            | RuntimeError::WindowCreation(e)
            | RuntimeError::ResourceBuild(e)
            | RuntimeError::EventLoop(e) => e,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            RuntimeError::HostInit(_) => "host initialization failed",
            RuntimeError::WindowCreation(_) => "window creation failed",
            RuntimeError::ResourceBuild(_) => "GPU resource build failed",
            RuntimeError::EventLoop(_) => "event loop failed",
        };
        write!(f, "{what}: {:#}", self.inner())
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let inner: &(dyn std::error::Error + 'static) = self.inner().as_ref();
        Some(inner)
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window, drives `app` until shutdown and returns the reason
    /// it stopped, if abnormal.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<(), RuntimeError>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new()
            .context("failed to create winit EventLoop")
            .map_err(RuntimeError::HostInit)?;

        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")
            .map_err(RuntimeError::EventLoop)?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    window: Option<WindowEntry>,
    failure: Option<RuntimeError>,
    exit_requested: bool,
    shut_down: bool,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            window: None,
            failure: None,
            exit_requested: false,
            shut_down: false,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: RuntimeError) {
        log::error!("{err}");
        self.failure.get_or_insert(err);
        self.request_exit(event_loop);
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry, RuntimeError> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")
            .map_err(RuntimeError::WindowCreation)?;

        let gpu_init = self.gpu_init.clone();

        WindowEntryTryBuilder {
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed for window")
        .map_err(RuntimeError::WindowCreation)
    }

    fn init_app(&mut self, entry: &WindowEntry) -> Result<(), RuntimeError> {
        let app = &mut self.app;
        entry
            .with(|fields| {
                let ctx = InitCtx {
                    window: WindowCtx {
                        id: fields.window.id(),
                        window: fields.window,
                    },
                    gpu: fields.gpu,
                };
                app.on_init(&ctx)
            })
            .map_err(RuntimeError::ResourceBuild)
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId) {
        let (app, window) = (&mut self.app, &mut self.window);
        let Some(entry) = window.as_mut() else {
            return;
        };

        let control = entry.with_mut(|fields| {
            let ft: FrameTime = fields.clock.tick();
            let mut ctx = FrameCtx {
                window: WindowCtx {
                    id: window_id,
                    window: fields.window,
                },
                gpu: fields.gpu,
                time: ft,
            };
            app.on_frame(&mut ctx)
        });

        if control == AppControl::Exit {
            self.request_exit(event_loop);
        }
    }

    fn key_input(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        // One physical press yields one event: releases and auto-repeats are dropped.
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }

        let key = map_key(event.physical_key);
        if self.app.on_input(InputEvent::KeyPressed(key)) == AppControl::Exit {
            self.request_exit(event_loop);
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.exit_requested {
            return;
        }

        let entry = match self.create_window_entry(event_loop) {
            Ok(entry) => entry,
            Err(err) => return self.fail(event_loop, err),
        };

        if let Err(err) = self.init_app(&entry) {
            return self.fail(event_loop, err);
        }

        entry.with_window(|w| w.request_redraw());
        self.window = Some(entry);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; the animation advances once per frame.
        if let Some(entry) = &self.window {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        // Close requests are honored before the next frame is driven.
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        match &event {
            WindowEvent::CloseRequested => self.request_exit(event_loop),

            WindowEvent::KeyboardInput { event, .. } => self.key_input(event_loop, event),

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.window.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.window.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop, window_id),

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        self.app.on_shutdown();

        // GPU objects go before the window they borrow.
        self.window = None;
        log::debug!("runtime shut down");
    }
}

fn map_key(pk: PhysicalKey) -> Key {
    match pk {
        PhysicalKey::Code(code) => match code {
            KeyCode::Escape => Key::Escape,
            KeyCode::Space => Key::Space,
            other => Key::Unknown(other as u32),
        },

        // NativeKeyCode is not a u32 in winit 0.30; preserve "unknown" without a stable numeric.
        PhysicalKey::Unidentified(_) => Key::Unknown(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── key mapping ───────────────────────────────────────────────────────

    #[test]
    fn control_keys_are_named() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Escape)), Key::Escape);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Space)), Key::Space);
    }

    #[test]
    fn other_keys_are_unknown() {
        assert!(matches!(map_key(PhysicalKey::Code(KeyCode::KeyQ)), Key::Unknown(_)));
        assert_ne!(
            map_key(PhysicalKey::Code(KeyCode::KeyQ)),
            map_key(PhysicalKey::Code(KeyCode::KeyW))
        );
    }

    // ── errors ────────────────────────────────────────────────────────────

    #[test]
    fn exit_codes_are_distinct_and_nonzero() {
        let errors = [
            RuntimeError::HostInit(anyhow::anyhow!("a")),
            RuntimeError::WindowCreation(anyhow::anyhow!("b")),
            RuntimeError::ResourceBuild(anyhow::anyhow!("c")),
            RuntimeError::EventLoop(anyhow::anyhow!("d")),
        ];
        let codes: Vec<u8> = errors.iter().map(RuntimeError::exit_code).collect();
        assert_eq!(codes, vec![1, 2, 3, 4]);
    }

    #[test]
    fn error_display_keeps_context_chain() {
        let err = RuntimeError::ResourceBuild(
            anyhow::anyhow!("bad shader").context("failed to build stereo pipeline"),
        );
        let text = err.to_string();
        assert!(text.starts_with("GPU resource build failed"));
        assert!(text.contains("failed to build stereo pipeline"));
        assert!(text.contains("bad shader"));
    }

    #[test]
    fn default_window_is_wide_stereo_pair() {
        let config = RuntimeConfig::default();
        assert_eq!(config.title, "stereo cube");
        assert_eq!(config.initial_size, LogicalSize::new(800.0, 400.0));
    }
}

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::coords::Viewport;
use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::winit::translate_window_event;
use crate::input::InputFrame;
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
            title: "reveal".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Entry point for the runtime.
///
/// Drives one window: every redraw produces one `App::on_frame` call, and the
/// next redraw is requested from `about_to_wait`, so the frame loop is an
/// event-loop iteration rather than a recursive callback.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Splits a window size into the surface size and the clamped viewport.
///
/// The surface always takes the raw backing size, including 0×0 while the
/// window is minimized; only the viewport is clamped.
fn window_extents(inner: PhysicalSize<u32>, scale_factor: f64) -> (PhysicalSize<u32>, Viewport) {
    (inner, Viewport::from_physical(inner, scale_factor))
}

#[self_referencing]
struct WindowEntry {
    input_frame: InputFrame,
    clock: FrameClock,
    viewport: Viewport,

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

    entry: Option<WindowEntry>,
    exit_requested: bool,
    fatal: Option<anyhow::Error>,
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
            entry: None,
            exit_requested: false,
            fatal: None,
        }
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let id = window.id();
        let (surface_size, viewport) = window_extents(window.inner_size(), window.scale_factor());
        let gpu_init = self.gpu_init.clone();

        let mut entry = WindowEntryTryBuilder {
            input_frame: InputFrame::default(),
            clock: FrameClock::default(),
            viewport,
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        entry.with_gpu_mut(|gpu| gpu.resize(surface_size));
        log::info!(
            "window ready: {}x{} logical, pixel ratio {}",
            viewport.width,
            viewport.height,
            viewport.pixel_ratio
        );

        self.app.on_resize(id, viewport);
        entry.with_window(|w| w.request_redraw());
        self.entry = Some(entry);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.fatal = Some(err);
        self.exit_requested = true;
        event_loop.exit();
    }

    fn handle_resize(&mut self, window_id: WindowId) {
        let Some(entry) = self.entry.as_mut() else { return };

        let viewport = entry.with_mut(|fields| {
            let (surface_size, vp) =
                window_extents(fields.window.inner_size(), fields.window.scale_factor());
            *fields.viewport = vp;
            fields.gpu.resize(surface_size);
            vp
        });
        entry.with_window(|w| w.request_redraw());

        log::debug!(
            "viewport {}x{} @ {}x",
            viewport.width,
            viewport.height,
            viewport.pixel_ratio
        );
        self.app.on_resize(window_id, viewport);
    }

    fn redraw(&mut self) -> AppControl {
        let (app, entry) = (&mut self.app, &mut self.entry);
        let Some(entry) = entry.as_mut() else {
            return AppControl::Continue;
        };

        entry.with_mut(|fields| {
            let ft: FrameTime = fields.clock.tick();

            let control = {
                let mut ctx = FrameCtx {
                    window: WindowCtx {
                        window: fields.window,
                    },
                    gpu: fields.gpu,
                    input_frame: fields.input_frame,
                    time: ft,
                    viewport: *fields.viewport,
                };
                app.on_frame(&mut ctx)
            };

            // Per-frame deltas are consumed by exactly one frame.
            fields.input_frame.clear();
            control
        })
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            self.fail(event_loop, e.context("failed to create initial window"));
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous animation: schedule the next frame.
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        entry.with_mut(|fields| {
            if let Some(ev) = translate_window_event(fields.window, &event) {
                fields.input_frame.push_event(ev);
            }
        });

        if self.app.on_window_event(window_id, &event) == AppControl::Exit {
            self.exit_requested = true;
            event_loop.exit();
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                log::info!("close requested");
                self.entry = None;
                self.exit_requested = true;
                event_loop.exit();
            }

            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.handle_resize(window_id);
            }

            WindowEvent::RedrawRequested => {
                if self.redraw() == AppControl::Exit {
                    self.exit_requested = true;
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimized_window_requests_empty_surface() {
        let (surface, viewport) = window_extents(PhysicalSize::new(0, 0), 1.0);
        assert_eq!(surface, PhysicalSize::new(0, 0));
        assert_eq!(viewport.logical_size(), (1, 1));
    }

    #[test]
    fn high_dpi_surface_keeps_backing_size() {
        let (surface, viewport) = window_extents(PhysicalSize::new(3000, 1500), 3.0);
        assert_eq!(surface, PhysicalSize::new(3000, 1500));
        assert_eq!(viewport.logical_size(), (1000, 500));
        assert_eq!(viewport.render_size(), (2000, 1000));
    }

    #[test]
    fn low_dpi_render_size_matches_surface() {
        let (surface, viewport) = window_extents(PhysicalSize::new(1600, 900), 1.0);
        assert_eq!(viewport.render_size(), (surface.width, surface.height));
    }
}

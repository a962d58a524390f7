use crate::keys::browser_key_code;
use ab_glyph::FontArc;
use anyhow::{Result, anyhow};
use dims_core::StimulusFrame;
use dims_render::SkiaRenderer;
use dims_timing::HighPrecisionTimer;
use dims_trial::{Display, TrialController, TrialEvent, TrialResult, ValidatedTrial};
use pixels::{Pixels, SurfaceTexture};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Fullscreen, Window, WindowId},
};

/// Window surface a trial draws on. Hides the cursor while alive and
/// restores it when dropped.
pub struct PixelsDisplay {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    renderer: SkiaRenderer,
    background: [u8; 4],
}

impl PixelsDisplay {
    pub fn new(window: Arc<Window>, font: Option<FontArc>, background: [u8; 4]) -> Result<Self> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width, size.height, Arc::clone(&window));
        let pixels = Pixels::new(size.width, size.height, surface)?;
        let renderer = SkiaRenderer::new(size.width.max(1), size.height.max(1), font)?;

        window.set_cursor_visible(false);
        Ok(Self {
            window,
            pixels,
            renderer,
            background,
        })
    }

    /// Re-presents the last frame.
    pub fn redraw(&self) -> Result<()> {
        self.pixels.render()?;
        Ok(())
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) -> Result<()> {
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(size.width, size.height)?;
        self.pixels.resize_buffer(size.width, size.height)?;
        self.present(size)?;
        debug!(width = size.width, height = size.height, "display resized");
        Ok(())
    }

    fn present(&mut self, size: PhysicalSize<u32>) -> Result<()> {
        self.renderer.present(
            self.pixels.frame_mut(),
            size.width,
            size.height,
            self.background,
        )?;
        self.pixels.render()?;
        Ok(())
    }
}

impl Display for PixelsDisplay {
    fn viewport(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn draw(&mut self, frame: &StimulusFrame) -> Result<()> {
        self.renderer.render_frame(frame)?;
        self.present(self.window.inner_size())
    }
}

impl Drop for PixelsDisplay {
    fn drop(&mut self) {
        self.window.set_cursor_visible(true);
        debug!("display released");
    }
}

pub struct App {
    trial: Option<ValidatedTrial>,
    font: Option<FontArc>,
    windowed: bool,
    timer: HighPrecisionTimer,
    window: Option<Arc<Window>>,
    controller: Option<TrialController<PixelsDisplay, HighPrecisionTimer>>,
    result: Option<TrialResult>,
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new(trial: ValidatedTrial, font: Option<FontArc>, windowed: bool) -> Self {
        Self {
            trial: Some(trial),
            font,
            windowed,
            timer: HighPrecisionTimer::new(),
            window: None,
            controller: None,
            result: None,
            error: None,
        }
    }

    /// Runs the event loop until the trial resolves or the window closes.
    /// `None` means the window was closed before the trial ended.
    pub fn run(mut self) -> Result<Option<TrialResult>> {
        let event_loop = EventLoop::new()?;
        info!(
            platform = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "starting trial window"
        );
        event_loop.run_app(&mut self)?;

        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(self.result.take()),
        }
    }

    fn create_window(&self, event_loop: &ActiveEventLoop) -> Result<Arc<Window>> {
        let mut attributes = Window::default_attributes()
            .with_title("Dimensions")
            .with_resizable(self.windowed);

        if self.windowed {
            attributes = attributes.with_inner_size(LogicalSize::new(1280.0, 720.0));
        } else {
            let monitor = event_loop
                .primary_monitor()
                .or_else(|| event_loop.available_monitors().next())
                .ok_or_else(|| anyhow!("no monitor available"))?;
            if let Some(mhz) = monitor.refresh_rate_millihertz() {
                info!(refresh_hz = mhz as f64 / 1000.0, "using primary monitor");
            }
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(Some(monitor))));
        }

        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        info!(
            width = size.width,
            height = size.height,
            scale_factor = window.scale_factor(),
            "window created"
        );
        Ok(window)
    }

    /// Whether the window has reached the size the trial should be laid out
    /// for.
    fn window_settled(&self, window: &Window) -> bool {
        viewport_settled(
            self.windowed,
            window.inner_size(),
            window.current_monitor().map(|m| m.size()),
        )
    }

    fn start_trial(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = self
            .window
            .clone()
            .ok_or_else(|| anyhow!("no window to present on"))?;
        let trial = self
            .trial
            .take()
            .ok_or_else(|| anyhow!("the trial has already run"))?;
        let display = PixelsDisplay::new(Arc::clone(&window), self.font.clone(), trial.background)?;

        let mut controller = TrialController::new(trial, display, self.timer.clone());
        controller.start()?;
        self.controller = Some(controller);
        self.schedule(event_loop);
        Ok(())
    }

    fn finish(&mut self, result: TrialResult, event_loop: &ActiveEventLoop) {
        self.controller = None;
        self.result = Some(result);
        event_loop.exit();
    }

    fn fail(&mut self, e: anyhow::Error, event_loop: &ActiveEventLoop) {
        error!("{e:#}");
        self.controller = None;
        self.error = Some(e);
        event_loop.exit();
    }

    /// Sleeps until the deadline, or until the next event once it is gone.
    fn schedule(&self, event_loop: &ActiveEventLoop) {
        let due = self.controller.as_ref().and_then(|c| c.deadline_ns());
        match due {
            Some(ns) => event_loop.set_control_flow(ControlFlow::WaitUntil(self.timer.instant_at(ns))),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }

    fn dispatch(&mut self, event: TrialEvent, event_loop: &ActiveEventLoop) {
        let outcome = self
            .controller
            .as_mut()
            .and_then(|c| c.handle_event(event));
        if let Some(result) = outcome {
            self.finish(result, event_loop);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() && self.trial.is_some() {
            match self.create_window(event_loop) {
                Ok(window) => {
                    window.request_redraw();
                    self.window = Some(window);
                }
                Err(e) => self.fail(e, event_loop),
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if self.controller.take().is_some() {
                    warn!("window closed before the trial resolved");
                }
                event_loop.exit();
            }
            WindowEvent::RedrawRequested if self.trial.is_some() => {
                let settled = self.window.as_ref().is_some_and(|w| self.window_settled(w));
                if !settled {
                    debug!("waiting for the window to reach its final size");
                } else if let Err(e) = self.start_trial(event_loop) {
                    self.fail(e, event_loop);
                }
            }
            WindowEvent::RedrawRequested => {
                let redrawn = self
                    .controller
                    .as_ref()
                    .and_then(|c| c.display())
                    .map(PixelsDisplay::redraw);
                if let Some(Err(e)) = redrawn {
                    self.fail(e, event_loop);
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() && !event.repeat => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match browser_key_code(key) {
                        Some(code) => self.dispatch(TrialEvent::KeyPressed(code), event_loop),
                        None => debug!(?key, "unmapped key"),
                    }
                }
            }
            WindowEvent::Resized(size) if self.trial.is_some() => {
                if size.width > 0 && size.height > 0 {
                    if let Err(e) = self.start_trial(event_loop) {
                        self.fail(e, event_loop);
                    }
                }
            }
            WindowEvent::Resized(size) => {
                let resized = self
                    .controller
                    .as_mut()
                    .and_then(|c| c.display_mut())
                    .map(|d| d.resize(size));
                if let Some(Err(e)) = resized {
                    self.fail(e, event_loop);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.controller.is_some() {
            self.dispatch(TrialEvent::Tick, event_loop);
            self.schedule(event_loop);
        }
    }
}

/// A windowed trial can start at any size; a fullscreen one waits until the
/// window covers its monitor.
fn viewport_settled(
    windowed: bool,
    inner: PhysicalSize<u32>,
    monitor: Option<PhysicalSize<u32>>,
) -> bool {
    if inner.width == 0 || inner.height == 0 {
        return false;
    }
    windowed || monitor.is_none_or(|m| m == inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fullscreen_waits_for_the_monitor_size() {
        let monitor = Some(PhysicalSize::new(1920, 1080));
        assert!(!viewport_settled(false, PhysicalSize::new(800, 600), monitor));
        assert!(viewport_settled(false, PhysicalSize::new(1920, 1080), monitor));
        assert!(viewport_settled(false, PhysicalSize::new(800, 600), None));
    }

    #[test]
    fn windowed_starts_at_any_nonzero_size() {
        let monitor = Some(PhysicalSize::new(1920, 1080));
        assert!(viewport_settled(true, PhysicalSize::new(1280, 720), monitor));
        assert!(!viewport_settled(true, PhysicalSize::new(0, 720), monitor));
    }
}

use std::sync::Arc;

use glam::DVec2;
use pixels::{Pixels, SurfaceTexture};
use tracing::{debug, info, warn};
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowBuilder};

use super::input::{InputCollector, InputSnapshot, Key};
use super::loop_runner::{full_title, VisualError, Visualizer};
use super::rendering::{Canvas, RenderTarget};
use super::surface::{FullscreenMode, Surface, SurfaceError, SurfaceEvent};

/// Scroll lines per pixel-precise wheel delta.
const PIXELS_PER_SCROLL_LINE: f64 = 40.0;

/// A winit window presenting the software canvas through `pixels`.
pub struct WindowSurface {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    pixels_size: (u32, u32),
    canvas: Canvas,
    input: InputCollector,
    events: Vec<SurfaceEvent>,
    fullscreen: FullscreenMode,
}

impl WindowSurface {
    pub fn new(window: Arc<Window>) -> Result<Self, SurfaceError> {
        let size = window.inner_size();
        let pixels = build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            pixels_size: (size.width, size.height),
            canvas: Canvas::new(size.width, size.height),
            input: InputCollector::new(),
            events: Vec::new(),
            fullscreen: FullscreenMode::Windowed,
        })
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        if (width, height) != self.pixels_size {
            self.pixels = build_pixels(Arc::clone(&self.window), width, height)?;
            self.pixels_size = (width, height);
        }
        self.canvas.resize(width, height);
        self.events.push(SurfaceEvent::Resized { width, height });
        Ok(())
    }

    pub(crate) fn handle_window_event(&mut self, event: &WindowEvent) -> Result<(), SurfaceError> {
        match event {
            WindowEvent::CloseRequested => self.events.push(SurfaceEvent::CloseRequested),
            WindowEvent::Resized(size) => self.resize(size.width, size.height)?,
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = self.window.inner_size();
                self.resize(size.width, size.height)?;
            }
            WindowEvent::CursorMoved { position, .. } => {
                // winit counts rows from the top; screen space is y-up.
                let (_, height) = self.canvas.size();
                self.input
                    .set_mouse_position(DVec2::new(position.x, f64::from(height) - position.y));
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(key) = map_mouse_button(*button) {
                    self.apply_key_state(key, *state);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(x, y) => DVec2::new(f64::from(*x), f64::from(*y)),
                    MouseScrollDelta::PixelDelta(position) => {
                        DVec2::new(position.x, position.y) / PIXELS_PER_SCROLL_LINE
                    }
                };
                self.input.scroll(lines);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(key) = map_physical_key(event.physical_key) {
                    self.apply_key_state(key, event.state);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn apply_key_state(&mut self, key: Key, state: ElementState) {
        match state {
            ElementState::Pressed => self.input.press(key),
            ElementState::Released => self.input.release(key),
        }
    }
}

impl Surface for WindowSurface {
    fn size(&self) -> (u32, u32) {
        self.canvas.size()
    }

    fn canvas(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        if self.canvas.size() != self.pixels_size {
            debug!("present_skipped_size_mismatch");
            return Ok(());
        }
        let frame = self.pixels.frame_mut();
        if frame.len() != self.canvas.frame().len() {
            debug!("present_skipped_frame_len_mismatch");
            return Ok(());
        }
        frame.copy_from_slice(self.canvas.frame());
        self.pixels.render().map_err(SurfaceError::Present)
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    fn request_size(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        // Configured sizes are logical, matching how the window was built.
        let requested = LogicalSize::new(f64::from(width), f64::from(height));
        if let Some(size) = self.window.request_inner_size(requested) {
            self.resize(size.width, size.height)?;
        }
        Ok(())
    }

    fn fullscreen(&self) -> FullscreenMode {
        self.fullscreen
    }

    fn set_fullscreen(&mut self, mode: FullscreenMode) {
        match mode {
            FullscreenMode::Fullscreen => {
                let monitor = self.window.current_monitor();
                self.window.set_fullscreen(Some(Fullscreen::Borderless(monitor)));
            }
            FullscreenMode::Windowed => self.window.set_fullscreen(None),
        }
        self.fullscreen = mode;
    }

    fn drain_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.events)
    }

    fn input(&mut self) -> InputSnapshot {
        self.input.snapshot()
    }
}

fn build_pixels(window: Arc<Window>, width: u32, height: u32) -> Result<Pixels<'static>, SurfaceError> {
    let surface = SurfaceTexture::new(width, height, window);
    Pixels::new(width, height, surface).map_err(SurfaceError::CreatePixels)
}

fn map_physical_key(key: PhysicalKey) -> Option<Key> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    let key = match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::Tab => Key::Tab,
        KeyCode::Space => Key::Space,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::ControlLeft => Key::LeftControl,
        KeyCode::ControlRight => Key::RightControl,
        KeyCode::KeyM => Key::M,
        _ => return None,
    };
    Some(key)
}

fn map_mouse_button(button: MouseButton) -> Option<Key> {
    match button {
        MouseButton::Left => Some(Key::MouseLeft),
        MouseButton::Right => Some(Key::MouseRight),
        _ => None,
    }
}

fn center_on_monitor(window: &Window) {
    let Some(monitor) = window.current_monitor() else {
        warn!("window_center_skipped_no_monitor");
        return;
    };
    let screen = monitor.size();
    let outer = window.outer_size();
    let origin = monitor.position();
    let x = origin.x + (i64::from(screen.width) - i64::from(outer.width)).max(0) as i32 / 2;
    let y = origin.y + (i64::from(screen.height) - i64::from(outer.height)).max(0) as i32 / 2;
    window.set_outer_position(PhysicalPosition::new(x, y));
}

/// Creates the window and drives `visualizer` from `RedrawRequested` until it
/// closes.
pub(crate) fn run_windowed(visualizer: &mut Visualizer) -> Result<(), VisualError> {
    let config = visualizer.config().clone();
    let (_, title, version) = visualizer.title();

    let event_loop = EventLoop::new().map_err(VisualError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(full_title(&title, &version))
            .with_inner_size(LogicalSize::new(
                f64::from(config.window_width),
                f64::from(config.window_height),
            ))
            .with_resizable(true)
            .with_decorations(!config.undecorated)
            .build(&event_loop)
            .map_err(VisualError::CreateWindow)?,
    );
    if config.window_centered {
        center_on_monitor(&window);
    }
    let mut surface = WindowSurface::new(Arc::clone(&window))?;
    info!(
        width = config.window_width,
        height = config.window_height,
        undecorated = config.undecorated,
        "window_created"
    );

    event_loop.set_control_flow(ControlFlow::Poll);

    let mut failure: Option<VisualError> = None;
    let loop_result = event_loop.run(|event, window_target| match event {
        Event::WindowEvent { window_id, event } if window_id == window.id() => {
            if let WindowEvent::RedrawRequested = event {
                match visualizer.step(&mut surface) {
                    Ok(true) => {}
                    Ok(false) => window_target.exit(),
                    Err(error) => {
                        failure = Some(error);
                        window_target.exit();
                    }
                }
            } else if let Err(error) = surface.handle_window_event(&event) {
                warn!(error = %error, "surface_event_failed");
                failure = Some(error.into());
                window_target.exit();
            }
        }
        Event::AboutToWait => window.request_redraw(),
        Event::LoopExiting => info!("event_loop_exiting"),
        _ => {}
    });

    visualizer.finish();
    loop_result.map_err(VisualError::EventLoopRun)?;
    match failure {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

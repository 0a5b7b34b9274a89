use std::collections::VecDeque;

use thiserror::Error;

use super::input::{InputCollector, InputSnapshot};
use super::rendering::{Canvas, RenderTarget, Rgba};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FullscreenMode {
    #[default]
    Windowed,
    Fullscreen,
}

impl FullscreenMode {
    pub fn toggled(self) -> Self {
        match self {
            FullscreenMode::Windowed => FullscreenMode::Fullscreen,
            FullscreenMode::Fullscreen => FullscreenMode::Windowed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    Resized { width: u32, height: u32 },
    CloseRequested,
}

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("failed to build pixel surface: {0}")]
    CreatePixels(#[source] pixels::Error),
    #[error("failed to present frame: {0}")]
    Present(#[source] pixels::Error),
}

/// The window/graphics capability the scheduler drives.
pub trait Surface {
    fn size(&self) -> (u32, u32);

    fn canvas(&mut self) -> &mut Canvas;

    fn clear(&mut self, color: Rgba) {
        self.canvas().clear(color);
    }

    fn present(&mut self) -> Result<(), SurfaceError>;

    fn set_title(&mut self, title: &str);

    /// Asks for a new inner size in logical units. The physical size in
    /// effect is read back through [`Surface::size`] or arrives later as
    /// [`SurfaceEvent::Resized`].
    fn request_size(&mut self, width: u32, height: u32) -> Result<(), SurfaceError>;

    fn fullscreen(&self) -> FullscreenMode;

    /// The resulting size is reported through the event stream.
    fn set_fullscreen(&mut self, mode: FullscreenMode);

    fn drain_events(&mut self) -> Vec<SurfaceEvent>;

    /// Consumes this frame's input edges and scroll.
    fn input(&mut self) -> InputSnapshot;
}

/// Off-screen surface: renders into memory, takes input from its collector.
#[derive(Debug)]
pub struct HeadlessSurface {
    canvas: Canvas,
    title: String,
    fullscreen: FullscreenMode,
    windowed_size: (u32, u32),
    monitor_size: (u32, u32),
    scale_factor: f64,
    events: VecDeque<SurfaceEvent>,
    input: InputCollector,
    clears: usize,
    presents: usize,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: Canvas::new(width, height),
            title: String::new(),
            fullscreen: FullscreenMode::Windowed,
            windowed_size: (width, height),
            monitor_size: (1920, 1080),
            scale_factor: 1.0,
            events: VecDeque::new(),
            input: InputCollector::new(),
            clears: 0,
            presents: 0,
        }
    }

    pub fn with_monitor_size(mut self, width: u32, height: u32) -> Self {
        self.monitor_size = (width, height);
        self
    }

    /// Physical pixels per logical unit applied to [`Surface::request_size`].
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn input_mut(&mut self) -> &mut InputCollector {
        &mut self.input
    }

    pub fn push_event(&mut self, event: SurfaceEvent) {
        if let SurfaceEvent::Resized { width, height } = event {
            self.canvas.resize(width, height);
        }
        self.events.push_back(event);
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn clears(&self) -> usize {
        self.clears
    }

    pub fn presents(&self) -> usize {
        self.presents
    }

    pub fn frame(&self) -> &Canvas {
        &self.canvas
    }

    fn switch_size(&mut self, (width, height): (u32, u32)) {
        self.canvas.resize(width, height);
        self.events.push_back(SurfaceEvent::Resized { width, height });
    }
}

impl Surface for HeadlessSurface {
    fn size(&self) -> (u32, u32) {
        self.canvas.size()
    }

    fn canvas(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    fn clear(&mut self, color: Rgba) {
        self.clears += 1;
        self.canvas.clear(color);
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        self.presents += 1;
        Ok(())
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn request_size(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        let physical = |logical: u32| (f64::from(logical) * self.scale_factor).round() as u32;
        let (width, height) = (physical(width), physical(height));
        self.windowed_size = (width, height);
        if self.fullscreen == FullscreenMode::Windowed {
            self.canvas.resize(width, height);
        }
        Ok(())
    }

    fn fullscreen(&self) -> FullscreenMode {
        self.fullscreen
    }

    fn set_fullscreen(&mut self, mode: FullscreenMode) {
        if self.fullscreen == mode {
            return;
        }
        self.fullscreen = mode;
        match mode {
            FullscreenMode::Fullscreen => self.switch_size(self.monitor_size),
            FullscreenMode::Windowed => self.switch_size(self.windowed_size),
        }
    }

    fn drain_events(&mut self) -> Vec<SurfaceEvent> {
        self.events.drain(..).collect()
    }

    fn input(&mut self) -> InputSnapshot {
        self.input.snapshot()
    }
}

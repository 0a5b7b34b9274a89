use std::fmt;

use glam::DVec2;
use serde::Deserialize;

use super::input::InputSnapshot;
use super::rendering::{RenderTarget, Rgba};
use super::timing::DEFAULT_VSYNC_HZ;

pub const CORAL: Rgba = [255, 127, 80, 255];
pub const DEFAULT_COMMAND_QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisualizerConfig {
    pub background: Rgba,
    pub window_centered: bool,
    pub undecorated: bool,
    pub title: String,
    pub version: String,
    pub world_width: f64,
    pub world_height: f64,
    pub window_width: u32,
    pub window_height: u32,
    pub initial_zoom_level: f64,
    pub initial_rotate_degrees: f64,
    pub vsync_hz: u32,
    pub command_queue_capacity: usize,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            background: CORAL,
            window_centered: false,
            undecorated: false,
            title: "visualizer".to_string(),
            version: "undefined".to_string(),
            world_width: 60000.0,
            world_height: 20000.0,
            window_width: 900,
            window_height: 600,
            initial_zoom_level: 0.0,
            initial_rotate_degrees: 0.0,
            vsync_hz: DEFAULT_VSYNC_HZ,
            command_queue_capacity: DEFAULT_COMMAND_QUEUE_CAPACITY,
        }
    }
}

impl VisualizerConfig {
    /// Center of the world in world coordinates.
    pub fn pos_center_game(&self) -> DVec2 {
        DVec2::new(self.world_width * 0.5, self.world_height * 0.5)
    }
}

type Hook = Box<dyn FnMut()>;

/// Lifecycle hooks, all optional. Invoked on the scheduler thread.
#[derive(Default)]
pub struct Callbacks {
    pub(crate) on_paused: Option<Hook>,
    pub(crate) on_resumed: Option<Hook>,
    pub(crate) on_drawn: Option<Box<dyn FnMut(&mut dyn RenderTarget)>>,
    pub(crate) on_updated: Option<Box<dyn FnMut(f64)>>,
    pub(crate) on_resized: Option<Box<dyn FnMut(f64, f64)>>,
    pub(crate) on_close: Option<Hook>,
    pub(crate) on_handling_events: Option<Box<dyn FnMut(f64, &InputSnapshot)>>,
    pub(crate) on_logging: Option<Box<dyn FnMut(&str)>>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_paused(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_paused = Some(Box::new(hook));
        self
    }

    pub fn on_resumed(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_resumed = Some(Box::new(hook));
        self
    }

    /// Runs after the world-space actors, still under the camera transform.
    pub fn on_drawn(mut self, hook: impl FnMut(&mut dyn RenderTarget) + 'static) -> Self {
        self.on_drawn = Some(Box::new(hook));
        self
    }

    pub fn on_updated(mut self, hook: impl FnMut(f64) + 'static) -> Self {
        self.on_updated = Some(Box::new(hook));
        self
    }

    pub fn on_resized(mut self, hook: impl FnMut(f64, f64) + 'static) -> Self {
        self.on_resized = Some(Box::new(hook));
        self
    }

    pub fn on_close(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_close = Some(Box::new(hook));
        self
    }

    pub fn on_handling_events(mut self, hook: impl FnMut(f64, &InputSnapshot) + 'static) -> Self {
        self.on_handling_events = Some(Box::new(hook));
        self
    }

    pub fn on_logging(mut self, hook: impl FnMut(&str) + 'static) -> Self {
        self.on_logging = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_paused", &self.on_paused.is_some())
            .field("on_resumed", &self.on_resumed.is_some())
            .field("on_drawn", &self.on_drawn.is_some())
            .field("on_updated", &self.on_updated.is_some())
            .field("on_resized", &self.on_resized.is_some())
            .field("on_close", &self.on_close.is_some())
            .field("on_handling_events", &self.on_handling_events.is_some())
            .field("on_logging", &self.on_logging.is_some())
            .finish()
    }
}

use std::f64::consts::TAU;

use glam::DVec2;
use serde::Deserialize;
use visual::{
    atlas_ascii, Actor, Atlas, Hud, Rect, RenderTarget, Rgba, ATLAS_ASCII_18, BLACK, WHITE,
};

const WORLD_FILL: Rgba = [46, 52, 64, 255];
const WORLD_EDGE: Rgba = [236, 239, 244, 255];
const MARKER_COLOR: Rgba = [136, 192, 208, 255];
const SPINNER_COLOR: Rgba = [235, 203, 139, 255];
const HELP_PLATE: Rgba = [0, 0, 0, 160];
const HUD_MARGIN: f64 = 12.0;
const HUD_PADDING: f64 = 6.0;

pub(crate) const HELP_LINES: [&str; 5] = [
    "Arrows: pan  Wheel: zoom  Enter: rotate",
    "Click: burst  Ctrl+Click: inspect",
    "Tab: fullscreen  Space: pause",
    "Ctrl+M: music",
    "Esc: quit",
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SceneryConfig {
    pub(crate) grid_spacing: f64,
    pub(crate) marker_size: f64,
    pub(crate) spinner_size: f64,
    pub(crate) spinner_degrees_per_second: f64,
    pub(crate) frame_thickness: f64,
}

impl Default for SceneryConfig {
    fn default() -> Self {
        Self {
            grid_spacing: 2000.0,
            marker_size: 60.0,
            spinner_size: 400.0,
            spinner_degrees_per_second: 45.0,
            frame_thickness: 40.0,
        }
    }
}

/// Filled world rectangle with an outline.
pub(crate) struct WorldFrame {
    world: Rect,
    thickness: f64,
}

impl WorldFrame {
    pub(crate) fn new(width: f64, height: f64, thickness: f64) -> Self {
        Self {
            world: Rect::new(DVec2::ZERO, DVec2::new(width, height)),
            thickness,
        }
    }
}

impl Actor for WorldFrame {
    fn update(&mut self, _dt: f64) {}

    fn draw(&self, target: &mut dyn RenderTarget) {
        target.fill_rect(self.world, WORLD_FILL);
        target.stroke_rect(self.world, self.thickness, WORLD_EDGE);
    }
}

pub(crate) struct MarkerGrid {
    markers: Vec<DVec2>,
    half_size: f64,
}

impl MarkerGrid {
    pub(crate) fn new(width: f64, height: f64, spacing: f64, size: f64) -> Self {
        let mut markers = Vec::new();
        if spacing > 0.0 {
            let columns = (width / spacing).floor() as usize;
            let rows = (height / spacing).floor() as usize;
            for row in 0..=rows {
                for column in 0..=columns {
                    markers.push(DVec2::new(column as f64 * spacing, row as f64 * spacing));
                }
            }
        }
        Self {
            markers,
            half_size: size * 0.5,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.markers.len()
    }
}

impl Actor for MarkerGrid {
    fn update(&mut self, _dt: f64) {}

    fn draw(&self, target: &mut dyn RenderTarget) {
        let half = DVec2::splat(self.half_size);
        for marker in &self.markers {
            target.fill_rect(Rect::new(*marker - half, *marker + half), MARKER_COLOR);
        }
    }
}

/// A square turning at a constant rate around its center.
pub(crate) struct Spinner {
    center: DVec2,
    half_size: f64,
    radians_per_second: f64,
    angle: f64,
}

impl Spinner {
    pub(crate) fn new(center: DVec2, size: f64, degrees_per_second: f64) -> Self {
        Self {
            center,
            half_size: size * 0.5,
            radians_per_second: degrees_per_second.to_radians(),
            angle: 0.0,
        }
    }

    fn corners(&self) -> [DVec2; 4] {
        let rotation = DVec2::from_angle(self.angle);
        [
            DVec2::new(-1.0, -1.0),
            DVec2::new(1.0, -1.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(-1.0, 1.0),
        ]
        .map(|corner| self.center + rotation.rotate(corner * self.half_size))
    }
}

impl Actor for Spinner {
    fn update(&mut self, dt: f64) {
        self.angle = (self.angle + self.radians_per_second * dt).rem_euclid(TAU);
    }

    fn draw(&self, target: &mut dyn RenderTarget) {
        target.fill_polygon(&self.corners(), SPINNER_COLOR);
        target.fill_circle(self.center, self.half_size * 0.2, BLACK);
    }
}

/// Control cheat sheet pinned to the top-left corner.
pub(crate) struct HelpHud {
    atlas: &'static Atlas,
    top_left: DVec2,
}

impl HelpHud {
    pub(crate) fn new() -> Self {
        Self {
            atlas: atlas_ascii(ATLAS_ASCII_18),
            top_left: DVec2::new(HUD_MARGIN, HUD_MARGIN),
        }
    }

    fn plate(&self) -> Rect {
        let widest = HELP_LINES
            .iter()
            .map(|line| self.atlas.text_size(line).0)
            .max()
            .unwrap_or(0);
        let height = HELP_LINES.len() as f64 * f64::from(self.atlas.line_height());
        Rect::new(
            DVec2::new(
                self.top_left.x - HUD_PADDING,
                self.top_left.y - height - HUD_PADDING,
            ),
            DVec2::new(
                self.top_left.x + f64::from(widest) + HUD_PADDING,
                self.top_left.y + HUD_PADDING,
            ),
        )
    }
}

impl Actor for HelpHud {
    fn update(&mut self, _dt: f64) {}

    fn draw(&self, target: &mut dyn RenderTarget) {
        target.fill_rect(self.plate(), HELP_PLATE);
        let line_height = f64::from(self.atlas.line_height());
        for (index, line) in HELP_LINES.iter().enumerate() {
            let top_left = self.top_left - DVec2::new(0.0, index as f64 * line_height);
            target.draw_text(top_left, line, self.atlas, WHITE);
        }
    }
}

impl Hud for HelpHud {
    fn position_on_screen(&mut self, _width: f64, height: f64) {
        self.top_left = DVec2::new(HUD_MARGIN, height - HUD_MARGIN);
    }
}

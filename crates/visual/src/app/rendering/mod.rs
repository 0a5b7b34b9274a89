mod anchor;
mod atlas;
mod canvas;

pub use anchor::{anchor_rect, AnchorX, AnchorY};
pub use atlas::{atlas_ascii, Atlas, ATLAS_ASCII_18, ATLAS_ASCII_36, GLYPH_HEIGHT, GLYPH_WIDTH};
pub use canvas::Canvas;

use glam::{DAffine2, DVec2};

pub type Rgba = [u8; 4];

pub const BLACK: Rgba = [0, 0, 0, 255];
pub const WHITE: Rgba = [255, 255, 255, 255];
pub const BROWN: Rgba = [165, 42, 42, 255];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: DVec2,
    pub max: DVec2,
}

impl Rect {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_size(min: DVec2, size: DVec2) -> Self {
        Self::new(min, min + size)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    /// Corners counter-clockwise from `min`.
    pub fn corners(&self) -> [DVec2; 4] {
        [
            self.min,
            DVec2::new(self.max.x, self.min.y),
            self.max,
            DVec2::new(self.min.x, self.max.y),
        ]
    }
}

/// Drawing capability handed to actors. Coordinates go through the current
/// matrix into screen space (origin bottom-left, y up).
pub trait RenderTarget {
    fn size(&self) -> (u32, u32);

    fn matrix(&self) -> DAffine2;

    fn set_matrix(&mut self, matrix: DAffine2);

    fn fill_polygon(&mut self, points: &[DVec2], color: Rgba);

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba);

    /// Text is laid out in screen pixels; only `top_left` is transformed.
    fn draw_text(&mut self, top_left: DVec2, text: &str, atlas: &Atlas, color: Rgba);

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.fill_polygon(&rect.corners(), color);
    }

    fn stroke_rect(&mut self, rect: Rect, thickness: f64, color: Rgba) {
        let t = thickness.max(0.0);
        let Rect { min, max } = rect;
        self.fill_rect(Rect::new(min, DVec2::new(max.x, min.y + t)), color);
        self.fill_rect(Rect::new(DVec2::new(min.x, max.y - t), max), color);
        self.fill_rect(Rect::new(min, DVec2::new(min.x + t, max.y)), color);
        self.fill_rect(Rect::new(DVec2::new(max.x - t, min.y), max), color);
    }
}

use glam::{DAffine2, DVec2};

use super::{Atlas, RenderTarget, Rgba};

/// RGBA8 software frame buffer, rows stored top-down.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    frame: Vec<u8>,
    matrix: DAffine2,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame: vec![0; frame_len(width, height)],
            matrix: DAffine2::IDENTITY,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        self.frame = vec![0; frame_len(width, height)];
    }

    pub fn clear(&mut self, color: Rgba) {
        for pixel in self.frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// Pixel at column `x`, row `y` counted from the top.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let bytes = self.frame.get(offset..offset + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Pixel containing the screen-space point (origin bottom-left).
    pub fn pixel_at_screen(&self, screen: DVec2) -> Option<Rgba> {
        let (x, y) = self.screen_to_pixel(screen);
        if x < 0.0 || y < 0.0 {
            return None;
        }
        self.pixel(x.floor() as u32, y.floor() as u32)
    }

    fn screen_to_pixel(&self, screen: DVec2) -> (f64, f64) {
        (screen.x, f64::from(self.height) - screen.y)
    }

    fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let Some(dst) = self.frame.get_mut(offset..offset + 4) else {
            return;
        };
        match color[3] {
            0 => {}
            255 => dst.copy_from_slice(&color),
            alpha => {
                let a = u32::from(alpha);
                for channel in 0..3 {
                    let src = u32::from(color[channel]);
                    let old = u32::from(dst[channel]);
                    dst[channel] = ((src * a + old * (255 - a) + 127) / 255) as u8;
                }
                let old_alpha = u32::from(dst[3]);
                dst[3] = (a + (old_alpha * (255 - a) + 127) / 255).min(255) as u8;
            }
        }
    }

    fn fill_span(&mut self, row: i64, x_from: f64, x_to: f64, color: Rgba) {
        // Pixel centers inside [x_from, x_to).
        let first = (x_from - 0.5).ceil().max(0.0) as i64;
        let end = (x_to - 0.5).ceil().min(f64::from(self.width)) as i64;
        for x in first..end {
            self.blend_pixel(x, row, color);
        }
    }
}

impl RenderTarget for Canvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn matrix(&self) -> DAffine2 {
        self.matrix
    }

    fn set_matrix(&mut self, matrix: DAffine2) {
        self.matrix = matrix;
    }

    fn fill_polygon(&mut self, points: &[DVec2], color: Rgba) {
        if points.len() < 3 || self.width == 0 || self.height == 0 {
            return;
        }
        let pixels: Vec<(f64, f64)> = points
            .iter()
            .map(|point| self.screen_to_pixel(self.matrix.transform_point2(*point)))
            .collect();
        if pixels.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return;
        }

        let min_y = pixels.iter().map(|(_, y)| *y).fold(f64::INFINITY, f64::min);
        let max_y = pixels
            .iter()
            .map(|(_, y)| *y)
            .fold(f64::NEG_INFINITY, f64::max);
        let first_row = (min_y - 0.5).ceil().max(0.0) as i64;
        let end_row = (max_y - 0.5).ceil().min(f64::from(self.height)) as i64;

        let mut crossings = Vec::with_capacity(pixels.len());
        for row in first_row..end_row {
            let center_y = row as f64 + 0.5;
            crossings.clear();
            for (index, &(x0, y0)) in pixels.iter().enumerate() {
                let (x1, y1) = pixels[(index + 1) % pixels.len()];
                let crosses = (y0 <= center_y && center_y < y1) || (y1 <= center_y && center_y < y0);
                if crosses {
                    crossings.push(x0 + (center_y - y0) / (y1 - y0) * (x1 - x0));
                }
            }
            crossings.sort_by(f64::total_cmp);
            for pair in crossings.chunks_exact(2) {
                self.fill_span(row, pair[0], pair[1], color);
            }
        }
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
        let (cx, cy) = self.screen_to_pixel(self.matrix.transform_point2(center));
        let radius_px = radius * self.matrix.matrix2.determinant().abs().sqrt();
        if radius_px.is_nan() || radius_px <= 0.0 || !cx.is_finite() || !cy.is_finite() {
            return;
        }
        let first_row = (cy - radius_px - 0.5).ceil().max(0.0) as i64;
        let end_row = (cy + radius_px - 0.5).ceil().min(f64::from(self.height)) as i64;
        for row in first_row..end_row {
            let dy = row as f64 + 0.5 - cy;
            let half = (radius_px * radius_px - dy * dy).max(0.0).sqrt();
            self.fill_span(row, cx - half, cx + half, color);
        }
    }

    fn draw_text(&mut self, top_left: DVec2, text: &str, atlas: &Atlas, color: Rgba) {
        let (x, y) = self.screen_to_pixel(self.matrix.transform_point2(top_left));
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        // Text runs right and down from its anchor. Off-screen anchors are
        // skipped before the pen is cast to integers.
        let (text_width, text_height) = atlas.text_size(text);
        if x >= f64::from(self.width)
            || y >= f64::from(self.height)
            || x + f64::from(text_width) < 0.0
            || y + f64::from(text_height) < 0.0
        {
            return;
        }
        let glyph_width = i64::from(atlas.glyph_width());
        let glyph_height = i64::from(atlas.glyph_height());
        let mut pen_x = x.round() as i64;
        let pen_y = y.round() as i64;
        for ch in text.chars() {
            let mask = atlas.glyph(ch);
            for gy in 0..glyph_height {
                for gx in 0..glyph_width {
                    if mask[(gy * glyph_width + gx) as usize] {
                        self.blend_pixel(pen_x + gx, pen_y + gy, color);
                    }
                }
            }
            pen_x += i64::from(atlas.advance());
        }
    }
}

fn frame_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

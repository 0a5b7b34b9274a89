use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use crate::app::lock::{lock_recovering, LockKind};

pub const GLYPH_WIDTH: u32 = 3;
pub const GLYPH_HEIGHT: u32 = 5;
pub const ATLAS_ASCII_18: u32 = 18;
pub const ATLAS_ASCII_36: u32 = 36;

const FIRST_PRINTABLE: u8 = b' ';
const LAST_PRINTABLE: u8 = b'~';
const FALLBACK_CHAR: char = '?';

// 3x5 bitmap font for ' '..='~'. Bits 14..12 are the top row, the leftmost
// column is the high bit of each row.
#[rustfmt::skip]
const GLYPH_BITS: [u16; 95] = [
    0x0000, 0x2482, 0x5a00, 0x5f7d, 0x7ddf, 0x52a5, 0x2aab, 0x2400,
    0x1491, 0x4494, 0x0aa8, 0x05d0, 0x0014, 0x01c0, 0x0002, 0x12a4,
    0x7b6f, 0x2c97, 0x73e7, 0x73cf, 0x5bc9, 0x79cf, 0x79ef, 0x7292,
    0x7bef, 0x7bcf, 0x0410, 0x0414, 0x1511, 0x0e38, 0x4454, 0x72c2,
    0x7be7, 0x2bed, 0x6bae, 0x7927, 0x6b6e, 0x79a7, 0x79a4, 0x796f,
    0x5bed, 0x7497, 0x726f, 0x5bad, 0x4927, 0x5fed, 0x5ffd, 0x7b6f,
    0x6ba4, 0x7b79, 0x6bad, 0x79cf, 0x7492, 0x5b6f, 0x5b6a, 0x5bfd,
    0x5aad, 0x5a92, 0x72a7, 0x6926, 0x4889, 0x324b, 0x2a00, 0x0007,
    0x4400, 0x0e7f, 0x49ae, 0x0f27, 0x13ef, 0x0fa7, 0x39a4, 0x0f79,
    0x49ad, 0x2092, 0x106a, 0x4bad, 0x4927, 0x0ded, 0x0d6d, 0x0f6f,
    0x0d74, 0x0f79, 0x0d64, 0x0f8f, 0x2e93, 0x0b6f, 0x0b6a, 0x0b7a,
    0x0a95, 0x0b79, 0x0e57, 0x3593, 0x2492, 0x64d6, 0x0780,
];

/// Bitmap glyphs pre-scaled for one font size.
#[derive(Debug)]
pub struct Atlas {
    size: u32,
    scale: u32,
    glyphs: Vec<Vec<bool>>,
}

impl Atlas {
    fn build(size: u32) -> Self {
        let scale = (size / (GLYPH_HEIGHT + 1)).max(1);
        let glyphs = GLYPH_BITS
            .iter()
            .map(|bits| rasterize_glyph(*bits, scale))
            .collect();
        Self {
            size,
            scale,
            glyphs,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn glyph_width(&self) -> u32 {
        GLYPH_WIDTH * self.scale
    }

    pub fn glyph_height(&self) -> u32 {
        GLYPH_HEIGHT * self.scale
    }

    pub fn advance(&self) -> u32 {
        (GLYPH_WIDTH + 1) * self.scale
    }

    pub fn line_height(&self) -> u32 {
        (GLYPH_HEIGHT + 2) * self.scale
    }

    /// Pixel size of `text` laid out on a single line.
    pub fn text_size(&self, text: &str) -> (u32, u32) {
        let chars = text.chars().count() as u32;
        if chars == 0 {
            return (0, 0);
        }
        (
            chars * self.advance() - self.scale,
            self.glyph_height(),
        )
    }

    /// Row-major coverage mask, `glyph_width() * glyph_height()` entries.
    /// Characters outside printable ASCII use the `?` glyph.
    pub fn glyph(&self, ch: char) -> &[bool] {
        let index = glyph_index(ch).or_else(|| glyph_index(FALLBACK_CHAR)).unwrap_or(0);
        &self.glyphs[index]
    }
}

fn glyph_index(ch: char) -> Option<usize> {
    let code = u8::try_from(u32::from(ch)).ok()?;
    (FIRST_PRINTABLE..=LAST_PRINTABLE)
        .contains(&code)
        .then(|| usize::from(code - FIRST_PRINTABLE))
}

fn rasterize_glyph(bits: u16, scale: u32) -> Vec<bool> {
    let width = (GLYPH_WIDTH * scale) as usize;
    let height = (GLYPH_HEIGHT * scale) as usize;
    let mut mask = vec![false; width * height];
    for row in 0..GLYPH_HEIGHT {
        let row_bits = (bits >> ((GLYPH_HEIGHT - 1 - row) * GLYPH_WIDTH)) & 0b111;
        for col in 0..GLYPH_WIDTH {
            if row_bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            for sy in 0..scale {
                let y = (row * scale + sy) as usize;
                for sx in 0..scale {
                    let x = (col * scale + sx) as usize;
                    mask[y * width + x] = true;
                }
            }
        }
    }
    mask
}

/// Process-wide atlas for `size`, built on first use and never torn down.
pub fn atlas_ascii(size: u32) -> &'static Atlas {
    static ATLASES: OnceLock<Mutex<HashMap<u32, &'static Atlas>>> = OnceLock::new();
    let cache = ATLASES.get_or_init(|| Mutex::new(HashMap::new()));
    let mut atlases = lock_recovering(cache, LockKind::Shared);
    atlases
        .entry(size)
        .or_insert_with(|| Box::leak(Box::new(Atlas::build(size))))
}

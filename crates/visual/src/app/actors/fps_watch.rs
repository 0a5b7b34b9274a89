use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use glam::DVec2;

use crate::app::lock::{lock_recovering, LockKind};
use crate::app::rendering::{
    anchor_rect, atlas_ascii, Atlas, AnchorX, AnchorY, Rect, RenderTarget, Rgba, ATLAS_ASCII_18,
    BLACK, WHITE,
};
use crate::app::scene::{Actor, Hud};
use crate::app::timing::Ticker;

const FPS_WINDOW: Duration = Duration::from_secs(1);
const LABEL_PADDING: f64 = 4.0;

#[derive(Debug, Clone, PartialEq)]
struct FpsLabel {
    text: String,
    top_left: DVec2,
    plate: Rect,
}

#[derive(Debug)]
struct FpsPublished {
    fps: u32,
    pos: DVec2,
    anchor_y: AnchorY,
    anchor_x: AnchorX,
    label: Option<FpsLabel>,
}

/// Read side of an [`FpsWatch`], safe to hand to other threads.
#[derive(Debug, Clone)]
pub struct FpsReader {
    published: Arc<Mutex<FpsPublished>>,
}

impl FpsReader {
    pub fn fps(&self) -> u32 {
        lock_recovering(&self.published, LockKind::Fps).fps
    }
}

/// Counts frames over one-second windows and shows the last full window's
/// count as a screen-space label.
///
/// The published value and the label primitives share one lock; the frame
/// counter itself is owned by the polling thread.
pub struct FpsWatch {
    frames: u32,
    ticker: Option<Ticker>,
    caption: String,
    color_bg: Rgba,
    color_text: Rgba,
    atlas: &'static Atlas,
    published: Arc<Mutex<FpsPublished>>,
}

impl FpsWatch {
    pub fn new(
        caption: impl Into<String>,
        pos: DVec2,
        anchor_y: AnchorY,
        anchor_x: AnchorX,
        color_bg: Rgba,
        color_text: Rgba,
    ) -> Self {
        Self {
            frames: 0,
            ticker: None,
            caption: caption.into(),
            color_bg,
            color_text,
            atlas: atlas_ascii(ATLAS_ASCII_18),
            published: Arc::new(Mutex::new(FpsPublished {
                fps: 0,
                pos,
                anchor_y,
                anchor_x,
                label: None,
            })),
        }
    }

    /// White text on a black plate, no caption.
    pub fn simple(pos: DVec2, anchor_y: AnchorY, anchor_x: AnchorX) -> Self {
        Self::new("", pos, anchor_y, anchor_x, BLACK, WHITE)
    }

    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    pub(crate) fn start_at(&mut self, now: Instant) {
        self.frames = 0;
        self.ticker = Some(Ticker::new(FPS_WINDOW, now));
    }

    /// Must be called exactly once per frame.
    pub fn poll(&mut self) {
        self.poll_at(Instant::now());
    }

    pub(crate) fn poll_at(&mut self, now: Instant) {
        self.frames = self.frames.saturating_add(1);
        let Some(ticker) = self.ticker.as_mut() else {
            return;
        };
        if !ticker.poll(now) {
            return;
        }
        let fps = self.frames;
        self.frames = 0;

        let mut published = lock_recovering(&self.published, LockKind::Fps);
        published.fps = fps;
        let label = self.layout_label(&published);
        published.label = Some(label);
    }

    pub fn set_pos(&mut self, pos: DVec2, anchor_y: AnchorY, anchor_x: AnchorX) {
        let mut published = lock_recovering(&self.published, LockKind::Fps);
        published.pos = pos;
        published.anchor_y = anchor_y;
        published.anchor_x = anchor_x;
        if published.label.is_some() {
            let label = self.layout_label(&published);
            published.label = Some(label);
        }
    }

    pub fn fps(&self) -> u32 {
        lock_recovering(&self.published, LockKind::Fps).fps
    }

    pub fn reader(&self) -> FpsReader {
        FpsReader {
            published: Arc::clone(&self.published),
        }
    }

    /// Text of the currently displayed label, `None` before the first window closes.
    pub fn label_text(&self) -> Option<String> {
        lock_recovering(&self.published, LockKind::Fps)
            .label
            .as_ref()
            .map(|label| label.text.clone())
    }

    fn layout_label(&self, published: &FpsPublished) -> FpsLabel {
        let text = if self.caption.is_empty() {
            format!("FPS: {}", published.fps)
        } else {
            format!("FPS: {} {}", published.fps, self.caption)
        };
        let (text_width, text_height) = self.atlas.text_size(&text);
        let plate_size = DVec2::new(
            f64::from(text_width) + 2.0 * LABEL_PADDING,
            f64::from(text_height) + 2.0 * LABEL_PADDING,
        );
        let plate = anchor_rect(published.pos, plate_size, published.anchor_y, published.anchor_x);
        FpsLabel {
            text,
            top_left: DVec2::new(plate.min.x + LABEL_PADDING, plate.max.y - LABEL_PADDING),
            plate,
        }
    }
}

impl Actor for FpsWatch {
    fn update(&mut self, _dt: f64) {}

    fn draw(&self, target: &mut dyn RenderTarget) {
        let published = lock_recovering(&self.published, LockKind::Fps);
        let Some(label) = published.label.as_ref() else {
            return;
        };
        target.fill_rect(label.plate, self.color_bg);
        target.draw_text(label.top_left, &label.text, self.atlas, self.color_text);
    }
}

impl Hud for FpsWatch {
    fn position_on_screen(&mut self, width: f64, height: f64) {
        let (anchor_y, anchor_x) = {
            let published = lock_recovering(&self.published, LockKind::Fps);
            (published.anchor_y, published.anchor_x)
        };
        self.set_pos(DVec2::new(width, height), anchor_y, anchor_x);
    }
}

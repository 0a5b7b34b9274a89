use glam::DVec2;

use super::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorX {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Top,
    Middle,
    Bottom,
}

impl AnchorX {
    fn share(self) -> f64 {
        match self {
            AnchorX::Left => 0.0,
            AnchorX::Center => 0.5,
            AnchorX::Right => 1.0,
        }
    }
}

impl AnchorY {
    fn share(self) -> f64 {
        match self {
            AnchorY::Top => 1.0,
            AnchorY::Middle => 0.5,
            AnchorY::Bottom => 0.0,
        }
    }
}

/// Places a box of `size` so that its anchor point lands on `pos`.
/// `Right`/`Top` put the box's right/top edge on `pos` (y-up screen space).
pub fn anchor_rect(pos: DVec2, size: DVec2, anchor_y: AnchorY, anchor_x: AnchorX) -> Rect {
    let min = DVec2::new(
        pos.x - size.x * anchor_x.share(),
        pos.y - size.y * anchor_y.share(),
    );
    Rect::from_size(min, size)
}

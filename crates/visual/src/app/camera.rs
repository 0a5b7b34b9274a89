use glam::{DAffine2, DVec2};

/// Scale factor applied per whole zoom level.
pub const ZOOM_BASE: f64 = 1.2;
pub const ZOOM_LEVEL_DEFAULT: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// 2D camera over a world plane.
///
/// Zoom is stored as a level: [`Camera::zoom`] adds to the level and the
/// applied scale is `ZOOM_BASE ^ level`, so level `0.0` draws the world 1:1
/// and the scale can never reach zero.
///
/// Screen space has its origin at the bottom-left corner with y pointing up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    position: DVec2,
    angle: f64,
    zoom_level: f64,
    viewport: Viewport,
}

impl Camera {
    pub fn new(position: DVec2, viewport: Viewport) -> Self {
        Self {
            position,
            angle: 0.0,
            zoom_level: ZOOM_LEVEL_DEFAULT,
            viewport,
        }
    }

    pub fn move_by(&mut self, delta: DVec2) {
        self.position += delta;
    }

    pub fn rotate(&mut self, degrees: f64) {
        self.angle += degrees.to_radians();
    }

    pub fn zoom(&mut self, delta_level: f64) {
        self.zoom_level += delta_level;
    }

    pub fn set_screen_bound(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// World to screen: `translate(-position)`, `rotate(-angle)`,
    /// `scale(zoom)`, then `translate(viewport center)`.
    pub fn transform(&self) -> DAffine2 {
        DAffine2::from_translation(self.viewport.center())
            * DAffine2::from_scale(DVec2::splat(self.scale()))
            * DAffine2::from_angle(-self.angle)
            * DAffine2::from_translation(-self.position)
    }

    /// Screen to world; the algebraic inverse of [`Camera::transform`].
    pub fn inverse_transform(&self) -> DAffine2 {
        DAffine2::from_translation(self.position)
            * DAffine2::from_angle(self.angle)
            * DAffine2::from_scale(DVec2::splat(self.scale().recip()))
            * DAffine2::from_translation(-self.viewport.center())
    }

    pub fn project(&self, world: DVec2) -> DVec2 {
        self.transform().transform_point2(world)
    }

    pub fn unproject(&self, screen: DVec2) -> DVec2 {
        self.inverse_transform().transform_point2(screen)
    }

    /// Rotates a screen-axis direction into world space so that moving the
    /// camera by the result pans the view along that screen direction.
    pub fn screen_axis_to_world(&self, direction: DVec2) -> DVec2 {
        DVec2::from_angle(self.angle).rotate(direction)
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    /// Accumulated rotation in radians. Not wrapped.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn angle_degrees(&self) -> f64 {
        self.angle.to_degrees()
    }

    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    pub fn scale(&self) -> f64 {
        ZOOM_BASE.powf(self.zoom_level)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
}

use std::f64::consts::TAU;

use glam::DVec2;

use crate::app::rendering::{Rect, RenderTarget, Rgba};
use crate::app::scene::Actor;

pub const BURST_LIFETIME_SECS: f64 = 1.0;
const BASE_PARTICLES_PER_RING: usize = 8;
const SPEED_PER_UNIT_SIZE: f64 = 6.0;

pub const DEFAULT_BURST_COLORS: [Rgba; 4] = [
    [255, 99, 71, 255],
    [255, 215, 0, 255],
    [255, 140, 0, 255],
    [255, 250, 240, 255],
];

#[derive(Debug, Clone)]
struct Particle {
    velocity: DVec2,
    color: Rgba,
}

#[derive(Debug, Clone)]
struct Burst {
    origin: DVec2,
    radius: f64,
    age: f64,
    particles: Vec<Particle>,
}

impl Burst {
    fn progress(&self) -> f64 {
        (self.age / BURST_LIFETIME_SECS).clamp(0.0, 1.0)
    }
}

/// Particle bursts in world space. Each burst is `precision` concentric rings
/// of particles flying outward and fading over [`BURST_LIFETIME_SECS`].
#[derive(Debug, Clone)]
pub struct Explosions {
    world: Rect,
    colors: Vec<Rgba>,
    precision: usize,
    bursts: Vec<Burst>,
}

impl Explosions {
    /// `colors` falls back to [`DEFAULT_BURST_COLORS`] when `None` or empty.
    pub fn new(width: f64, height: f64, colors: Option<Vec<Rgba>>, precision: usize) -> Self {
        let colors = colors
            .filter(|colors| !colors.is_empty())
            .unwrap_or_else(|| DEFAULT_BURST_COLORS.to_vec());
        Self {
            world: Rect::new(DVec2::ZERO, DVec2::new(width, height)),
            colors,
            precision: precision.max(1),
            bursts: Vec::new(),
        }
    }

    /// Starts a burst at `pos`. Points outside the world are ignored.
    pub fn explode_at(&mut self, pos: DVec2, size: DVec2) -> bool {
        let inside = pos.cmpge(self.world.min).all() && pos.cmple(self.world.max).all();
        if !inside {
            return false;
        }
        let extent = size.abs().max_element().max(1.0);
        let mut particles = Vec::new();
        for ring in 0..self.precision {
            let count = BASE_PARTICLES_PER_RING * (ring + 1);
            let speed = extent * SPEED_PER_UNIT_SIZE * (ring + 1) as f64 / self.precision as f64;
            let offset = ring as f64 * 0.5 / count as f64;
            for index in 0..count {
                let angle = TAU * (index as f64 / count as f64 + offset);
                particles.push(Particle {
                    velocity: DVec2::from_angle(angle) * speed,
                    color: self.colors[(ring + index) % self.colors.len()],
                });
            }
        }
        self.bursts.push(Burst {
            origin: pos,
            radius: extent * 0.5,
            age: 0.0,
            particles,
        });
        true
    }

    pub fn is_exploding(&self) -> bool {
        !self.bursts.is_empty()
    }

    pub fn burst_count(&self) -> usize {
        self.bursts.len()
    }
}

impl Actor for Explosions {
    fn update(&mut self, dt: f64) {
        if !self.is_exploding() {
            return;
        }
        for burst in &mut self.bursts {
            burst.age += dt.max(0.0);
        }
        self.bursts.retain(|burst| burst.age < BURST_LIFETIME_SECS);
    }

    fn draw(&self, target: &mut dyn RenderTarget) {
        if !self.is_exploding() {
            return;
        }
        for burst in &self.bursts {
            let remaining = 1.0 - burst.progress();
            let alpha = (255.0 * remaining).round() as u8;
            let radius = burst.radius * remaining;
            for particle in &burst.particles {
                let [r, g, b, a] = particle.color;
                let color = [r, g, b, ((u16::from(a) * u16::from(alpha)) / 255) as u8];
                target.fill_circle(burst.origin + particle.velocity * burst.age, radius, color);
            }
        }
    }
}

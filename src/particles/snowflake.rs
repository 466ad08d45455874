use fastrand::Rng;

use super::{uniform, Bounds, Particle};
use crate::config::SnowConfig;
use crate::surface::{BlendMode, Surface};

const SNOW_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

/// Falls forever: reaching the bottom edge puts it back above the top.
#[derive(Debug, Clone)]
pub struct Snowflake {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub speed: f32,
    pub drift: f32,
    opacity: f32,
}

impl Snowflake {
    pub fn spawn(rng: &mut Rng, tuning: &SnowConfig, bounds: Bounds) -> Self {
        Self {
            x: rng.f32() * bounds.width,
            y: rng.f32() * bounds.height - bounds.height,
            size: uniform(rng, tuning.size_min, tuning.size_max),
            speed: uniform(rng, tuning.speed_min, tuning.speed_max),
            drift: uniform(rng, -tuning.drift, tuning.drift),
            opacity: tuning.opacity,
        }
    }
}

impl Particle for Snowflake {
    fn advance(&mut self, bounds: Bounds, rng: &mut Rng) {
        self.y += self.speed;
        self.x += self.drift;

        if self.y > bounds.height {
            self.y = -self.size.max(1.0);
            self.x = rng.f32() * bounds.width;
        }
    }

    fn render(&self, surface: &mut Surface) {
        surface.fill_circle(self.x, self.y, self.size, SNOW_COLOR, self.opacity, BlendMode::SourceOver);
    }

    fn is_expired(&self) -> bool {
        false
    }
}

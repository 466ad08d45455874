use fastrand::Rng;

use super::{uniform, Bounds, Particle};
use crate::color::hsl_to_rgb;
use crate::config::FireworksConfig;
use crate::surface::{BlendMode, Surface};

const ROCKET_RADIUS: f32 = 1.0;
const SPARK_RADIUS: f32 = 0.7;

#[derive(Debug, Clone)]
pub struct FireworkSpark {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: f32,
    pub decay: f32,
    pub hue: f32,
    drag: f32,
    gravity: f32,
}

impl Particle for FireworkSpark {
    fn advance(&mut self, _bounds: Bounds, _rng: &mut Rng) {
        self.vx *= self.drag;
        self.vy *= self.drag;
        self.vy += self.gravity;
        self.x += self.vx;
        self.y += self.vy;
        self.life -= self.decay;
    }

    fn render(&self, surface: &mut Surface) {
        surface.fill_circle(
            self.x,
            self.y,
            SPARK_RADIUS,
            hsl_to_rgb(self.hue, 1.0, 0.5),
            self.life,
            BlendMode::SourceOver,
        );
    }

    fn is_expired(&self) -> bool {
        self.life <= 0.0
    }
}

#[derive(Debug, Clone, Copy)]
struct Burst {
    spark_count: usize,
    speed_min: f32,
    speed_max: f32,
    decay_min: f32,
    decay_max: f32,
    drag: f32,
    gravity: f32,
    hue_jitter: f32,
}

#[derive(Debug, Clone)]
pub struct Firework {
    pub x: f32,
    pub y: f32,
    pub target_y: f32,
    pub speed: f32,
    pub hue: f32,
    exploded: bool,
    sparks: Vec<FireworkSpark>,
    burst: Burst,
}

impl Firework {
    pub fn launch(rng: &mut Rng, tuning: &FireworksConfig, bounds: Bounds) -> Self {
        let x = rng.f32() * bounds.width;
        let target_y = rng.f32() * bounds.height * 0.3 + bounds.height * tuning.top_margin;
        Self::new(x, bounds.height, target_y, rng.f32() * 360.0, tuning)
    }

    pub fn new(x: f32, y: f32, target_y: f32, hue: f32, tuning: &FireworksConfig) -> Self {
        Self {
            x,
            y,
            target_y,
            speed: tuning.ascent_speed,
            hue,
            exploded: false,
            sparks: Vec::new(),
            burst: Burst {
                spark_count: tuning.spark_count,
                speed_min: tuning.spark_speed_min,
                speed_max: tuning.spark_speed_max,
                decay_min: tuning.decay_min,
                decay_max: tuning.decay_max,
                drag: tuning.drag,
                gravity: tuning.gravity,
                hue_jitter: tuning.hue_jitter,
            },
        }
    }

    #[cfg(test)]
    pub fn is_exploded(&self) -> bool {
        self.exploded
    }

    #[cfg(test)]
    pub fn sparks(&self) -> &[FireworkSpark] {
        &self.sparks
    }

    fn explode(&mut self, rng: &mut Rng) {
        self.exploded = true;
        let burst = self.burst;
        self.sparks.reserve(burst.spark_count);

        for angle in burst_angles(burst.spark_count) {
            let speed = uniform(rng, burst.speed_min, burst.speed_max);
            self.sparks.push(FireworkSpark {
                x: self.x,
                y: self.y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                life: 1.0,
                decay: uniform(rng, burst.decay_min, burst.decay_max),
                hue: self.hue + uniform(rng, -burst.hue_jitter, burst.hue_jitter),
                drag: burst.drag,
                gravity: burst.gravity,
            });
        }
    }
}

/// `count` headings evenly spaced over a full circle, starting at 0.
pub fn burst_angles(count: usize) -> impl Iterator<Item = f32> {
    (0..count).map(move |i| std::f32::consts::TAU * i as f32 / count as f32)
}

impl Particle for Firework {
    fn advance(&mut self, bounds: Bounds, rng: &mut Rng) {
        if !self.exploded {
            self.y -= self.speed;
            if self.y <= self.target_y {
                self.explode(rng);
            }
        } else {
            for spark in &mut self.sparks {
                spark.advance(bounds, rng);
            }
        }
    }

    fn render(&self, surface: &mut Surface) {
        if !self.exploded {
            surface.fill_circle(
                self.x,
                self.y,
                ROCKET_RADIUS,
                hsl_to_rgb(self.hue, 1.0, 0.5),
                1.0,
                BlendMode::SourceOver,
            );
        } else {
            for spark in &self.sparks {
                spark.render(surface);
            }
        }
    }

    fn is_expired(&self) -> bool {
        self.exploded && self.sparks.is_empty()
    }

    fn cull(&mut self) {
        self.sparks.retain(|spark| !spark.is_expired());
    }
}

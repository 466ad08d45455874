use fastrand::Rng;

use super::{uniform, Bounds, Particle};
use crate::color::hsl_to_rgb;
use crate::config::{FireConfig, FlameMotion};
use crate::surface::{BlendMode, GradientStop, Surface};

#[derive(Debug, Clone)]
pub struct FireParticle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: f32,
    pub decay: f32,
    pub size: f32,
    /// Offset from the base flame hue, 0-20 degrees (red-orange)
    hue: f32,
    phase: f32,
    sway: f32,
    lift: f32,
    shrink: f32,
}

impl FireParticle {
    pub fn spawn(x: f32, y: f32, rng: &mut Rng, tuning: &FireConfig) -> Self {
        let (sway, lift) = match tuning.motion {
            FlameMotion::Sway => (tuning.sway_amplitude, 0.0),
            FlameMotion::Updraft => (0.0, tuning.updraft),
        };

        Self {
            x,
            y,
            vx: (rng.f32() - 0.5) * tuning.lateral,
            vy: -uniform(rng, tuning.rise_min, tuning.rise_max),
            life: 1.0,
            decay: uniform(rng, tuning.decay_min, tuning.decay_max),
            size: uniform(rng, tuning.size_min, tuning.size_max),
            hue: rng.f32() * 20.0,
            phase: rng.f32() * std::f32::consts::TAU,
            sway,
            lift,
            shrink: tuning.shrink,
        }
    }
}

impl Particle for FireParticle {
    fn advance(&mut self, _bounds: Bounds, _rng: &mut Rng) {
        self.life -= self.decay;
        // Dancing flames
        self.x += (self.life * 10.0 + self.phase).sin() * self.sway;
        self.vy -= self.lift;
        self.x += self.vx;
        self.y += self.vy;
        self.size *= self.shrink;
    }

    fn render(&self, surface: &mut Surface) {
        if self.life <= 0.0 {
            return;
        }

        // Hot yellow core, orange body, dark red transparent rim
        let stops = [
            GradientStop {
                offset: 0.0,
                rgb: hsl_to_rgb(40.0 + self.hue, 1.0, 0.6),
                alpha: self.life,
            },
            GradientStop {
                offset: 0.4,
                rgb: hsl_to_rgb(20.0 + self.hue, 1.0, 0.5),
                alpha: self.life * 0.8,
            },
            GradientStop {
                offset: 1.0,
                rgb: hsl_to_rgb(0.0, 1.0, 0.2),
                alpha: 0.0,
            },
        ];
        surface.radial_gradient(self.x, self.y, self.size, &stops, BlendMode::Lighter);
    }

    fn is_expired(&self) -> bool {
        self.life <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Bounds = Bounds { width: 60.0, height: 40.0 };

    #[test]
    fn rises_shrinks_and_dies() {
        let mut rng = Rng::with_seed(11);
        let tuning = FireConfig::default();
        let mut flame = FireParticle::spawn(30.0, 38.0, &mut rng, &tuning);
        assert!(flame.vy < 0.0);

        let mut last_life = flame.life;
        let mut last_size = flame.size;
        let mut frames = 0;
        while !flame.is_expired() {
            flame.advance(BOUNDS, &mut rng);
            assert!(flame.life < last_life);
            assert!(flame.size < last_size);
            last_life = flame.life;
            last_size = flame.size;
            frames += 1;
            assert!(frames <= 101, "flame outlived its slowest decay");
        }
        assert!(flame.y < 38.0);
    }

    #[test]
    fn updraft_accelerates_upwards() {
        let mut rng = Rng::with_seed(5);
        let tuning = FireConfig {
            motion: FlameMotion::Updraft,
            ..FireConfig::default()
        };
        let mut flame = FireParticle::spawn(30.0, 38.0, &mut rng, &tuning);
        let x0 = flame.x;
        let vx = flame.vx;
        let vy0 = flame.vy;

        flame.advance(BOUNDS, &mut rng);
        flame.advance(BOUNDS, &mut rng);

        assert!(flame.vy < vy0);
        // No oscillation in this mode, only the initial lateral velocity
        assert!((flame.x - (x0 + 2.0 * vx)).abs() < 1e-5);
    }

    #[test]
    fn renders_additively_while_alive_only() {
        let mut rng = Rng::with_seed(2);
        let mut surface = Surface::new(60, 40);
        let mut flame = FireParticle::spawn(30.0, 30.0, &mut rng, &FireConfig::default());

        flame.render(&mut surface);
        assert!(!surface.is_blank());

        surface.clear();
        flame.life = 0.0;
        flame.render(&mut surface);
        assert!(surface.is_blank());
    }
}

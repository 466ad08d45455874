use super::Effect;
use crate::config::FireConfig;
use crate::particles::{step_all, FireParticle};
use crate::surface::Surface;
use fastrand::Rng;

const SOURCE_LIFT: f32 = 2.0;

pub struct FireEffect {
    surface: Surface,
    flames: Vec<FireParticle>,
    tuning: FireConfig,
    rng: Rng,
}

impl FireEffect {
    pub fn new(width: usize, height: usize, tuning: FireConfig, rng: Rng) -> Self {
        Self {
            surface: Surface::new(width, height),
            flames: Vec::with_capacity(256),
            tuning,
            rng,
        }
    }

    #[cfg(test)]
    pub fn flames(&self) -> &[FireParticle] {
        &self.flames
    }

    fn spawn(&mut self) {
        let width = self.surface.width() as f32;
        let centre_x = width / 2.0;
        let spread = width * self.tuning.source_spread;
        let y = self.surface.height() as f32 - SOURCE_LIFT;

        for _ in 0..self.tuning.spawn_per_frame {
            let x = centre_x + (self.rng.f32() - 0.5) * spread;
            self.flames.push(FireParticle::spawn(x, y, &mut self.rng, &self.tuning));
        }
    }
}

impl Effect for FireEffect {
    fn frame(&mut self) {
        self.surface.clear();
        self.spawn();
        step_all(&mut self.flames, &mut self.surface, &mut self.rng);
    }

    fn surface(&self) -> &Surface {
        &self.surface
    }

    fn resize(&mut self, width: usize, height: usize) {
        self.surface.resize(width, height);
    }

    fn reset(&mut self) {
        self.flames.clear();
        self.surface.clear();
    }

    fn particle_count(&self) -> usize {
        self.flames.len()
    }
}

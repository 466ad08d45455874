use super::Effect;
use crate::config::SnowConfig;
use crate::particles::{step_all, Bounds, Snowflake};
use crate::surface::Surface;
use fastrand::Rng;

pub struct SnowEffect {
    surface: Surface,
    flakes: Vec<Snowflake>,
    tuning: SnowConfig,
    rng: Rng,
}

impl SnowEffect {
    pub fn new(width: usize, height: usize, tuning: SnowConfig, rng: Rng) -> Self {
        let mut effect = Self {
            surface: Surface::new(width, height),
            flakes: Vec::with_capacity(tuning.flake_count),
            tuning,
            rng,
        };
        effect.seed();
        effect
    }

    fn seed(&mut self) {
        if !self.flakes.is_empty() {
            return;
        }
        let bounds = Bounds::of(&self.surface);
        for _ in 0..self.tuning.flake_count {
            self.flakes.push(Snowflake::spawn(&mut self.rng, &self.tuning, bounds));
        }
    }

    #[cfg(test)]
    pub fn flakes(&self) -> &[Snowflake] {
        &self.flakes
    }
}

impl Effect for SnowEffect {
    fn frame(&mut self) {
        self.surface.clear();
        step_all(&mut self.flakes, &mut self.surface, &mut self.rng);
    }

    fn surface(&self) -> &Surface {
        &self.surface
    }

    fn resize(&mut self, width: usize, height: usize) {
        self.surface.resize(width, height);
    }

    fn reset(&mut self) {
        self.flakes.clear();
        self.surface.clear();
    }

    fn prepare(&mut self) {
        self.seed();
    }

    fn particle_count(&self) -> usize {
        self.flakes.len()
    }
}

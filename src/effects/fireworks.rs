use super::Effect;
use crate::color::{parse_hex_color, rgb_to_unit};
use crate::config::FireworksConfig;
use crate::particles::{step_all, Bounds, Firework};
use crate::surface::Surface;
use fastrand::Rng;

/// Night sky of rockets. The surface is never cleared while running; a
/// translucent wash each frame leaves fading afterglow trails.
pub struct FireworksEffect {
    surface: Surface,
    fireworks: Vec<Firework>,
    tuning: FireworksConfig,
    wash: [f32; 3],
    rng: Rng,
}

impl FireworksEffect {
    pub fn new(width: usize, height: usize, tuning: FireworksConfig, rng: Rng) -> Self {
        let wash = rgb_to_unit(parse_hex_color(&tuning.wash_color).unwrap_or((10, 17, 40)));
        Self {
            surface: Surface::new(width, height),
            fireworks: Vec::new(),
            tuning,
            wash,
            rng,
        }
    }

    #[cfg(test)]
    pub fn fireworks(&self) -> &[Firework] {
        &self.fireworks
    }

    pub fn launch(&mut self) {
        let bounds = Bounds::of(&self.surface);
        self.fireworks.push(Firework::launch(&mut self.rng, &self.tuning, bounds));
    }
}

impl Effect for FireworksEffect {
    fn frame(&mut self) {
        self.surface.wash(self.wash, self.tuning.wash_alpha);

        if self.rng.f32() < self.tuning.launch_chance {
            self.launch();
        }

        step_all(&mut self.fireworks, &mut self.surface, &mut self.rng);
    }

    fn surface(&self) -> &Surface {
        &self.surface
    }

    fn resize(&mut self, width: usize, height: usize) {
        self.surface.resize(width, height);
    }

    fn reset(&mut self) {
        self.fireworks.clear();
        self.surface.clear();
    }

    fn particle_count(&self) -> usize {
        self.fireworks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::Particle;

    fn quiet_sky() -> FireworksEffect {
        let tuning = FireworksConfig {
            launch_chance: 0.0,
            ..FireworksConfig::default()
        };
        FireworksEffect::new(80, 50, tuning, Rng::with_seed(8))
    }

    #[test]
    fn wash_tints_the_sky_each_frame() {
        let mut effect = quiet_sky();
        effect.frame();
        assert!(!effect.surface().is_blank());
        assert!((effect.surface().pixel(0, 0).a - 0.1).abs() < 1e-6);
    }

    #[test]
    fn rockets_explode_and_are_removed_when_spent() {
        let mut effect = quiet_sky();
        effect.launch();
        assert_eq!(effect.particle_count(), 1);

        let mut saw_burst = false;
        for _ in 0..400 {
            effect.frame();
            if let Some(fw) = effect.fireworks().first() {
                saw_burst |= fw.is_exploded();
                assert!(!fw.is_expired());
            }
        }
        assert!(saw_burst);
        assert_eq!(effect.particle_count(), 0);
    }

    #[test]
    fn launches_follow_the_configured_chance() {
        let tuning = FireworksConfig {
            launch_chance: 1.0,
            ..FireworksConfig::default()
        };
        let mut effect = FireworksEffect::new(80, 50, tuning, Rng::with_seed(1));
        for _ in 0..10 {
            effect.frame();
        }
        // Nothing can burst before its first ten frames
        assert_eq!(effect.particle_count(), 10);
    }

    #[test]
    fn reset_discards_fireworks_and_blanks_surface() {
        let mut effect = quiet_sky();
        effect.launch();
        for _ in 0..20 {
            effect.frame();
        }
        effect.reset();
        assert_eq!(effect.particle_count(), 0);
        assert!(effect.surface().is_blank());
    }
}

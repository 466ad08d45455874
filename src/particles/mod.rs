use crate::surface::Surface;
use fastrand::Rng;

pub mod firework;
pub mod flame;
pub mod snowflake;

pub use firework::Firework;
pub use flame::FireParticle;
pub use snowflake::Snowflake;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn of(surface: &Surface) -> Self {
        Self {
            width: surface.width() as f32,
            height: surface.height() as f32,
        }
    }
}

pub trait Particle {
    fn advance(&mut self, bounds: Bounds, rng: &mut Rng);
    fn render(&self, surface: &mut Surface);
    fn is_expired(&self) -> bool;
    /// Drops exhausted children of compound particles. Runs after render.
    fn cull(&mut self) {}
}

/// One full frame over a particle collection: advance everything, draw
/// everything, then drop whatever expired. A particle that dies this frame
/// is still drawn once at its final life.
pub fn step_all<P: Particle>(particles: &mut Vec<P>, surface: &mut Surface, rng: &mut Rng) {
    let bounds = Bounds::of(surface);
    for p in particles.iter_mut() {
        p.advance(bounds, rng);
    }
    for p in particles.iter() {
        p.render(surface);
    }
    particles.retain_mut(|p| {
        p.cull();
        !p.is_expired()
    });
}

pub(crate) fn uniform(rng: &mut Rng, min: f32, max: f32) -> f32 {
    min + rng.f32() * (max - min)
}

use crate::surface::Surface;

pub mod fire;
pub mod fireworks;
pub mod snow;

pub use fire::FireEffect;
pub use fireworks::FireworksEffect;
pub use snow::SnowEffect;

pub trait Effect {
    fn frame(&mut self);
    fn surface(&self) -> &Surface;
    fn resize(&mut self, width: usize, height: usize);
    /// Releases every particle and leaves the surface blank.
    fn reset(&mut self);
    fn prepare(&mut self) {}
    fn particle_count(&self) -> usize;
}

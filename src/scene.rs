use std::time::{Duration, Instant};

use crate::effects::{Effect, FireEffect, FireworksEffect, SnowEffect};
use crate::frame_loop::FrameLoop;
use crate::scheduler::{Scheduler, Task, TimerId};
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    Winter,
    TransitioningToCelebration,
    Celebration,
}

struct PendingTransition {
    timer: TimerId,
    started: Instant,
}

pub struct SceneController {
    state: SceneState,
    transition_delay: Duration,
    pending: Option<PendingTransition>,
    snow: FrameLoop<SnowEffect>,
    fire: FrameLoop<FireEffect>,
    fireworks: FrameLoop<FireworksEffect>,
}

impl SceneController {
    pub fn new(
        snow: SnowEffect,
        fire: FireEffect,
        fireworks: FireworksEffect,
        transition_delay: Duration,
    ) -> Self {
        let mut scene = Self {
            state: SceneState::Winter,
            transition_delay,
            pending: None,
            snow: FrameLoop::new("snow", snow),
            fire: FrameLoop::new("fire", fire),
            fireworks: FrameLoop::new("fireworks", fireworks),
        };
        scene.snow.start();
        scene.fire.start();
        scene
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn begin_celebration(&mut self, scheduler: &mut Scheduler, now: Instant) -> bool {
        if self.state != SceneState::Winter {
            return false;
        }
        let timer = scheduler.once(now, self.transition_delay, Task::SceneTransition);
        self.pending = Some(PendingTransition { timer, started: now });
        self.state = SceneState::TransitioningToCelebration;
        log::info!(
            "Target reached, celebrating in {} ms",
            self.transition_delay.as_millis()
        );
        true
    }

    pub fn finish_transition(&mut self) -> bool {
        if self.state != SceneState::TransitioningToCelebration {
            return false;
        }
        self.pending = None;
        self.state = SceneState::Celebration;
        self.snow.stop();
        self.fire.stop();
        self.fireworks.start();
        log::info!("Celebration started");
        true
    }

    /// Forces the scene back to Winter: fireworks stop, their surface is
    /// blanked and every in-flight rocket is dropped. No-op in Winter.
    pub fn reset_to_winter(&mut self, scheduler: &mut Scheduler) -> bool {
        if self.state == SceneState::Winter {
            return false;
        }
        if let Some(pending) = self.pending.take() {
            scheduler.cancel(pending.timer);
        }
        self.fireworks.stop();
        self.snow.start();
        self.fire.start();
        self.state = SceneState::Winter;
        log::info!("Scene reset to winter");
        true
    }

    pub fn frame(&mut self) {
        self.snow.pump();
        self.fire.pump();
        self.fireworks.pump();
    }

    /// How far the display has faded from Winter (0.0) to Celebration (1.0).
    pub fn crossfade(&self, now: Instant) -> f32 {
        match self.state {
            SceneState::Winter => 0.0,
            SceneState::Celebration => 1.0,
            SceneState::TransitioningToCelebration => {
                let Some(pending) = &self.pending else {
                    return 1.0;
                };
                if self.transition_delay.is_zero() {
                    return 1.0;
                }
                let elapsed = now.saturating_duration_since(pending.started);
                (elapsed.as_secs_f32() / self.transition_delay.as_secs_f32()).min(1.0)
            }
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.snow.effect_mut().resize(width, height);
        self.fire.effect_mut().resize(width, height);
        self.fireworks.effect_mut().resize(width, height);
    }

    pub fn winter_layers(&self) -> [&Surface; 2] {
        [self.fire.effect().surface(), self.snow.effect().surface()]
    }

    pub fn celebration_layers(&self) -> [&Surface; 1] {
        [self.fireworks.effect().surface()]
    }

    #[cfg(test)]
    pub fn snow(&self) -> &FrameLoop<SnowEffect> {
        &self.snow
    }

    #[cfg(test)]
    pub fn fire(&self) -> &FrameLoop<FireEffect> {
        &self.fire
    }

    #[cfg(test)]
    pub fn fireworks(&self) -> &FrameLoop<FireworksEffect> {
        &self.fireworks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FireConfig, FireworksConfig, SnowConfig};
    use fastrand::Rng;

    const DELAY: Duration = Duration::from_secs(3);

    fn scene() -> SceneController {
        let fireworks = FireworksConfig {
            launch_chance: 1.0,
            ..FireworksConfig::default()
        };
        SceneController::new(
            SnowEffect::new(40, 30, SnowConfig::default(), Rng::with_seed(1)),
            FireEffect::new(40, 30, FireConfig::default(), Rng::with_seed(2)),
            FireworksEffect::new(40, 30, fireworks, Rng::with_seed(3)),
            DELAY,
        )
    }

    #[test]
    fn starts_in_winter_with_winter_loops() {
        let scene = scene();
        assert_eq!(scene.state(), SceneState::Winter);
        assert!(scene.snow().is_active());
        assert!(scene.fire().is_active());
        assert!(!scene.fireworks().is_active());
        assert_eq!(scene.crossfade(Instant::now()), 0.0);
    }

    #[test]
    fn transition_waits_for_the_delay() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        let mut scene = scene();

        assert!(scene.begin_celebration(&mut scheduler, t0));
        assert!(!scene.begin_celebration(&mut scheduler, t0));
        assert_eq!(scene.state(), SceneState::TransitioningToCelebration);
        assert!(scene.snow().is_active());
        assert!((scene.crossfade(t0 + DELAY / 2) - 0.5).abs() < 1e-3);

        assert!(scheduler.poll(t0 + Duration::from_secs(2)).is_empty());
        assert_eq!(scheduler.poll(t0 + DELAY), vec![Task::SceneTransition]);
        assert!(scene.finish_transition());

        assert_eq!(scene.state(), SceneState::Celebration);
        assert!(!scene.snow().is_active());
        assert!(!scene.fire().is_active());
        assert!(scene.fireworks().is_active());
        assert_eq!(scene.snow().effect().particle_count(), 0);
    }

    #[test]
    fn stray_transition_timer_is_ignored_in_winter() {
        let mut scene = scene();
        assert!(!scene.finish_transition());
        assert_eq!(scene.state(), SceneState::Winter);
    }

    #[test]
    fn reset_clears_fireworks_and_restores_winter() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        let mut scene = scene();
        scene.begin_celebration(&mut scheduler, t0);
        scene.finish_transition();
        for _ in 0..30 {
            scene.frame();
        }
        assert!(scene.fireworks().effect().particle_count() > 0);

        assert!(scene.reset_to_winter(&mut scheduler));

        assert_eq!(scene.state(), SceneState::Winter);
        assert!(!scene.fireworks().is_active());
        assert_eq!(scene.fireworks().effect().particle_count(), 0);
        assert!(scene.fireworks().effect().surface().is_blank());
        assert!(scene.snow().is_active());
        assert_eq!(
            scene.snow().effect().particle_count(),
            SnowConfig::default().flake_count
        );

        // Already winter: nothing to do
        assert!(!scene.reset_to_winter(&mut scheduler));
    }

    #[test]
    fn reset_during_transition_cancels_the_timer() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        let mut scene = scene();
        scene.begin_celebration(&mut scheduler, t0);

        assert!(scene.reset_to_winter(&mut scheduler));
        assert!(scheduler.poll(t0 + DELAY * 2).is_empty());
        assert_eq!(scene.state(), SceneState::Winter);
        assert!(scene.snow().is_active());
    }

    #[test]
    fn resize_reaches_every_surface() {
        let mut scene = scene();
        scene.resize(64, 20);
        for surface in scene.winter_layers().into_iter().chain(scene.celebration_layers()) {
            assert_eq!((surface.width(), surface.height()), (64, 20));
        }
    }
}

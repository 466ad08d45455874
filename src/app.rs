use std::io::Write;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use fastrand::Rng;

use crate::clock::Countdown;
use crate::config::Config;
use crate::display::Display;
use crate::effects::{FireEffect, FireworksEffect, SnowEffect};
use crate::hud::{self, HudState};
use crate::scene::{SceneController, SceneState};
use crate::scheduler::{Scheduler, Task};
use crate::settings::{FormAction, SettingsForm};
use crate::store::{self, TargetStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct App {
    countdown: Countdown,
    scene: SceneController,
    scheduler: Scheduler,
    settings: SettingsForm,
    store: Box<dyn TargetStore>,
}

impl App {
    /// Builds the app for a `width x height` pixel surface and runs the first
    /// countdown tick immediately, so a target already in the past starts
    /// the celebration without waiting for a tick to cross zero.
    pub fn new(
        config: &Config,
        store: Box<dyn TargetStore>,
        target_override: Option<DateTime<Local>>,
        (width, height): (usize, usize),
        wall: DateTime<Local>,
        now: Instant,
    ) -> Self {
        let target = target_override.unwrap_or_else(|| {
            let fallback = config
                .default_target()
                .unwrap_or_else(|| store::next_new_year(wall));
            store::load_target(store.as_ref(), fallback, wall)
        });
        log::info!("Counting down to {}", target.to_rfc3339());

        let mut rng = Rng::new();
        let scene = SceneController::new(
            SnowEffect::new(width, height, config.snow.clone(), rng.fork()),
            FireEffect::new(width, height, config.fire.clone(), rng.fork()),
            FireworksEffect::new(width, height, config.fireworks.clone(), rng.fork()),
            Duration::from_millis(config.scene.transition_delay_ms),
        );

        let mut scheduler = Scheduler::new();
        scheduler.every(
            now,
            Duration::from_millis(config.countdown.tick_ms),
            Task::CountdownTick,
        );

        let mut app = Self {
            countdown: Countdown::new(target, config.countdown.urgent_threshold_ms),
            scene,
            scheduler,
            settings: SettingsForm::default(),
            store,
        };
        app.tick(wall, now);
        app
    }

    #[cfg(test)]
    pub fn scene(&self) -> &SceneController {
        &self.scene
    }

    #[cfg(test)]
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    #[cfg(test)]
    pub fn settings(&self) -> &SettingsForm {
        &self.settings
    }

    pub fn update(&mut self, wall: DateTime<Local>, now: Instant) {
        for task in self.scheduler.poll(now) {
            match task {
                Task::CountdownTick => self.tick(wall, now),
                Task::SceneTransition => {
                    self.scene.finish_transition();
                }
            }
        }
    }

    fn tick(&mut self, wall: DateTime<Local>, now: Instant) {
        let remaining = self.countdown.tick(wall);
        if remaining.reached && self.scene.state() == SceneState::Winter {
            self.scene.begin_celebration(&mut self.scheduler, now);
        }
    }

    pub fn frame(&mut self) {
        self.scene.frame();
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.scene.resize(width, height);
    }

    pub fn set_target(&mut self, target: DateTime<Local>, wall: DateTime<Local>, now: Instant) {
        if let Err(e) = store::save_target(self.store.as_mut(), target) {
            log::warn!("Could not persist target: {}", e);
        }
        self.countdown.set_target(target);
        self.scene.reset_to_winter(&mut self.scheduler);
        self.tick(wall, now);
    }

    pub fn handle_key(&mut self, key: KeyEvent, wall: DateTime<Local>, now: Instant) -> Control {
        if key.kind == KeyEventKind::Release {
            return Control::Continue;
        }

        if self.settings.is_open() {
            match self.settings.handle_key(key) {
                FormAction::Save => match self.settings.target() {
                    Some(target) => {
                        self.settings.close();
                        self.set_target(target, wall, now);
                    }
                    None => log::debug!("Ignoring save with incomplete date/time"),
                },
                FormAction::Close => self.settings.close(),
                FormAction::None => {}
            }
            return Control::Continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Control::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Control::Quit,
            KeyCode::Char('s') => {
                self.settings.open_with(self.countdown.target());
                Control::Continue
            }
            _ => Control::Continue,
        }
    }

    pub fn draw<W: Write>(&self, display: &mut Display, out: &mut W, now: Instant) -> std::io::Result<()> {
        let (cols, rows) = display.cells();
        display.compose(
            &self.scene.winter_layers(),
            &self.scene.celebration_layers(),
            self.scene.crossfade(now),
        );
        let overlay = hud::build(
            cols,
            rows,
            &HudState {
                scene: self.scene.state(),
                remaining: self.countdown.latest(),
                target: self.countdown.target(),
                settings: &self.settings,
            },
        );
        display.render(out, &overlay)
    }
}

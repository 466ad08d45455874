use chrono::{DateTime, Datelike, Local};

use crate::clock::Remaining;
use crate::color::Rgb;
use crate::display::OverlayLine;
use crate::scene::SceneState;
use crate::settings::{Field, SettingsForm};

const TEXT: Rgb = (240, 244, 255);
const DIM: Rgb = (150, 160, 190);
const URGENT: Rgb = (255, 80, 80);
const GOLD: Rgb = (255, 215, 0);
const PANEL: Rgb = (200, 220, 255);

const FIELD_WIDTH: usize = 9;

pub struct HudState<'a> {
    pub scene: SceneState,
    pub remaining: Remaining,
    pub target: DateTime<Local>,
    pub settings: &'a SettingsForm,
}

pub fn build(cols: usize, rows: usize, hud: &HudState<'_>) -> Vec<OverlayLine> {
    let mut lines = Vec::new();
    let mid = rows / 2;

    match hud.scene {
        SceneState::Celebration => {
            lines.push(OverlayLine::centered(mid, cols, "Happy New Year!", GOLD).bold());
            lines.push(OverlayLine::centered(
                mid + 1,
                cols,
                format!("Welcome to {}", hud.target.year()),
                DIM,
            ));
        }
        SceneState::Winter | SceneState::TransitioningToCelebration => {
            lines.push(OverlayLine::centered(
                mid.saturating_sub(2),
                cols,
                format!("Counting down to {}", hud.target.format("%Y-%m-%d %H:%M")),
                DIM,
            ));

            let digits = hud
                .remaining
                .fields()
                .iter()
                .map(|f| format!("{:^w$}", f, w = FIELD_WIDTH))
                .collect::<String>();
            let color = if hud.remaining.urgent { URGENT } else { TEXT };
            lines.push(OverlayLine::centered(mid, cols, digits, color).bold());

            let labels = ["DAYS", "HOURS", "MINUTES", "SECONDS"]
                .iter()
                .map(|l| format!("{:^w$}", l, w = FIELD_WIDTH))
                .collect::<String>();
            lines.push(OverlayLine::centered(mid + 1, cols, labels, DIM));
        }
    }

    if hud.settings.is_open() {
        let marker = |field: Field| if hud.settings.focus() == field { ">" } else { " " };
        let top = mid + 3;
        lines.push(OverlayLine::centered(top, cols, "Settings", PANEL).bold());
        lines.push(OverlayLine::centered(
            top + 1,
            cols,
            format!("{} Date [{:<10}]", marker(Field::Date), hud.settings.date()),
            PANEL,
        ));
        lines.push(OverlayLine::centered(
            top + 2,
            cols,
            format!("{} Time [{:<10}]", marker(Field::Time), hud.settings.time()),
            PANEL,
        ));
        lines.push(OverlayLine::centered(
            top + 3,
            cols,
            "Tab: switch   Enter: save   Esc: close",
            DIM,
        ));
    } else if rows > 0 {
        lines.push(OverlayLine::centered(rows - 1, cols, "s: settings   q: quit", DIM));
    }

    lines.retain(|line| line.row < rows);
    lines
}

//! Configuration parsing and management

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::color::{parse_hex_color, Rgb};
use crate::error::{ConfigError, CountdownError};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub countdown: CountdownConfig,
    pub scene: SceneConfig,
    pub snow: SnowConfig,
    pub fire: FireConfig,
    pub fireworks: FireworksConfig,
    pub display: DisplayConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CountdownError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::ReadFile(format!("{}: {}", path.as_ref().display(), e))
        })?;

        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(s: &str) -> Result<Self, CountdownError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()).into())
    }

    /// Load configuration from the first default path that exists
    pub fn load() -> Result<Self, CountdownError> {
        let mut paths = vec![PathBuf::from("termcountdown.toml")];
        if let Some(home) = std::env::var_os("HOME") {
            paths.push(PathBuf::from(home).join(".config/termcountdown/config.toml"));
        }

        for path in &paths {
            if path.exists() {
                log::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), CountdownError> {
        if let Some(target) = &self.countdown.default_target {
            if DateTime::parse_from_rfc3339(target).is_err() {
                return Err(ConfigError::invalid(
                    "countdown.default_target",
                    "must be an RFC 3339 timestamp",
                )
                .into());
            }
        }
        if self.countdown.tick_ms == 0 {
            return Err(ConfigError::invalid("countdown.tick_ms", "must be greater than 0").into());
        }

        if self.snow.flake_count == 0 {
            return Err(ConfigError::invalid("snow.flake_count", "must be greater than 0").into());
        }
        check_range("snow.speed", self.snow.speed_min, self.snow.speed_max)?;
        check_range("snow.size", self.snow.size_min, self.snow.size_max)?;

        check_range("fire.decay", self.fire.decay_min, self.fire.decay_max)?;
        check_range("fire.size", self.fire.size_min, self.fire.size_max)?;
        check_range("fire.rise", self.fire.rise_min, self.fire.rise_max)?;
        if self.fire.decay_min <= 0.0 {
            return Err(ConfigError::invalid("fire.decay_min", "must be greater than 0").into());
        }
        if !(0.0..=1.0).contains(&self.fire.source_spread) {
            return Err(ConfigError::invalid("fire.source_spread", "must be between 0.0 and 1.0").into());
        }

        if !(0.0..=1.0).contains(&self.fireworks.launch_chance) {
            return Err(ConfigError::invalid(
                "fireworks.launch_chance",
                "must be between 0.0 and 1.0",
            )
            .into());
        }
        if self.fireworks.spark_count == 0 {
            return Err(ConfigError::invalid("fireworks.spark_count", "must be greater than 0").into());
        }
        if !(self.fireworks.drag > 0.0 && self.fireworks.drag < 1.0) {
            return Err(ConfigError::invalid("fireworks.drag", "must be between 0.0 and 1.0 (exclusive)").into());
        }
        if self.fireworks.ascent_speed <= 0.0 {
            return Err(ConfigError::invalid("fireworks.ascent_speed", "must be greater than 0").into());
        }
        if self.fireworks.decay_min <= 0.0 {
            return Err(ConfigError::invalid("fireworks.decay_min", "must be greater than 0").into());
        }
        check_range("fireworks.decay", self.fireworks.decay_min, self.fireworks.decay_max)?;
        check_range(
            "fireworks.spark_speed",
            self.fireworks.spark_speed_min,
            self.fireworks.spark_speed_max,
        )?;
        if !(0.0..=1.0).contains(&self.fireworks.wash_alpha) {
            return Err(ConfigError::invalid("fireworks.wash_alpha", "must be between 0.0 and 1.0").into());
        }
        if parse_hex_color(&self.fireworks.wash_color).is_none() {
            return Err(ConfigError::invalid("fireworks.wash_color", "expected RRGGBB").into());
        }

        if parse_hex_color(&self.display.background).is_none() {
            return Err(ConfigError::invalid("display.background", "expected RRGGBB").into());
        }

        Ok(())
    }

    /// Explicit default target, if one is configured and parses
    pub fn default_target(&self) -> Option<DateTime<Local>> {
        self.countdown
            .default_target
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Local))
    }

    pub fn background(&self) -> Rgb {
        parse_hex_color(&self.display.background).unwrap_or((0, 0, 0))
    }
}

fn check_range(field: &str, min: f32, max: f32) -> Result<(), CountdownError> {
    if min < 0.0 || min > max {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("invalid range {}..{}", min, max),
        }
        .into());
    }
    Ok(())
}

/// Countdown clock configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownConfig {
    /// Fallback target (RFC 3339); the next New Year's midnight when unset
    pub default_target: Option<String>,
    /// Remaining time below which the display is emphasised
    pub urgent_threshold_ms: i64,
    /// Countdown tick period
    pub tick_ms: u64,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            default_target: None,
            urgent_threshold_ms: 60_000,
            tick_ms: 1000,
        }
    }
}

/// Scene transition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Cross-fade duration between Winter and Celebration
    pub transition_delay_ms: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            transition_delay_ms: 3000,
        }
    }
}

/// Snowfall tuning, in surface pixels per frame
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnowConfig {
    pub flake_count: usize,
    pub speed_min: f32,
    pub speed_max: f32,
    /// Horizontal drift is drawn from -drift..drift
    pub drift: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub opacity: f32,
}

impl Default for SnowConfig {
    fn default() -> Self {
        Self {
            flake_count: 80,
            speed_min: 0.08,
            speed_max: 0.25,
            drift: 0.04,
            size_min: 0.4,
            size_max: 1.2,
            opacity: 0.8,
        }
    }
}

/// How flames move sideways as they rise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlameMotion {
    /// Sinusoidal horizontal oscillation driven by remaining life
    #[default]
    Sway,
    /// Continuous upward acceleration, no oscillation
    Updraft,
}

/// Fire tuning, in surface pixels per frame
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FireConfig {
    pub spawn_per_frame: usize,
    /// Width of the fuel source as a fraction of the surface width
    pub source_spread: f32,
    pub motion: FlameMotion,
    pub decay_min: f32,
    pub decay_max: f32,
    pub size_min: f32,
    pub size_max: f32,
    /// Per-frame size multiplier
    pub shrink: f32,
    pub rise_min: f32,
    pub rise_max: f32,
    /// Horizontal velocity is drawn from -lateral/2..lateral/2
    pub lateral: f32,
    pub sway_amplitude: f32,
    pub updraft: f32,
}

impl Default for FireConfig {
    fn default() -> Self {
        Self {
            spawn_per_frame: 5,
            source_spread: 0.15,
            motion: FlameMotion::Sway,
            decay_min: 0.01,
            decay_max: 0.03,
            size_min: 2.0,
            size_max: 5.0,
            shrink: 0.95,
            rise_min: 0.25,
            rise_max: 0.65,
            lateral: 0.3,
            sway_amplitude: 0.15,
            updraft: 0.01,
        }
    }
}

/// Fireworks tuning, in surface pixels per frame
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FireworksConfig {
    /// Probability of launching one rocket per frame
    pub launch_chance: f32,
    pub spark_count: usize,
    pub ascent_speed: f32,
    pub spark_speed_min: f32,
    pub spark_speed_max: f32,
    /// Multiplicative velocity damping per frame
    pub drag: f32,
    pub gravity: f32,
    pub decay_min: f32,
    pub decay_max: f32,
    /// Spark hue is the rocket hue +/- this many degrees
    pub hue_jitter: f32,
    /// Highest rockets burst this fraction of the height below the top edge
    pub top_margin: f32,
    pub wash_color: String,
    pub wash_alpha: f32,
}

impl Default for FireworksConfig {
    fn default() -> Self {
        Self {
            launch_chance: 0.05,
            spark_count: 100,
            ascent_speed: 1.0,
            spark_speed_min: 0.3,
            spark_speed_max: 1.2,
            drag: 0.99,
            gravity: 0.012,
            decay_min: 0.01,
            decay_max: 0.025,
            hue_jitter: 15.0,
            top_margin: 0.05,
            wash_color: "0a1128".to_string(),
            wash_alpha: 0.1,
        }
    }
}

/// Display and persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Background colour behind every scene (RRGGBB)
    pub background: String,
    /// Where the target instant is persisted
    pub store_path: Option<PathBuf>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            background: "0b1026".to_string(),
            store_path: None,
        }
    }
}

impl DisplayConfig {
    pub fn store_path(&self) -> PathBuf {
        if let Some(path) = &self.store_path {
            return path.clone();
        }
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(".local/state/termcountdown/store.json"),
            None => PathBuf::from("termcountdown-store.json"),
        }
    }
}

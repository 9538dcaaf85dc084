//! Gameplay configuration
//!
//! Supplied once when gameplay starts. Every field has a default so partial
//! JSON documents are accepted.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How a spawn timer treats leftover time after it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpawnTiming {
    /// `elapsed -= interval`: long ticks fire several times, cadence never drifts
    #[default]
    Carry,
    /// `elapsed = 0`: at most one spawn per tick, leftover time is dropped
    Reset,
}

impl FromStr for SpawnTiming {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "carry" => Ok(SpawnTiming::Carry),
            "reset" => Ok(SpawnTiming::Reset),
            _ => Err(ConfigError::UnknownSpawnTiming(s.to_string())),
        }
    }
}

/// World-space Z range entities are spawned in (near end first)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthRange {
    pub near: f32,
    pub far: f32,
}

impl DepthRange {
    pub const fn new(near: f32, far: f32) -> Self {
        Self { near, far }
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if !self.near.is_finite() || !self.far.is_finite() || self.near >= self.far {
            return Err(ConfigError::DegenerateDepthRange {
                name,
                near: self.near,
                far: self.far,
            });
        }
        Ok(())
    }
}

/// A balloon variety picked by weight at spawn time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalloonKind {
    pub name: String,
    /// Base rise speed (units/s) before the depth factor
    pub rise_speed: f32,
    /// Base scale before the depth multiplier
    pub size: f32,
    /// Points awarded on pop
    pub score_value: u64,
    /// Relative spawn weight
    pub weight: f32,
}

impl Default for BalloonKind {
    fn default() -> Self {
        Self {
            name: "red".to_string(),
            rise_speed: 1.5,
            size: 1.0,
            score_value: 10,
            weight: 1.0,
        }
    }
}

impl BalloonKind {
    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason| ConfigError::InvalidBalloonKind {
            name: self.name.clone(),
            reason,
        };
        if !(self.weight.is_finite() && self.weight > 0.0) {
            return Err(invalid("weight must be positive"));
        }
        if !(self.rise_speed.is_finite() && self.rise_speed > 0.0) {
            return Err(invalid("rise speed must be positive"));
        }
        if !(self.size.is_finite() && self.size > 0.0) {
            return Err(invalid("size must be positive"));
        }
        Ok(())
    }
}

/// Static gameplay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Session ===
    /// Nominal level length in seconds (drives the progress readout)
    pub level_duration: f32,
    /// Timer policy shared by both spawners
    pub spawn_timing: SpawnTiming,

    // === Balloons ===
    /// Seconds between balloon spawns
    pub spawn_interval: f32,
    pub balloon_depth_range: DepthRange,
    /// Half-width used when no usable camera is available
    pub fallback_half_width: f32,
    /// Distance kept from the visible edge when placing entities
    pub spawn_margin: f32,
    /// Y coordinate balloons start at
    pub spawn_height: f32,
    /// Y coordinate above which an unpopped balloon has escaped
    pub escape_ceiling: f32,
    pub sway_amplitude: f32,
    pub sway_frequency: f32,
    /// Balloons older than this are removed without ending the game
    pub max_balloon_lifetime: f32,
    pub balloon_kinds: Vec<BalloonKind>,

    // === Power-ups ===
    pub powerup_min_interval: f32,
    pub powerup_max_interval: f32,
    pub powerup_depth_range: DepthRange,
    pub powerup_height: f32,
    /// Seconds a power-up stays collectible
    pub powerup_lifetime: f32,
    /// Seconds the score multiplier lasts after pickup
    pub multiplier_duration: f32,
    pub multiplier_factor: u64,
    /// Chance that popping a balloon drops a power-up in its place
    pub powerup_drop_chance: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            level_duration: 60.0,
            spawn_timing: SpawnTiming::Carry,

            spawn_interval: 0.8,
            balloon_depth_range: DepthRange::new(-1.0, 22.0),
            fallback_half_width: 9.0,
            spawn_margin: 0.4,
            spawn_height: -5.0,
            escape_ceiling: 12.0,
            sway_amplitude: 0.3,
            sway_frequency: 1.2,
            max_balloon_lifetime: 60.0,
            balloon_kinds: vec![BalloonKind::default()],

            powerup_min_interval: 12.0,
            powerup_max_interval: 20.0,
            powerup_depth_range: DepthRange::new(5.0, 20.0),
            powerup_height: 0.5,
            powerup_lifetime: 3.0,
            multiplier_duration: 15.0,
            multiplier_factor: 2,
            powerup_drop_chance: 0.0,
        }
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveDuration { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDistance { name, value })
    }
}

impl GameConfig {
    /// Reject configurations that would produce NaN positions or stuck timers
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("level_duration", self.level_duration)?;
        positive("spawn_interval", self.spawn_interval)?;
        positive("powerup_min_interval", self.powerup_min_interval)?;
        positive("powerup_max_interval", self.powerup_max_interval)?;
        if self.powerup_min_interval > self.powerup_max_interval {
            return Err(ConfigError::InvertedInterval {
                min: self.powerup_min_interval,
                max: self.powerup_max_interval,
            });
        }
        positive("powerup_lifetime", self.powerup_lifetime)?;
        positive("multiplier_duration", self.multiplier_duration)?;
        positive("max_balloon_lifetime", self.max_balloon_lifetime)?;

        self.balloon_depth_range.validate("balloon")?;
        self.powerup_depth_range.validate("power-up")?;

        non_negative("spawn_margin", self.spawn_margin)?;
        non_negative("fallback_half_width", self.fallback_half_width)?;
        non_negative("sway_amplitude", self.sway_amplitude)?;
        non_negative("sway_frequency", self.sway_frequency)?;
        for (name, value) in [
            ("spawn_height", self.spawn_height),
            ("escape_ceiling", self.escape_ceiling),
            ("powerup_height", self.powerup_height),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidDistance { name, value });
            }
        }

        if self.multiplier_factor == 0 {
            return Err(ConfigError::ZeroMultiplier);
        }
        if !(0.0..=1.0).contains(&self.powerup_drop_chance) {
            return Err(ConfigError::InvalidDropChance(self.powerup_drop_chance));
        }

        if self.balloon_kinds.is_empty() {
            return Err(ConfigError::NoBalloonKinds);
        }
        for kind in &self.balloon_kinds {
            kind.validate()?;
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded gameplay config from {}", path.display());
        Ok(config)
    }
}

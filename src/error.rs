//! Error types for configuration and high score persistence

use std::path::PathBuf;

/// Invalid or unreadable gameplay configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a positive, finite number of seconds (got {value})")]
    NonPositiveDuration { name: &'static str, value: f32 },
    #[error("power-up interval window is inverted: min {min} > max {max}")]
    InvertedInterval { min: f32, max: f32 },
    #[error("{name} depth range is degenerate: [{near}, {far}]")]
    DegenerateDepthRange {
        name: &'static str,
        near: f32,
        far: f32,
    },
    #[error("{name} must be finite and non-negative (got {value})")]
    InvalidDistance { name: &'static str, value: f32 },
    #[error("multiplier factor must be at least 1")]
    ZeroMultiplier,
    #[error("power-up drop chance must be within [0, 1] (got {0})")]
    InvalidDropChance(f32),
    #[error("unknown spawn timing `{0}` (expected `carry` or `reset`)")]
    UnknownSpawnTiming(String),
    #[error("at least one balloon kind is required")]
    NoBalloonKinds,
    #[error("balloon kind `{name}` is invalid: {reason}")]
    InvalidBalloonKind { name: String, reason: &'static str },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to read or write the persisted high score
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("high score I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("high score document is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

//! Balloon Pop - gameplay core for a 3D balloon popping arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, balloons, power-ups, score, lifecycle)
//! - `settings`: Static gameplay configuration
//! - `highscores`: High score persistence boundary
//! - `error`: Configuration and persistence errors

pub mod error;
pub mod highscores;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, PersistError};
pub use highscores::{BackgroundWriter, HighScoreStore, JsonFileStore, MemoryStore};
pub use settings::{BalloonKind, GameConfig, SpawnTiming};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless runner (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Most balloons one tick may spawn while catching up after a long stall
    pub const MAX_CATCHUP_SPAWNS: u32 = 8;

    /// Closest depth the frustum projection is evaluated at
    pub const MIN_PROJECTION_DEPTH: f32 = 1.0;

    /// Depth cue endpoints: near balloons are larger and faster
    pub const NEAR_SCALE: f32 = 1.35;
    pub const FAR_SCALE: f32 = 0.85;
    pub const NEAR_SPEED: f32 = 1.2;
    pub const FAR_SPEED: f32 = 0.9;

    /// Upper bound for the randomized sway phase offset (seconds)
    pub const MAX_SWAY_PHASE: f32 = 1000.0;
}

/// Linear interpolation between `a` and `b`, `t` clamped to [0, 1]
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Where `value` sits between `a` and `b`, clamped to [0, 1].
/// A degenerate range maps everything to 0.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

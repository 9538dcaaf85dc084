//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, input-device, or platform dependencies

pub mod balloon;
pub mod frustum;
pub mod powerup;
pub mod score;
pub mod spawner;
pub mod state;
pub mod tick;

pub use balloon::{Balloon, BalloonStatus, depth_scale, depth_speed};
pub use frustum::{BackdropFit, CameraView, SpawnEnvelope, spawn_envelope, visible_half_extent};
pub use powerup::{PowerUp, PowerUpStatus};
pub use score::ScoreState;
pub use spawner::{BalloonSpawn, BalloonSpawner, PowerUpSpawner, SpawnTimer, pick_weighted};
pub use state::{EntityKind, EntityView, GameEvent, GamePhase, GameState, Snapshot};
pub use tick::{FixedStep, TickInput, tick};

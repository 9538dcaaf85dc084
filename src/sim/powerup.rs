//! Collectible score multiplier power-ups
//!
//! Only one may be alive at a time. That is enforced where power-ups are
//! created (spawner and pop drops), not by the entity itself.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Outcome of advancing one power-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpStatus {
    Active,
    Expired,
}

/// A time-limited collectible
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub position: Vec3,
    /// Seconds left before it disappears uncollected
    pub remaining: f32,
    /// Multiplier window granted on pickup
    pub multiplier_duration: f32,
}

impl PowerUp {
    pub fn new(id: u32, position: Vec3, lifetime: f32, multiplier_duration: f32) -> Self {
        Self {
            id,
            position,
            remaining: lifetime,
            multiplier_duration,
        }
    }

    /// Count down the lifetime
    pub fn update(&mut self, dt: f32) -> PowerUpStatus {
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            PowerUpStatus::Expired
        } else {
            PowerUpStatus::Active
        }
    }
}

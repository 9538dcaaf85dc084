//! Rising balloon entities
//!
//! Depth is a pseudo-parallax cue: near balloons are drawn larger and rise
//! faster, using a linear blend over the spawn depth range rather than a
//! true perspective projection.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::spawner::BalloonSpawn;
use crate::consts::*;
use crate::lerp;
use crate::settings::{BalloonKind, GameConfig};

/// Outcome of advancing one balloon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalloonStatus {
    Rising,
    /// Crossed the ceiling without being popped
    Escaped,
    /// Outlived the configured lifetime bound
    Expired,
}

/// A poppable balloon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balloon {
    pub id: u32,
    pub position: Vec3,
    /// Units per second, already scaled by depth
    pub rise_speed: f32,
    pub sway_amplitude: f32,
    pub sway_frequency: f32,
    pub phase_offset: f32,
    /// Render scale, already scaled by depth
    pub scale: f32,
    pub score_value: u64,
    /// Index of the configured kind this balloon was drawn from
    pub kind: usize,
    /// Seconds since spawn
    pub age: f32,
    popped: bool,
}

/// Scale multiplier for a normalized depth (0 = near, 1 = far)
#[inline]
pub fn depth_scale(depth_fraction: f32) -> f32 {
    lerp(NEAR_SCALE, FAR_SCALE, depth_fraction)
}

/// Rise speed multiplier for a normalized depth (0 = near, 1 = far)
#[inline]
pub fn depth_speed(depth_fraction: f32) -> f32 {
    lerp(NEAR_SPEED, FAR_SPEED, depth_fraction)
}

impl Balloon {
    /// Build a balloon from a spawn request, applying the depth cue once
    pub fn from_spawn(id: u32, spawn: &BalloonSpawn, kind: &BalloonKind, config: &GameConfig) -> Self {
        Self {
            id,
            position: spawn.position,
            rise_speed: kind.rise_speed * depth_speed(spawn.depth_fraction),
            sway_amplitude: config.sway_amplitude,
            sway_frequency: config.sway_frequency,
            phase_offset: spawn.phase_offset,
            scale: kind.size * depth_scale(spawn.depth_fraction),
            score_value: kind.score_value,
            kind: spawn.kind,
            age: 0.0,
            popped: false,
        }
    }

    pub fn is_popped(&self) -> bool {
        self.popped
    }

    /// Rise, sway, and check the ceiling.
    ///
    /// `time` is the session clock, shared by all balloons so the phase
    /// offset alone decides how they desynchronize.
    pub fn update(&mut self, dt: f32, time: f32, ceiling: f32, max_lifetime: f32) -> BalloonStatus {
        self.age += dt;
        self.position.y += self.rise_speed * dt;
        let sway = ((time + self.phase_offset) * self.sway_frequency).sin() * self.sway_amplitude * dt;
        self.position.x += sway;

        if self.position.y > ceiling && !self.popped {
            BalloonStatus::Escaped
        } else if self.age > max_lifetime {
            BalloonStatus::Expired
        } else {
            BalloonStatus::Rising
        }
    }

    /// Mark as popped. Returns the points earned, or `None` if it was
    /// already popped.
    pub fn pop(&mut self) -> Option<u64> {
        if self.popped {
            return None;
        }
        self.popped = true;
        Some(self.score_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn spawn_at(depth_fraction: f32) -> BalloonSpawn {
        BalloonSpawn {
            position: Vec3::new(0.0, -5.0, 0.0),
            depth_fraction,
            kind: 0,
            phase_offset: 0.0,
        }
    }

    fn balloon_at(depth_fraction: f32) -> Balloon {
        Balloon::from_spawn(1, &spawn_at(depth_fraction), &BalloonKind::default(), &GameConfig::default())
    }

    #[test]
    fn test_depth_cue_endpoints() {
        let near = balloon_at(0.0);
        let far = balloon_at(1.0);
        assert!((near.scale - 1.35).abs() < 1e-6);
        assert!((far.scale - 0.85).abs() < 1e-6);
        assert!((near.rise_speed - 1.5 * 1.2).abs() < 1e-6);
        assert!((far.rise_speed - 1.5 * 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_rises_and_escapes() {
        let mut balloon = balloon_at(0.5);
        balloon.sway_amplitude = 0.0;
        let start_y = balloon.position.y;
        assert_eq!(balloon.update(1.0, 0.0, 12.0, 60.0), BalloonStatus::Rising);
        assert!((balloon.position.y - (start_y + balloon.rise_speed)).abs() < 1e-5);

        let mut status = BalloonStatus::Rising;
        for i in 0..100 {
            status = balloon.update(1.0, i as f32, 12.0, 600.0);
            if status != BalloonStatus::Rising {
                break;
            }
        }
        assert_eq!(status, BalloonStatus::Escaped);
        assert!(balloon.position.y > 12.0);
    }

    #[test]
    fn test_sway_follows_phase() {
        let mut a = balloon_at(0.5);
        let mut b = balloon_at(0.5);
        b.phase_offset = 1.3;
        a.update(0.1, 2.0, 12.0, 60.0);
        b.update(0.1, 2.0, 12.0, 60.0);
        assert!((a.position.x - (2.0f32 * 1.2).sin() * 0.3 * 0.1).abs() < 1e-6);
        assert!((a.position.x - b.position.x).abs() > 1e-4);
    }

    #[test]
    fn test_pop_is_idempotent() {
        let mut balloon = balloon_at(0.0);
        assert_eq!(balloon.pop(), Some(10));
        assert_eq!(balloon.pop(), None);
        assert!(balloon.is_popped());
    }

    #[test]
    fn test_popped_balloon_never_escapes() {
        let mut balloon = balloon_at(0.0);
        balloon.position.y = 11.99;
        balloon.pop();
        assert_eq!(balloon.update(1.0, 0.0, 12.0, 60.0), BalloonStatus::Rising);
    }

    #[test]
    fn test_lifetime_bound() {
        let mut balloon = balloon_at(0.0);
        balloon.rise_speed = 0.0;
        assert_eq!(balloon.update(5.0, 0.0, 12.0, 10.0), BalloonStatus::Rising);
        assert_eq!(balloon.update(6.0, 5.0, 12.0, 10.0), BalloonStatus::Expired);
    }

    proptest! {
        #[test]
        fn prop_nearer_is_larger_and_faster(a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            let near = balloon_at(near);
            let far = balloon_at(far);
            prop_assert!(near.scale >= far.scale);
            prop_assert!(near.rise_speed >= far.rise_speed);
        }
    }
}

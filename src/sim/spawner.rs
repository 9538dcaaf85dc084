//! Timed spawn scheduling
//!
//! A [`SpawnTimer`] accumulates tick time and fires once per interval.
//! [`BalloonSpawner`] fires on a fixed cadence; [`PowerUpSpawner`] re-rolls its
//! interval after every spawn and holds while a power-up is alive.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use super::frustum::{CameraView, spawn_envelope};
use crate::consts::MAX_CATCHUP_SPAWNS;
use crate::error::ConfigError;
use crate::inverse_lerp;
use crate::settings::{BalloonKind, DepthRange, GameConfig, SpawnTiming};

/// Interval accumulator with a running flag
///
/// Elapsed time is kept in `f64` so long sessions and long ticks keep an
/// exact cadence.
#[derive(Debug, Clone)]
pub struct SpawnTimer {
    interval: f32,
    elapsed: f64,
    running: bool,
    timing: SpawnTiming,
}

impl SpawnTimer {
    /// A stopped timer; fails on a non-positive interval
    pub fn new(interval: f32, timing: SpawnTiming) -> Result<Self, ConfigError> {
        if !(interval.is_finite() && interval > 0.0) {
            return Err(ConfigError::NonPositiveDuration {
                name: "spawn interval",
                value: interval,
            });
        }
        Ok(Self {
            interval,
            elapsed: 0.0,
            running: false,
            timing,
        })
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start from a clean accumulator
    pub fn start(&mut self) {
        self.elapsed = 0.0;
        self.running = true;
    }

    /// Stop firing; the accumulator is kept for inspection
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Replace the interval used for the next firing. Non-positive values are ignored.
    pub fn set_interval(&mut self, interval: f32) {
        if interval.is_finite() && interval > 0.0 {
            self.interval = interval;
        }
    }

    /// Advance by `dt` and return how many spawns are due.
    ///
    /// With [`SpawnTiming::Carry`] a long tick may fire several times, up to
    /// [`MAX_CATCHUP_SPAWNS`]; intervals beyond the cap are consumed without
    /// firing. With [`SpawnTiming::Reset`] it fires at most once.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !self.running {
            return 0;
        }
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += f64::from(dt);
        }
        let interval = f64::from(self.interval);
        if self.elapsed < interval {
            return 0;
        }
        match self.timing {
            SpawnTiming::Carry => {
                let due = (self.elapsed / interval).floor();
                self.elapsed = (self.elapsed - due * interval).max(0.0);
                let fired = due.min(f64::from(MAX_CATCHUP_SPAWNS)) as u32;
                if due > f64::from(fired) {
                    log::warn!(
                        "Spawn timer fell {} intervals behind, dropping all but {}",
                        due,
                        fired
                    );
                }
                fired
            }
            SpawnTiming::Reset => {
                self.elapsed = 0.0;
                1
            }
        }
    }
}

/// A balloon the spawner wants created
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalloonSpawn {
    pub position: Vec3,
    /// 0 at the near end of the depth range, 1 at the far end
    pub depth_fraction: f32,
    /// Index into the configured balloon kinds
    pub kind: usize,
    /// Randomized sway phase so balloons drift out of sync
    pub phase_offset: f32,
}

/// Pick a kind index proportionally to the kinds' weights
pub fn pick_weighted(kinds: &[BalloonKind], rng: &mut Pcg32) -> usize {
    if kinds.len() <= 1 {
        return 0;
    }
    let total: f32 = kinds.iter().map(|k| k.weight).sum();
    let mut roll = rng.random::<f32>() * total;
    for (i, kind) in kinds.iter().enumerate() {
        roll -= kind.weight;
        if roll <= 0.0 {
            return i;
        }
    }
    kinds.len() - 1
}

/// Warns once per run of spawns without a usable camera
#[derive(Debug, Clone, Default)]
struct FallbackNotice {
    active: bool,
}

impl FallbackNotice {
    fn observe(&mut self, fallback: bool, what: &str) {
        if fallback && !self.active {
            log::warn!("No usable camera for {} spawn, using fallback envelope", what);
        }
        self.active = fallback;
    }
}

/// Fixed-cadence balloon spawner with frustum-fitted placement
#[derive(Debug, Clone)]
pub struct BalloonSpawner {
    timer: SpawnTimer,
    depth_range: DepthRange,
    margin: f32,
    fallback_half_width: f32,
    spawn_height: f32,
    kinds: Vec<BalloonKind>,
    notice: FallbackNotice,
}

impl BalloonSpawner {
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            timer: SpawnTimer::new(config.spawn_interval, config.spawn_timing)?,
            depth_range: config.balloon_depth_range,
            margin: config.spawn_margin,
            fallback_half_width: config.fallback_half_width,
            spawn_height: config.spawn_height,
            kinds: config.balloon_kinds.clone(),
            notice: FallbackNotice::default(),
        })
    }

    pub fn timer(&self) -> &SpawnTimer {
        &self.timer
    }

    pub fn start(&mut self) {
        self.timer.start();
        log::debug!("Balloon spawning started");
    }

    pub fn stop(&mut self) {
        if self.timer.is_running() {
            log::debug!("Balloon spawning stopped");
        }
        self.timer.stop();
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Advance the cadence and emit every spawn that came due
    pub fn tick(&mut self, dt: f32, camera: Option<&CameraView>, rng: &mut Pcg32) -> Vec<BalloonSpawn> {
        let due = self.timer.advance(dt);
        (0..due).map(|_| self.place(camera, rng)).collect()
    }

    /// Sample depth first, then X inside the frustum slice at that depth
    pub fn place(&mut self, camera: Option<&CameraView>, rng: &mut Pcg32) -> BalloonSpawn {
        let range = self.depth_range;
        let z = rng.random_range(range.near..=range.far);
        let envelope = spawn_envelope(camera, z, self.fallback_half_width);
        self.notice.observe(envelope.fallback, "balloon");

        let (lo, hi) = envelope.x_bounds(self.margin);
        let x = rng.random_range(lo..=hi);
        BalloonSpawn {
            position: Vec3::new(x, self.spawn_height, z),
            depth_fraction: inverse_lerp(range.near, range.far, z),
            kind: pick_weighted(&self.kinds, rng),
            phase_offset: rng.random_range(0.0..crate::consts::MAX_SWAY_PHASE),
        }
    }
}

/// Randomized-interval power-up spawner
#[derive(Debug, Clone)]
pub struct PowerUpSpawner {
    timer: SpawnTimer,
    min_interval: f32,
    max_interval: f32,
    depth_range: DepthRange,
    margin: f32,
    fallback_half_width: f32,
    height: f32,
    notice: FallbackNotice,
}

impl PowerUpSpawner {
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        if config.powerup_min_interval > config.powerup_max_interval {
            return Err(ConfigError::InvertedInterval {
                min: config.powerup_min_interval,
                max: config.powerup_max_interval,
            });
        }
        Ok(Self {
            timer: SpawnTimer::new(config.powerup_min_interval, config.spawn_timing)?,
            min_interval: config.powerup_min_interval,
            max_interval: config.powerup_max_interval,
            depth_range: config.powerup_depth_range,
            margin: config.spawn_margin,
            fallback_half_width: config.fallback_half_width,
            height: config.powerup_height,
            notice: FallbackNotice::default(),
        })
    }

    pub fn timer(&self) -> &SpawnTimer {
        &self.timer
    }

    /// Start with a freshly rolled interval
    pub fn start(&mut self, rng: &mut Pcg32) {
        self.timer.start();
        self.reroll(rng);
        log::debug!("Power-up spawning started, first in {:.1}s", self.timer.interval());
    }

    pub fn stop(&mut self) {
        self.timer.stop();
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    fn reroll(&mut self, rng: &mut Pcg32) {
        let next = rng.random_range(self.min_interval..=self.max_interval);
        self.timer.set_interval(next);
    }

    /// Advance toward the next attempt.
    ///
    /// While `alive` is true the timer holds still and nothing spawns; the
    /// attempt is retried on the next tick.
    pub fn tick(
        &mut self,
        dt: f32,
        alive: bool,
        camera: Option<&CameraView>,
        rng: &mut Pcg32,
    ) -> Option<Vec3> {
        if !self.timer.is_running() || alive {
            return None;
        }
        // At most one power-up per tick; surplus intervals are consumed
        if self.timer.advance(dt) == 0 {
            return None;
        }
        let position = self.place(camera, rng);
        self.reroll(rng);
        Some(position)
    }

    fn place(&mut self, camera: Option<&CameraView>, rng: &mut Pcg32) -> Vec3 {
        let range = self.depth_range;
        let z = rng.random_range(range.near..=range.far);
        let envelope = spawn_envelope(camera, z, self.fallback_half_width);
        self.notice.observe(envelope.fallback, "power-up");
        let (lo, hi) = envelope.x_bounds(self.margin);
        Vec3::new(rng.random_range(lo..=hi), self.height, z)
    }
}

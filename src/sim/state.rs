//! Game lifecycle and session state
//!
//! `GameState` is the single owner of everything that changes during play:
//! score, spawners, live entities, and the seeded RNG. It is constructed
//! explicitly and passed by reference; there is no global instance.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::balloon::{Balloon, BalloonStatus};
use super::frustum::CameraView;
use super::powerup::{PowerUp, PowerUpStatus};
use super::score::ScoreState;
use super::spawner::{BalloonSpawner, PowerUpSpawner};
use crate::error::ConfigError;
use crate::highscores::HighScoreStore;
use crate::settings::GameConfig;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GamePhase {
    /// Title screen, nothing spawns
    #[default]
    Menu,
    /// Active gameplay
    Playing,
    /// A balloon escaped; frozen until restart or return to menu
    GameOver,
}

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    BalloonSpawned { id: u32 },
    BalloonPopped { id: u32, points: u64 },
    BalloonEscaped { id: u32 },
    /// Removed by the lifetime bound, no score or game over effect
    BalloonExpired { id: u32 },
    PowerUpSpawned { id: u32 },
    PowerUpCollected { id: u32, duration: f32 },
    PowerUpExpired { id: u32 },
    MultiplierEnded,
    NewHighScore { score: u64 },
    GameOver { score: u64, high_score: u64 },
}

/// Kind of a live entity in a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Balloon,
    PowerUp,
}

/// Read-only view of one live entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: u32,
    pub kind: EntityKind,
    pub position: Vec3,
    pub scale: f32,
}

/// Consistent post-tick view for rendering and HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub high_score: u64,
    pub multiplier_active: bool,
    pub multiplier_remaining: f32,
    /// Seconds of play since the last start or restart
    pub clock: f32,
    /// `clock / level_duration`, capped at 1
    pub level_progress: f32,
    pub entities: Vec<EntityView>,
}

/// Complete session state
#[derive(Debug)]
pub struct GameState {
    config: GameConfig,
    phase: GamePhase,
    score: ScoreState,
    balloon_spawner: BalloonSpawner,
    powerup_spawner: PowerUpSpawner,
    /// Live balloons (sorted by id)
    balloons: Vec<Balloon>,
    /// Live power-ups; never more than one
    powerups: Vec<PowerUp>,
    camera: Option<CameraView>,
    rng: Pcg32,
    /// Session clock in seconds
    clock: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Validate the configuration, load the high score, and wait in the menu
    pub fn new(
        config: GameConfig,
        store: Box<dyn HighScoreStore>,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let balloon_spawner = BalloonSpawner::new(&config)?;
        let powerup_spawner = PowerUpSpawner::new(&config)?;
        let score = ScoreState::new(store, config.multiplier_factor);
        Ok(Self {
            config,
            phase: GamePhase::Menu,
            score,
            balloon_spawner,
            powerup_spawner,
            balloons: Vec::new(),
            powerups: Vec::new(),
            camera: Some(CameraView::default()),
            rng: Pcg32::seed_from_u64(seed),
            clock: 0.0,
            time_ticks: 0,
            events: Vec::new(),
            next_id: 1,
        })
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    pub fn balloons(&self) -> &[Balloon] {
        &self.balloons
    }

    pub fn powerups(&self) -> &[PowerUp] {
        &self.powerups
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn camera(&self) -> Option<&CameraView> {
        self.camera.as_ref()
    }

    /// Update the camera used for spawn placement; `None` forces the fallback envelope
    pub fn set_camera(&mut self, camera: Option<CameraView>) {
        self.camera = camera;
    }

    pub fn spawners_running(&self) -> (bool, bool) {
        (
            self.balloon_spawner.is_running(),
            self.powerup_spawner.is_running(),
        )
    }

    /// Whether any power-up is currently alive
    pub fn powerup_alive(&self) -> bool {
        !self.powerups.is_empty()
    }

    /// Allocate a new entity ID. IDs wrap rather than overflow; by then every
    /// early entity is long gone.
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Take everything that happened since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        self.phase = to;
        log::info!("Phase {:?} -> {:?}", from, to);
        self.events.push(GameEvent::PhaseChanged { from, to });
    }

    /// Fresh session: zero score, no entities, spawners running
    fn begin_session(&mut self) {
        self.score.reset();
        self.balloons.clear();
        self.powerups.clear();
        self.clock = 0.0;
        self.balloon_spawner.start();
        self.powerup_spawner.start(&mut self.rng);
        self.set_phase(GamePhase::Playing);
    }

    /// Menu -> Playing. Ignored in any other phase.
    pub fn start_gameplay(&mut self) -> bool {
        if self.phase != GamePhase::Menu {
            return false;
        }
        self.begin_session();
        true
    }

    /// GameOver -> Playing without rebuilding anything else. Ignored in any other phase.
    pub fn restart(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        self.begin_session();
        true
    }

    /// GameOver -> Menu, clearing the board. Spawners stay stopped.
    pub fn return_to_menu(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        self.score.reset();
        self.balloons.clear();
        self.powerups.clear();
        self.clock = 0.0;
        self.set_phase(GamePhase::Menu);
        true
    }

    /// Playing -> GameOver. Repeated calls are no-ops.
    pub fn end_game(&mut self) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        self.balloon_spawner.stop();
        self.powerup_spawner.stop();
        self.score.finalize();
        self.set_phase(GamePhase::GameOver);
        self.events.push(GameEvent::GameOver {
            score: self.score.score(),
            high_score: self.score.high_score(),
        });
        log::info!(
            "Game over: score {} (best {})",
            self.score.score(),
            self.score.high_score()
        );
        true
    }

    /// Add points during play. Ignored outside `Playing`.
    pub fn add_score(&mut self, base: u64) -> u64 {
        if self.phase != GamePhase::Playing {
            return 0;
        }
        let (points, new_high) = self.score.add(base);
        if new_high {
            self.events.push(GameEvent::NewHighScore {
                score: self.score.high_score(),
            });
        }
        points
    }

    /// Open the multiplier window. Ignored outside `Playing`.
    pub fn activate_multiplier(&mut self, duration: f32) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.score.activate_multiplier(duration);
        log::info!("Score multiplier active for {:.1}s", duration);
    }

    /// Pop a balloon by id. Returns false for unknown, already popped, or
    /// when input is disabled.
    pub fn pop(&mut self, id: u32) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        let Some(index) = self.balloons.iter().position(|b| b.id == id) else {
            return false;
        };
        let Some(value) = self.balloons[index].pop() else {
            return false;
        };
        let balloon = self.balloons.remove(index);
        let points = self.add_score(value);
        log::debug!("Balloon {} popped for {} points", id, points);
        self.events.push(GameEvent::BalloonPopped { id, points });
        self.maybe_drop_powerup(balloon.position);
        true
    }

    /// Collect a power-up by id. Returns false for unknown ids or when
    /// input is disabled.
    pub fn collect(&mut self, id: u32) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        let Some(index) = self.powerups.iter().position(|p| p.id == id) else {
            return false;
        };
        let powerup = self.powerups.remove(index);
        self.activate_multiplier(powerup.multiplier_duration);
        self.events.push(GameEvent::PowerUpCollected {
            id,
            duration: powerup.multiplier_duration,
        });
        true
    }

    fn maybe_drop_powerup(&mut self, position: Vec3) {
        let chance = self.config.powerup_drop_chance;
        if chance <= 0.0 || self.powerup_alive() {
            return;
        }
        if self.rng.random_bool(f64::from(chance)) {
            self.spawn_powerup(position);
        }
    }

    /// Create a power-up unless one is already alive
    fn spawn_powerup(&mut self, position: Vec3) -> Option<u32> {
        if self.powerup_alive() {
            return None;
        }
        let id = self.next_entity_id();
        self.powerups.push(PowerUp::new(
            id,
            position,
            self.config.powerup_lifetime,
            self.config.multiplier_duration,
        ));
        log::debug!("Power-up {} spawned at {:?}", id, position);
        self.events.push(GameEvent::PowerUpSpawned { id });
        Some(id)
    }

    /// Advance the simulation by `dt`. Frozen outside `Playing`.
    pub fn advance(&mut self, dt: f32) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.time_ticks += 1;
        self.clock += dt;

        if self.score.tick(dt) {
            log::info!("Score multiplier ended");
            self.events.push(GameEvent::MultiplierEnded);
        }

        self.update_balloons(dt);
        if self.phase != GamePhase::Playing {
            return;
        }
        self.update_powerups(dt);
        self.run_spawners(dt);
    }

    fn update_balloons(&mut self, dt: f32) {
        let time = self.clock;
        let ceiling = self.config.escape_ceiling;
        let max_lifetime = self.config.max_balloon_lifetime;
        let mut escaped = false;
        let events = &mut self.events;

        self.balloons.retain_mut(|balloon| {
            match balloon.update(dt, time, ceiling, max_lifetime) {
                BalloonStatus::Rising => true,
                BalloonStatus::Escaped => {
                    log::debug!("Balloon {} escaped", balloon.id);
                    events.push(GameEvent::BalloonEscaped { id: balloon.id });
                    escaped = true;
                    false
                }
                BalloonStatus::Expired => {
                    log::debug!("Balloon {} exceeded its lifetime", balloon.id);
                    events.push(GameEvent::BalloonExpired { id: balloon.id });
                    false
                }
            }
        });

        if escaped {
            self.end_game();
        }
    }

    fn update_powerups(&mut self, dt: f32) {
        let events = &mut self.events;
        self.powerups.retain_mut(|powerup| match powerup.update(dt) {
            PowerUpStatus::Active => true,
            PowerUpStatus::Expired => {
                log::debug!("Power-up {} expired", powerup.id);
                events.push(GameEvent::PowerUpExpired { id: powerup.id });
                false
            }
        });
    }

    fn run_spawners(&mut self, dt: f32) {
        let camera = self.camera;
        let spawns = self.balloon_spawner.tick(dt, camera.as_ref(), &mut self.rng);
        for spawn in spawns {
            let id = self.next_entity_id();
            let kind = &self.config.balloon_kinds[spawn.kind];
            let balloon = Balloon::from_spawn(id, &spawn, kind, &self.config);
            log::debug!(
                "Balloon {} ({}) spawned at {:?}, scale {:.2}",
                id,
                kind.name,
                balloon.position,
                balloon.scale
            );
            self.balloons.push(balloon);
            self.events.push(GameEvent::BalloonSpawned { id });
        }

        let alive = self.powerup_alive();
        if let Some(position) =
            self.powerup_spawner
                .tick(dt, alive, camera.as_ref(), &mut self.rng)
        {
            self.spawn_powerup(position);
        }
    }

    /// Immutable view of the post-tick state
    pub fn snapshot(&self) -> Snapshot {
        let balloons = self.balloons.iter().map(|b| EntityView {
            id: b.id,
            kind: EntityKind::Balloon,
            position: b.position,
            scale: b.scale,
        });
        let powerups = self.powerups.iter().map(|p| EntityView {
            id: p.id,
            kind: EntityKind::PowerUp,
            position: p.position,
            scale: 1.0,
        });
        Snapshot {
            phase: self.phase,
            score: self.score.score(),
            high_score: self.score.high_score(),
            multiplier_active: self.score.multiplier_active(),
            multiplier_remaining: self.score.multiplier_remaining(),
            clock: self.clock,
            level_progress: (self.clock / self.config.level_duration).min(1.0),
            entities: balloons.chain(powerups).collect(),
        }
    }

    /// Place a balloon directly (scripted scenarios and tests)
    pub fn insert_balloon(&mut self, mut balloon: Balloon) -> u32 {
        let id = self.next_entity_id();
        balloon.id = id;
        self.balloons.push(balloon);
        self.events.push(GameEvent::BalloonSpawned { id });
        id
    }

    /// Place a power-up directly, honouring the single-instance rule
    pub fn insert_powerup(&mut self, position: Vec3) -> Option<u32> {
        self.spawn_powerup(position)
    }
}

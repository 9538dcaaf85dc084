//! Balloon Pop headless runner
//!
//! Plays a seeded session with a simple autoplayer and prints the final
//! snapshot as JSON. Rendering and input live in the host application.

use std::path::PathBuf;

use balloon_pop::consts::SIM_DT;
use balloon_pop::sim::{FixedStep, GameEvent, GamePhase, GameState, TickInput, tick};
use balloon_pop::{GameConfig, HighScoreStore, JsonFileStore, MemoryStore, SpawnTiming};
use clap::Parser;

/// Autoplayer reaction time in simulation ticks
const POP_EVERY_TICKS: u64 = 30;

/// Play a seeded Balloon Pop session headlessly and print the final snapshot
#[derive(Debug, Parser)]
#[command(name = "balloon-pop", version, about)]
struct Cli {
    /// Seed for the simulation RNG
    #[arg(long, default_value_t = 12345)]
    seed: u64,
    /// Seconds of simulated play before stopping
    #[arg(long, default_value_t = 60.0)]
    seconds: f32,
    /// JSON file holding the high score; kept in memory when omitted
    #[arg(long, value_name = "PATH")]
    high_score: Option<PathBuf>,
    /// JSON gameplay configuration; defaults when omitted
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Spawn timing policy, `carry` or `reset`; overrides the configuration
    #[arg(long)]
    timing: Option<SpawnTiming>,
}

/// Pops the highest balloon every so often and grabs any power-up
fn autoplay(state: &GameState, input: &mut TickInput) {
    if state.time_ticks % POP_EVERY_TICKS == 0 {
        if let Some(balloon) = state
            .balloons()
            .iter()
            .max_by(|a, b| a.position.y.total_cmp(&b.position.y))
        {
            input.pops.push(balloon.id);
        }
    }
    input.collects.extend(state.powerups().iter().map(|p| p.id));
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Balloon Pop (headless) starting...");

    let cli = Cli::parse();
    let mut config = match cli.config.as_deref() {
        Some(path) => match GameConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => GameConfig::default(),
    };
    if let Some(timing) = cli.timing {
        config.spawn_timing = timing;
    }
    let store: Box<dyn HighScoreStore> = match cli.high_score {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(MemoryStore::new()),
    };

    let mut state = match GameState::new(config, store, cli.seed) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let mut input = TickInput {
        start: true,
        ..Default::default()
    };
    let mut step = FixedStep::new();
    let mut elapsed = 0.0;
    let mut popped = 0u32;
    let mut frame = 0u32;

    while elapsed < cli.seconds && state.phase() != GamePhase::GameOver {
        // Uneven frame pacing, as a real display loop would produce
        let frame_dt = if frame % 2 == 0 { 0.012 } else { 0.022 };
        frame += 1;
        for _ in 0..step.steps(frame_dt) {
            if state.phase() == GamePhase::Playing {
                autoplay(&state, &mut input);
            }
            tick(&mut state, &input, SIM_DT);
            input.clear();
            elapsed += SIM_DT;

            for event in state.drain_events() {
                match event {
                    GameEvent::BalloonPopped { .. } => popped += 1,
                    GameEvent::NewHighScore { .. } | GameEvent::BalloonSpawned { .. } => {}
                    other => log::debug!("{:?}", other),
                }
            }
        }
    }

    let snapshot = state.snapshot();
    log::info!(
        "Session finished after {:.1}s: {} balloons popped, score {}, best {}",
        elapsed,
        popped,
        snapshot.score,
        snapshot.high_score
    );
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize snapshot: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host drives the simulation through the library
}

use balloon_pop::consts::SIM_DT;
use balloon_pop::sim::{CameraView, EntityKind, GameEvent, GamePhase, GameState, TickInput, tick};
use balloon_pop::{GameConfig, HighScoreStore, JsonFileStore, MemoryStore, PersistError, SpawnTiming};
use glam::Vec3;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A store whose every write takes a while, like a network drive
#[derive(Debug, Default)]
struct SlowStore {
    saved: Arc<Mutex<Option<u64>>>,
}

impl HighScoreStore for SlowStore {
    fn load(&self) -> Result<u64, PersistError> {
        Ok(0)
    }

    fn save(&mut self, high_score: u64) -> Result<(), PersistError> {
        std::thread::sleep(Duration::from_millis(300));
        *self.saved.lock().unwrap() = Some(high_score);
        Ok(())
    }
}

fn state_with(config: GameConfig, high_score: u64) -> GameState {
    GameState::new(config, Box::new(MemoryStore::with_value(high_score)), 2025).unwrap()
}

fn balloon_count(state: &GameState) -> usize {
    state
        .snapshot()
        .entities
        .iter()
        .filter(|e| e.kind == EntityKind::Balloon)
        .count()
}

#[test]
fn interval_spawns_are_drift_free_by_default() {
    let config = GameConfig {
        spawn_interval: 0.8,
        ..Default::default()
    };
    let mut state = state_with(config, 0);
    state.start_gameplay();

    state.advance(0.8);
    assert_eq!(balloon_count(&state), 1);

    state.advance(1.6);
    assert_eq!(balloon_count(&state), 3);
}

#[test]
fn reset_timing_spawns_once_per_long_tick() {
    let config = GameConfig {
        spawn_interval: 0.8,
        spawn_timing: SpawnTiming::Reset,
        ..Default::default()
    };
    let mut state = state_with(config, 0);
    state.start_gameplay();

    state.advance(1.6);
    assert_eq!(balloon_count(&state), 1);
}

#[test]
fn restart_after_game_over() {
    let mut state = state_with(GameConfig::default(), 500);
    state.start_gameplay();
    state.add_score(340);
    state.advance(2.0);
    assert!(balloon_count(&state) > 0);
    assert!(state.end_game());

    let snap = state.snapshot();
    assert_eq!((snap.phase, snap.score, snap.high_score), (GamePhase::GameOver, 340, 500));

    let input = TickInput {
        restart: true,
        ..Default::default()
    };
    tick(&mut state, &input, 0.0);

    let snap = state.snapshot();
    assert_eq!(snap.phase, GamePhase::Playing);
    assert_eq!(snap.score, 0);
    assert_eq!(snap.high_score, 500);
    assert!(snap.entities.is_empty());
    assert_eq!(state.spawners_running(), (true, true));
}

#[test]
fn multiplier_window_doubles_then_lapses() {
    let mut state = state_with(GameConfig::default(), 0);
    state.start_gameplay();

    state.activate_multiplier(2.0);
    assert_eq!(state.add_score(10), 20);

    state.advance(2.0);
    assert!(!state.snapshot().multiplier_active);
    assert_eq!(state.add_score(10), 10);
    assert_eq!(state.snapshot().score, 30);
}

#[test]
fn escaped_balloon_ends_session_once() {
    let config = GameConfig {
        escape_ceiling: -4.0,
        ..Default::default()
    };
    let mut state = state_with(config, 0);
    state.start_gameplay();

    let mut ticks = 0;
    while state.phase() == GamePhase::Playing && ticks < 10_000 {
        tick(&mut state, &TickInput::default(), SIM_DT);
        ticks += 1;
    }
    assert_eq!(state.phase(), GamePhase::GameOver);

    for _ in 0..120 {
        tick(&mut state, &TickInput::default(), SIM_DT);
    }
    let game_overs = state
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, GameEvent::GameOver { .. }))
        .count();
    assert_eq!(game_overs, 1);
}

#[test]
fn balloons_stay_inside_moving_camera_view() {
    let config = GameConfig {
        escape_ceiling: 100.0,
        ..Default::default()
    };
    let mut state = state_with(config, 0);
    state.start_gameplay();

    let camera = CameraView::new(Vec3::new(3.0, 1.5, -12.0), Vec3::Z, 50.0, 4.0 / 3.0);
    let input = TickInput {
        camera: Some(camera),
        ..Default::default()
    };
    tick(&mut state, &input, 0.0);

    for _ in 0..50 {
        state.advance(0.8);
    }
    let margin = state.config().spawn_margin;
    for balloon in state.balloons() {
        let (half_width, _) = camera.visible_half_extent(camera.depth_to_plane(balloon.position.z));
        // Sway may nudge a balloon by at most amplitude * elapsed time
        let drift = state.config().sway_amplitude * balloon.age;
        assert!((balloon.position.x - camera.position.x).abs() <= half_width - margin + drift + 1e-3);
    }
}

#[test]
fn high_score_survives_sessions_on_disk() {
    let path = std::env::temp_dir().join(format!("balloon_pop_session_{}.json", std::process::id()));
    let _ = std::fs::remove_file(&path);

    {
        let mut state =
            GameState::new(GameConfig::default(), Box::new(JsonFileStore::new(&path)), 1).unwrap();
        state.start_gameplay();
        state.add_score(70);
        state.end_game();
    }

    assert_eq!(JsonFileStore::new(&path).load().unwrap(), 70);
    let state = GameState::new(GameConfig::default(), Box::new(JsonFileStore::new(&path)), 1).unwrap();
    assert_eq!(state.snapshot().high_score, 70);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn slow_high_score_store_never_stalls_scoring() {
    let store = SlowStore::default();
    let saved = store.saved.clone();
    let mut state = GameState::new(GameConfig::default(), Box::new(store), 5).unwrap();
    state.start_gameplay();

    let started = Instant::now();
    for _ in 0..5 {
        state.add_score(10);
        tick(&mut state, &TickInput::default(), SIM_DT);
    }
    assert!(started.elapsed() < Duration::from_millis(150));

    // The final value still lands once the session is torn down
    drop(state);
    assert_eq!(*saved.lock().unwrap(), Some(50));
}

#[test]
fn huge_time_step_spawns_a_bounded_batch() {
    let config = GameConfig {
        escape_ceiling: 1.0e12,
        max_balloon_lifetime: 1.0e12,
        ..Default::default()
    };
    let mut state = state_with(config, 0);
    state.start_gameplay();

    state.advance(1.0e8);
    assert_eq!(balloon_count(&state), balloon_pop::consts::MAX_CATCHUP_SPAWNS as usize);
    assert_eq!(state.phase(), GamePhase::Playing);
}

#[test]
fn snapshot_serializes_to_json() {
    let mut state = state_with(GameConfig::default(), 0);
    state.start_gameplay();
    state.advance(0.8);
    let json = serde_json::to_string(&state.snapshot()).unwrap();
    assert!(json.contains("\"phase\":\"Playing\""));
    assert!(json.contains("\"entities\""));
}

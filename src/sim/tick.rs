//! Per-tick input handling and the fixed-step driver
//!
//! Hit-testing happens outside the core; by the time input reaches `tick`
//! a pointer press has already been resolved to an entity id.

use super::frustum::CameraView;
use super::state::GameState;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Commands gathered since the previous tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Start button on the menu
    pub start: bool,
    /// Restart button on the game over screen
    pub restart: bool,
    /// Menu button on the game over screen
    pub return_to_menu: bool,
    /// Balloons the pointer hit
    pub pops: Vec<u32>,
    /// Power-ups the pointer hit
    pub collects: Vec<u32>,
    /// Camera for this frame, if it moved
    pub camera: Option<CameraView>,
}

impl TickInput {
    /// Clear one-shot commands after they have been consumed
    pub fn clear(&mut self) {
        self.start = false;
        self.restart = false;
        self.return_to_menu = false;
        self.pops.clear();
        self.collects.clear();
        self.camera = None;
    }
}

/// Apply input, then advance the simulation by `dt`
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if let Some(camera) = input.camera {
        state.set_camera(Some(camera));
    }

    if input.start {
        state.start_gameplay();
    }
    if input.restart {
        state.restart();
    }
    if input.return_to_menu {
        state.return_to_menu();
    }

    // Resolve hits against the positions the player actually saw
    for &id in &input.pops {
        state.pop(id);
    }
    for &id in &input.collects {
        state.collect(id);
    }

    state.advance(dt);
}

/// Converts variable frame time into fixed simulation steps
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `SIM_DT` steps to run for a frame of `frame_dt` seconds.
    /// Frames longer than 0.1 s are clipped, and at most `MAX_SUBSTEPS` run.
    pub fn steps(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, 0.1);
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }
}

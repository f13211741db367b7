//! Flight state and core simulation types
//!
//! Everything one run needs lives in [`FlightState`]. A restart builds a new
//! state from scratch; nothing here is ever revived out of the dead phase.

use serde::{Deserialize, Serialize};

use super::craft::{Craft, CraftPose};
use super::gates::{GatePool, GateView};
use super::input::{ControlVector, InputFusion};
use super::scoring::RunState;
use crate::tuning::{DeathTuning, Tuning};

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightPhase {
    /// Player has control
    Flying,
    /// Lives exhausted; the craft falls while gates keep scrolling
    Dead,
}

/// Complete simulation state for one run
#[derive(Debug, Clone)]
pub struct FlightState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub phase: FlightPhase,
    pub input: InputFusion,
    pub craft: Craft,
    pub gates: GatePool,
    pub run: RunState,
    /// Control vector consumed this frame (frozen once dead)
    pub control: ControlVector,
    /// Throttle at the moment of death; keeps the gates scrolling
    pub last_throttle: f32,
    /// Frames simulated
    pub frames: u64,
    /// Seconds simulated
    pub elapsed: f32,
    pub(crate) death: DeathTuning,
}

impl FlightState {
    /// Create a new run with the given seed and tuning
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        Self {
            seed,
            phase: FlightPhase::Flying,
            input: InputFusion::new(tuning.input.clone()),
            craft: Craft::new(tuning.flight.clone()),
            gates: GatePool::new(tuning.gates.clone(), seed),
            run: RunState::new(),
            control: ControlVector::default(),
            last_throttle: 0.0,
            frames: 0,
            elapsed: 0.0,
            death: tuning.death.clone(),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.phase == FlightPhase::Dead
    }

    pub fn score(&self) -> u64 {
        self.run.score
    }

    pub fn craft_pose(&self) -> CraftPose {
        self.craft.pose()
    }

    /// Per-slot render state for every gate in the pool
    pub fn gate_views(&self) -> impl Iterator<Item = GateView> + '_ {
        self.gates.views()
    }

    pub fn flash_intensity(&self) -> f32 {
        self.gates.flash_intensity()
    }
}

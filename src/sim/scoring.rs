//! Pass classification and run bookkeeping
//!
//! A gate is judged once, as it crosses the craft's depth plane. Misses raise
//! the screen flash; the flash's rising edge is what costs a life.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Result of a gate crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassOutcome {
    /// Craft was strictly inside the aperture on both axes
    Clean,
    Missed,
}

/// Judge a crossing. Clean iff both offsets are strictly below `inner_half`.
pub fn classify_pass(gate: Vec2, craft: Vec2, inner_half: f32) -> PassOutcome {
    let dx = (gate.x - craft.x).abs();
    let dy = (gate.y - craft.y).abs();
    if dx < inner_half && dy < inner_half {
        PassOutcome::Clean
    } else {
        PassOutcome::Missed
    }
}

/// Score and life bookkeeping for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunState {
    /// Clean passes while alive
    pub score: u64,
    /// Lives taken so far (one per flash rising edge)
    pub lives_lost: u32,
    /// Set once, never cleared
    pub terminal: bool,
    flash_active: bool,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a clean pass. Ignored once the run is over.
    pub fn record_clean_pass(&mut self) {
        if !self.terminal {
            self.score += 1;
        }
    }

    /// Feed this frame's flash intensity. Returns true only on the frame the
    /// flash goes from idle to active; a miss that re-arms a flash already in
    /// progress does not produce a new edge.
    pub fn observe_flash(&mut self, intensity: f32) -> bool {
        let active = intensity > 0.0;
        let rising = active && !self.flash_active;
        self.flash_active = active;
        rising
    }

    /// Record a lost life. Ignored once the run is over.
    pub fn lose_life(&mut self) {
        if !self.terminal {
            self.lives_lost += 1;
        }
    }

    /// One-way transition into the end of the run
    pub fn enter_terminal(&mut self) {
        self.terminal = true;
    }
}

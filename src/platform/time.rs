//! Frame timing
//!
//! Measures the wall-clock delta between frames and clamps it so a stall
//! (debugger, suspended window) cannot feed the simulation a huge step.

use std::time::{Duration, Instant};

use crate::consts::MAX_FRAME_DT;

/// Measures delta time between successive frames
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    max_dt: f32,
    paused: bool,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: None,
            max_dt: MAX_FRAME_DT,
            paused: false,
        }
    }

    /// Delta for a frame starting at `now`. The first frame (and the first
    /// frame after a resume) reports zero.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        if self.paused {
            return 0.0;
        }
        let dt = match self.last {
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
            None => 0.0,
        };
        self.last = Some(now);
        dt.min(self.max_dt)
    }

    /// Delta since the previous frame
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Stop reporting time; animations hold where they are
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume without counting the time spent paused
    pub fn resume(&mut self) {
        self.paused = false;
        self.last = None;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Time left until the next frame at `target_dt`, for pacing loops
    pub fn remaining(&self, target_dt: f32, now: Instant) -> Duration {
        let Some(last) = self.last else {
            return Duration::ZERO;
        };
        Duration::from_secs_f32(target_dt.max(0.0))
            .saturating_sub(now.saturating_duration_since(last))
    }
}

//! Demo autopilot
//!
//! Plays the game through the same raw-input path a player uses: it writes a
//! gamepad sample every frame, holding a cruise throttle with the triggers
//! and pointing the stick at the nearest gate that has not been judged yet.

use glam::Vec2;

use super::gates::GatePhase;
use super::input::GamepadSample;
use super::state::FlightState;

/// Trigger-and-stick pilot for idle/demo runs
#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Throttle the pilot tries to hold
    pub cruise_throttle: f32,
    /// Dead band around the cruise throttle
    pub throttle_slack: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            cruise_throttle: 0.6,
            throttle_slack: 0.05,
        }
    }
}

impl Autopilot {
    pub fn new(cruise_throttle: f32) -> Self {
        Self {
            cruise_throttle: cruise_throttle.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    /// Offset of the closest gate still waiting for its crossing test
    pub fn next_gate(state: &FlightState) -> Option<Vec2> {
        let band_far = state.gates.tuning().band_far;
        state
            .gates
            .slots()
            .iter()
            .filter(|g| matches!(g.phase, GatePhase::Active { verdict: None }))
            .filter(|g| g.depth < band_far)
            .max_by(|a, b| a.depth.total_cmp(&b.depth))
            .map(|g| g.offset)
    }

    /// Gamepad sample for this frame
    pub fn steer(&self, state: &FlightState) -> GamepadSample {
        let mut sample = GamepadSample::default();

        let throttle = state.input.target_throttle();
        if throttle < self.cruise_throttle - self.throttle_slack {
            sample.right_trigger = 1.0;
        } else if throttle > self.cruise_throttle + self.throttle_slack {
            sample.left_trigger = 1.0;
        }

        if let Some(target) = Self::next_gate(state) {
            let flight = state.craft.tuning();
            // Invert the flight model's offset targets
            sample.stick_x = (target.x / flight.max_lateral).clamp(-1.0, 1.0);
            sample.stick_y = (-target.y / flight.max_vertical).clamp(-1.0, 1.0);
        }

        sample
    }

    /// Write this frame's sample into the input engine
    pub fn drive(&self, state: &mut FlightState) {
        let sample = self.steer(state);
        state.input.set_gamepad(Some(sample));
    }
}

//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Same raw-input stream and dt sequence, same run
//! - Stable iteration order (by slot index)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod craft;
pub mod gates;
pub mod input;
pub mod scoring;
pub mod state;
pub mod tick;

pub use autopilot::Autopilot;
pub use craft::{Craft, CraftPose, ThrottleVisuals};
pub use gates::{Gate, GateEvent, GatePhase, GatePool, GateStats, GateView};
pub use input::{
    ATTITUDE_SOURCES, Action, Attitude, AttitudeSource, ControlVector, GamepadSample,
    InputFusion, RawInput,
};
pub use scoring::{PassOutcome, RunState, classify_pass};
pub use state::{FlightPhase, FlightState};
pub use tick::tick;

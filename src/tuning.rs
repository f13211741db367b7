//! Game balance and feel constants
//!
//! Every number the simulation uses lives here so a run can be retuned from a
//! JSON file without touching code. Missing fields fall back to the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value: {0}")]
    Invalid(String),
}

/// Input fusion constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputTuning {
    /// Throttle change per second while a throttle key is held
    pub throttle_rate: f32,
    /// Instant throttle change per wheel notch
    pub wheel_step: f32,
    /// Throttle change for a drag across the full screen height
    pub touch_throttle_gain: f32,
    /// Triggers below this value are ignored
    pub trigger_threshold: f32,
    /// Per-axis stick deadzone
    pub stick_deadzone: f32,
    /// Pointer deadzone as a fraction of the half-screen
    pub pointer_deadzone: f32,
    /// Scale applied to pointer and gyroscope deflection
    pub pointer_sensitivity: f32,
    /// Tilt (degrees) from the baseline that maps to full deflection
    pub gyro_full_deflection_deg: f32,
    /// Smoothing factor for throttle
    pub throttle_smoothing: f32,
    /// Smoothing factor for pitch and roll (softer than throttle)
    pub control_smoothing: f32,
}

impl Default for InputTuning {
    fn default() -> Self {
        Self {
            throttle_rate: 0.5,
            wheel_step: 0.08,
            touch_throttle_gain: 1.0,
            trigger_threshold: 0.1,
            stick_deadzone: 0.15,
            pointer_deadzone: 0.1,
            pointer_sensitivity: 0.7,
            gyro_full_deflection_deg: 30.0,
            throttle_smoothing: 0.08,
            control_smoothing: 0.06,
        }
    }
}

/// Flight model constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightTuning {
    pub max_pitch_deg: f32,
    pub max_roll_deg: f32,
    /// Lateral travel at full roll
    pub max_lateral: f32,
    /// Vertical travel at full pitch
    pub max_vertical: f32,
    /// Shared damping factor for all four pose channels
    pub damping: f32,
    pub glow_opacity_gain: f32,
    pub glow_scale_gain: f32,
    pub emissive_gain: f32,
    /// Hull color with the engines off (0xRRGGBB)
    pub idle_hull_color: u32,
    /// Hull color at full throttle (0xRRGGBB)
    pub active_hull_color: u32,
}

impl Default for FlightTuning {
    fn default() -> Self {
        Self {
            max_pitch_deg: 30.0,
            max_roll_deg: 45.0,
            max_lateral: 8.0,
            max_vertical: 5.0,
            damping: 0.08,
            glow_opacity_gain: 0.95,
            glow_scale_gain: 0.5,
            emissive_gain: 0.15,
            idle_hull_color: 0x0f0f0f,
            active_hull_color: 0x1f1f1f,
        }
    }
}

/// Gate pool, spawner and collision constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateTuning {
    /// Spawner stays dormant below this throttle
    pub activation_throttle: f32,
    /// Spawn timer starts at this fraction of the base interval on activation
    pub first_spawn_fraction: f32,
    /// Seconds between spawns at full throttle
    pub base_interval: f32,
    /// Floor applied to throttle when computing the spawn interval
    pub min_effective_throttle: f32,
    /// Units per second at full throttle
    pub base_speed: f32,
    /// Lateral spawn spread (+/-)
    pub range_x: f32,
    /// Vertical spawn spread (+/-)
    pub range_y: f32,
    pub spawn_depth: f32,
    pub despawn_depth: f32,
    /// Collision test band around the craft plane (exclusive bounds)
    pub band_near: f32,
    pub band_far: f32,
    pub inner_size: f32,
    pub outer_size: f32,
    /// Depth behind the craft where the trailing fade starts
    pub fade_start: f32,
    /// Distance over which the trailing fade reaches zero
    pub fade_distance: f32,
    pub base_opacity: f32,
    pub dissolve_duration: f32,
    /// Extra scale reached at the end of a dissolve
    pub dissolve_growth: f32,
    pub flash_duration: f32,
    pub gate_color: u32,
}

impl Default for GateTuning {
    fn default() -> Self {
        Self {
            activation_throttle: 0.05,
            first_spawn_fraction: 0.6,
            base_interval: 1.0,
            min_effective_throttle: 0.1,
            base_speed: 500.0,
            range_x: 8.0,
            range_y: 4.0,
            spawn_depth: -250.0,
            despawn_depth: 30.0,
            band_near: -1.0,
            band_far: 3.0,
            inner_size: 7.2,
            outer_size: 8.0,
            fade_start: 10.0,
            fade_distance: 20.0,
            base_opacity: 0.85,
            dissolve_duration: 0.4,
            dissolve_growth: 0.3,
            flash_duration: 0.3,
            gate_color: 0xff2222,
        }
    }
}

impl GateTuning {
    /// Half the inner aperture; a clean pass must be strictly inside this
    pub fn inner_half(&self) -> f32 {
        self.inner_size / 2.0
    }

    /// Seconds between spawns at the given throttle
    pub fn spawn_interval(&self, throttle: f32) -> f32 {
        self.base_interval / throttle.max(self.min_effective_throttle)
    }
}

/// Death sequence constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeathTuning {
    /// Downward acceleration (units/s²)
    pub gravity: f32,
    /// Nose-down rotation rate (radians/s)
    pub nose_down_rate: f32,
}

impl Default for DeathTuning {
    fn default() -> Self {
        Self {
            gravity: 30.0,
            nose_down_rate: 0.6,
        }
    }
}

/// Complete tuning set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub input: InputTuning,
    pub flight: FlightTuning,
    pub gates: GateTuning,
    pub death: DeathTuning,
}

impl Tuning {
    /// Parse tuning from JSON text
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load tuning from a file, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load_from(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                log::warn!("Using default tuning ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Reject values that would break the smoothing or timing invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        let factors = [
            ("input.throttle_smoothing", self.input.throttle_smoothing),
            ("input.control_smoothing", self.input.control_smoothing),
            ("flight.damping", self.flight.damping),
        ];
        for (name, k) in factors {
            if !(k > 0.0 && k < 1.0) {
                return Err(TuningError::Invalid(format!(
                    "{name} must be in (0, 1), got {k}"
                )));
            }
        }

        let positive = [
            ("gates.base_interval", self.gates.base_interval),
            ("gates.min_effective_throttle", self.gates.min_effective_throttle),
            ("gates.base_speed", self.gates.base_speed),
            ("gates.dissolve_duration", self.gates.dissolve_duration),
            ("gates.flash_duration", self.gates.flash_duration),
            ("gates.fade_distance", self.gates.fade_distance),
            ("input.gyro_full_deflection_deg", self.input.gyro_full_deflection_deg),
        ];
        for (name, v) in positive {
            if !(v > 0.0) {
                return Err(TuningError::Invalid(format!(
                    "{name} must be positive, got {v}"
                )));
            }
        }

        if self.gates.band_near >= self.gates.band_far {
            return Err(TuningError::Invalid(format!(
                "collision band is inverted ({} >= {})",
                self.gates.band_near, self.gates.band_far
            )));
        }
        if !(self.gates.inner_size > 0.0 && self.gates.inner_size < self.gates.outer_size) {
            return Err(TuningError::Invalid(format!(
                "gate aperture {} must be positive and smaller than the frame {}",
                self.gates.inner_size, self.gates.outer_size
            )));
        }
        if self.gates.spawn_depth >= self.gates.band_near {
            return Err(TuningError::Invalid(
                "gates must spawn ahead of the collision band".to_string(),
            ));
        }

        Ok(())
    }
}

//! Flight kinematics
//!
//! The craft never integrates velocities while flying. Each frame the control
//! vector is mapped linearly to target angles and offsets, and the four
//! smoothed channels are pulled toward those targets with [`approach`].

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::input::ControlVector;
use crate::tuning::{DeathTuning, FlightTuning};
use crate::{approach, lerp, rgb_from_hex};

/// Externally visible craft transform
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CraftPose {
    /// Lateral offset (x) and vertical offset (y)
    pub position: Vec2,
    /// Pitch angle around X (radians, positive = nose down)
    pub rotation_x: f32,
    /// Roll angle around Z (radians, positive = bank right)
    pub rotation_z: f32,
}

/// Engine glow and hull appearance, a pure function of throttle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThrottleVisuals {
    pub glow_opacity: f32,
    pub glow_scale: f32,
    pub hull_color: Vec3,
    pub emissive_intensity: f32,
}

impl Default for ThrottleVisuals {
    fn default() -> Self {
        Self {
            glow_opacity: 0.0,
            glow_scale: 1.0,
            hull_color: Vec3::ZERO,
            emissive_intensity: 0.0,
        }
    }
}

impl ThrottleVisuals {
    /// Recompute in place for the given throttle
    pub fn apply(&mut self, throttle: f32, tuning: &FlightTuning) {
        let throttle = throttle.clamp(0.0, 1.0);
        self.glow_opacity = (throttle * tuning.glow_opacity_gain).clamp(0.0, 1.0);
        self.glow_scale = 1.0 + throttle * tuning.glow_scale_gain;

        let idle = rgb_from_hex(tuning.idle_hull_color);
        if throttle > 0.0 {
            let active = rgb_from_hex(tuning.active_hull_color);
            self.hull_color = Vec3::new(
                lerp(idle.x, active.x, throttle),
                lerp(idle.y, active.y, throttle),
                lerp(idle.z, active.z, throttle),
            );
            self.emissive_intensity = throttle * tuning.emissive_gain;
        } else {
            self.hull_color = idle;
            self.emissive_intensity = 0.0;
        }
    }
}

/// The player's craft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Craft {
    tuning: FlightTuning,
    /// Smoothed pitch angle (radians)
    pub current_pitch: f32,
    /// Smoothed roll angle (radians)
    pub current_roll: f32,
    pub current_lateral: f32,
    pub current_vertical: f32,
    /// Downward speed during the death fall
    pub vertical_velocity: f32,
    pose: CraftPose,
    visuals: ThrottleVisuals,
}

impl Craft {
    pub fn new(tuning: FlightTuning) -> Self {
        let mut craft = Self {
            tuning,
            current_pitch: 0.0,
            current_roll: 0.0,
            current_lateral: 0.0,
            current_vertical: 0.0,
            vertical_velocity: 0.0,
            pose: CraftPose::default(),
            visuals: ThrottleVisuals::default(),
        };
        craft.visuals.apply(0.0, &craft.tuning);
        craft
    }

    /// Targets for (pitch angle, roll angle, lateral, vertical)
    pub fn targets(&self, control: ControlVector) -> (f32, f32, f32, f32) {
        let pitch = control.pitch.clamp(-1.0, 1.0);
        let roll = control.roll.clamp(-1.0, 1.0);
        (
            pitch * self.tuning.max_pitch_deg.to_radians(),
            roll * self.tuning.max_roll_deg.to_radians(),
            roll * self.tuning.max_lateral,
            // Nose up (negative pitch) climbs
            -pitch * self.tuning.max_vertical,
        )
    }

    /// Advance one frame toward the control vector
    pub fn update(&mut self, control: ControlVector) {
        let (pitch, roll, lateral, vertical) = self.targets(control);
        let k = self.tuning.damping;

        self.current_pitch = approach(self.current_pitch, pitch, k);
        self.current_roll = approach(self.current_roll, roll, k);
        self.current_lateral = approach(self.current_lateral, lateral, k);
        self.current_vertical = approach(self.current_vertical, vertical, k);

        self.pose.position = Vec2::new(self.current_lateral, self.current_vertical);
        self.pose.rotation_x = self.current_pitch;
        self.pose.rotation_z = self.current_roll;

        self.visuals.apply(control.throttle, &self.tuning);
    }

    /// Uncontrolled fall after the run ends: gravity pulls the craft down and
    /// the nose drops at a constant rate. Roll and lateral stay frozen.
    pub fn fall(&mut self, dt: f32, death: &DeathTuning) {
        self.vertical_velocity += death.gravity * dt;
        self.current_vertical -= self.vertical_velocity * dt;
        self.current_pitch += death.nose_down_rate * dt;

        self.pose.position.y = self.current_vertical;
        self.pose.rotation_x = self.current_pitch;
    }

    pub fn tuning(&self) -> &FlightTuning {
        &self.tuning
    }

    /// Pitch as a fraction of the travel limit, -1 (nose up) to 1
    pub fn pitch_deflection(&self) -> f32 {
        let max = self.tuning.max_pitch_deg.to_radians();
        if max > 0.0 {
            (self.current_pitch / max).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn pose(&self) -> CraftPose {
        self.pose
    }

    /// Lateral/vertical offset used for gate tests
    pub fn position(&self) -> Vec2 {
        self.pose.position
    }

    pub fn visuals(&self) -> &ThrottleVisuals {
        &self.visuals
    }
}

impl Default for Craft {
    fn default() -> Self {
        Self::new(FlightTuning::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::FRAC_PI_4;

    fn control(throttle: f32, pitch: f32, roll: f32) -> ControlVector {
        ControlVector {
            throttle,
            pitch,
            roll,
        }
    }

    #[test]
    fn test_targets() {
        let craft = Craft::default();
        let (pitch, roll, lateral, vertical) = craft.targets(control(0.0, -1.0, 1.0));
        assert!((pitch + 30f32.to_radians()).abs() < 1e-6);
        assert!((roll - FRAC_PI_4).abs() < 1e-6);
        assert!((lateral - 8.0).abs() < 1e-6);
        assert!((vertical - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_first_step_is_damped() {
        let mut craft = Craft::default();
        craft.update(control(0.5, 0.0, 1.0));
        assert!((craft.current_lateral - 0.64).abs() < 1e-5);
        assert_eq!(craft.pose().position.x, craft.current_lateral);
        assert_eq!(craft.pose().rotation_z, craft.current_roll);
    }

    #[test]
    fn test_converges_without_overshoot() {
        let mut craft = Craft::default();
        let mut last = 0.0;
        for _ in 0..100 {
            craft.update(control(1.0, 1.0, 0.0));
            assert!(craft.current_vertical < last);
            assert!(craft.current_vertical > -5.0);
            last = craft.current_vertical;
        }
        assert!((craft.current_vertical + 5.0).abs() < 2e-3);
    }

    #[test]
    fn test_out_of_range_control_clamped() {
        let mut craft = Craft::default();
        for _ in 0..2000 {
            craft.update(control(3.0, 0.0, -7.0));
        }
        assert!(craft.current_lateral >= -8.0);
        assert!((craft.visuals().glow_opacity - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_throttle_visuals() {
        let tuning = FlightTuning::default();
        let mut visuals = ThrottleVisuals::default();

        visuals.apply(0.0, &tuning);
        assert_eq!(visuals.glow_opacity, 0.0);
        assert_eq!(visuals.glow_scale, 1.0);
        assert_eq!(visuals.hull_color, rgb_from_hex(0x0f0f0f));
        assert_eq!(visuals.emissive_intensity, 0.0);

        visuals.apply(1.0, &tuning);
        assert!((visuals.glow_opacity - 0.95).abs() < 1e-6);
        assert!((visuals.glow_scale - 1.5).abs() < 1e-6);
        assert!((visuals.hull_color - rgb_from_hex(0x1f1f1f)).length() < 1e-6);
        assert!((visuals.emissive_intensity - 0.15).abs() < 1e-6);

        visuals.apply(0.5, &tuning);
        let mid = (rgb_from_hex(0x0f0f0f) + rgb_from_hex(0x1f1f1f)) * 0.5;
        assert!((visuals.hull_color - mid).length() < 1e-6);
    }

    #[test]
    fn test_pitch_deflection() {
        let mut craft = Craft::new(FlightTuning::default());
        assert_eq!(craft.pitch_deflection(), 0.0);
        for _ in 0..300 {
            craft.update(control(0.0, -1.0, 0.0));
        }
        assert!((craft.pitch_deflection() + 1.0).abs() < 1e-3);
        assert!(craft.pitch_deflection() >= -1.0);
    }

    #[test]
    fn test_fall() {
        let death = DeathTuning::default();
        let mut craft = Craft::default();
        craft.update(control(1.0, 0.0, 0.5));
        let lateral = craft.current_lateral;
        let roll = craft.current_roll;

        let mut last_y = craft.position().y;
        let mut last_pitch = craft.pose().rotation_x;
        for _ in 0..30 {
            craft.fall(1.0 / 60.0, &death);
            assert!(craft.position().y < last_y);
            assert!(craft.pose().rotation_x > last_pitch);
            last_y = craft.position().y;
            last_pitch = craft.pose().rotation_x;
        }
        assert!((craft.vertical_velocity - 15.0).abs() < 1e-3);
        assert_eq!(craft.current_lateral, lateral);
        assert_eq!(craft.current_roll, roll);
    }

    proptest! {
        #[test]
        fn pose_stays_within_travel(
            steps in prop::collection::vec((0.0f32..1.0, -1.0f32..1.0, -1.0f32..1.0), 1..300)
        ) {
            let mut craft = Craft::default();
            for (t, p, r) in steps {
                craft.update(control(t, p, r));
                prop_assert!(craft.current_lateral.abs() <= 8.0 + 1e-4);
                prop_assert!(craft.current_vertical.abs() <= 5.0 + 1e-4);
                prop_assert!(craft.current_pitch.abs() <= 30f32.to_radians() + 1e-4);
                prop_assert!(craft.current_roll.abs() <= FRAC_PI_4 + 1e-4);
            }
        }
    }
}

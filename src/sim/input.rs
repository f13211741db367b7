//! Input fusion
//!
//! Raw samples from every input device are written into [`RawInput`] by event
//! handlers as they arrive. Once per frame [`InputFusion::update`] reads the
//! latest snapshot and produces one smoothed [`ControlVector`].
//!
//! Throttle sources are additive on a shared target. Pitch and roll come from
//! exactly one source per frame, picked by walking [`ATTITUDE_SOURCES`] in
//! priority order.

use serde::{Deserialize, Serialize};

use crate::approach;
use crate::tuning::InputTuning;

/// Fused, smoothed control state for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlVector {
    /// 0 to 1
    pub throttle: f32,
    /// -1 (nose up) to 1 (nose down)
    pub pitch: f32,
    /// -1 (bank left) to 1 (bank right)
    pub roll: f32,
}

/// Logical actions bound to discrete keys or buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    ThrottleUp,
    ThrottleDown,
    PitchUp,
    PitchDown,
    RollLeft,
    RollRight,
}

impl Action {
    /// Map a DOM-style key code to an action
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "KeyW" | "Space" => Some(Action::ThrottleUp),
            "KeyS" | "ShiftLeft" | "ShiftRight" => Some(Action::ThrottleDown),
            "ArrowUp" => Some(Action::PitchUp),
            "ArrowDown" => Some(Action::PitchDown),
            "ArrowLeft" | "KeyA" => Some(Action::RollLeft),
            "ArrowRight" | "KeyD" => Some(Action::RollRight),
            _ => None,
        }
    }
}

/// Held state of each logical action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyState {
    pub throttle_up: bool,
    pub throttle_down: bool,
    pub pitch_up: bool,
    pub pitch_down: bool,
    pub roll_left: bool,
    pub roll_right: bool,
}

impl KeyState {
    fn set(&mut self, action: Action, pressed: bool) {
        let slot = match action {
            Action::ThrottleUp => &mut self.throttle_up,
            Action::ThrottleDown => &mut self.throttle_down,
            Action::PitchUp => &mut self.pitch_up,
            Action::PitchDown => &mut self.pitch_down,
            Action::RollLeft => &mut self.roll_left,
            Action::RollRight => &mut self.roll_right,
        };
        *slot = pressed;
    }
}

/// Latest pointer sample, already normalized and deadzoned
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    /// -1 (left edge) to 1 (right edge)
    pub x: f32,
    /// -1 (top edge) to 1 (bottom edge)
    pub y: f32,
    pub active: bool,
}

/// First connected gamepad, as polled this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GamepadSample {
    /// Left stick X, -1 to 1
    pub stick_x: f32,
    /// Left stick Y, -1 (up) to 1 (down)
    pub stick_y: f32,
    /// 0 to 1
    pub left_trigger: f32,
    /// 0 to 1
    pub right_trigger: f32,
}

impl GamepadSample {
    /// Clamp every value into its legal range. Non-finite values read as rest.
    pub fn clamped(self) -> Self {
        let axis = |v: f32| if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
        let trigger = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            stick_x: axis(self.stick_x),
            stick_y: axis(self.stick_y),
            left_trigger: trigger(self.left_trigger),
            right_trigger: trigger(self.right_trigger),
        }
    }
}

/// Device orientation relative to the first reading of the session
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GyroSample {
    /// (front-back, left-right) tilt of the first valid reading, degrees.
    /// Captured once and never reset.
    pub baseline: Option<(f32, f32)>,
    /// Front-back tilt offset from the baseline, degrees
    pub pitch_offset: f32,
    /// Left-right tilt offset from the baseline, degrees
    pub roll_offset: f32,
    pub active: bool,
}

/// Single-finger drag in progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TouchSample {
    /// Last seen Y position (pixels), `None` when no finger is down
    pub last_y: Option<f32>,
}

/// Snapshot of every raw device sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    pub keys: KeyState,
    pub pointer: PointerSample,
    pub gamepad: Option<GamepadSample>,
    pub gyro: GyroSample,
    pub touch: TouchSample,
}

/// Pitch and roll contribution of one source
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Attitude {
    pub pitch: f32,
    pub roll: f32,
}

/// A device that can steer pitch and roll
pub trait AttitudeSource: Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Whether this source has input to contribute this frame
    fn is_active(&self, raw: &RawInput, tuning: &InputTuning) -> bool;

    /// Target pitch and roll while this source is in control
    fn attitude(&self, raw: &RawInput, tuning: &InputTuning) -> Attitude;
}

/// Left stick, active when either axis leaves the deadzone
pub struct GamepadStick;

impl AttitudeSource for GamepadStick {
    fn name(&self) -> &'static str {
        "gamepad"
    }

    fn is_active(&self, raw: &RawInput, tuning: &InputTuning) -> bool {
        raw.gamepad.is_some_and(|pad| {
            pad.stick_x.abs() > tuning.stick_deadzone || pad.stick_y.abs() > tuning.stick_deadzone
        })
    }

    fn attitude(&self, raw: &RawInput, tuning: &InputTuning) -> Attitude {
        let Some(pad) = raw.gamepad else {
            return Attitude::default();
        };
        let axis = |v: f32| if v.abs() > tuning.stick_deadzone { v } else { 0.0 };
        Attitude {
            pitch: axis(pad.stick_y),
            roll: axis(pad.stick_x),
        }
    }
}

/// Arrow keys / A-D, full deflection while held
pub struct Keyboard;

impl Keyboard {
    fn axes(keys: &KeyState) -> Attitude {
        let mut pitch = 0.0;
        let mut roll = 0.0;
        if keys.pitch_up {
            pitch = -1.0;
        }
        if keys.pitch_down {
            pitch = 1.0;
        }
        if keys.roll_left {
            roll = -1.0;
        }
        if keys.roll_right {
            roll = 1.0;
        }
        Attitude { pitch, roll }
    }
}

impl AttitudeSource for Keyboard {
    fn name(&self) -> &'static str {
        "keyboard"
    }

    fn is_active(&self, raw: &RawInput, _tuning: &InputTuning) -> bool {
        let a = Self::axes(&raw.keys);
        a.pitch != 0.0 || a.roll != 0.0
    }

    fn attitude(&self, raw: &RawInput, _tuning: &InputTuning) -> Attitude {
        Self::axes(&raw.keys)
    }
}

/// Device tilt relative to the session baseline
pub struct Gyroscope;

impl AttitudeSource for Gyroscope {
    fn name(&self) -> &'static str {
        "gyroscope"
    }

    fn is_active(&self, raw: &RawInput, _tuning: &InputTuning) -> bool {
        raw.gyro.active
    }

    fn attitude(&self, raw: &RawInput, tuning: &InputTuning) -> Attitude {
        let full = tuning.gyro_full_deflection_deg;
        let deflect = |deg: f32| (deg / full).clamp(-1.0, 1.0) * tuning.pointer_sensitivity;
        Attitude {
            pitch: deflect(raw.gyro.pitch_offset),
            roll: deflect(raw.gyro.roll_offset),
        }
    }
}

/// Mouse offset from screen center
pub struct Mouse;

impl AttitudeSource for Mouse {
    fn name(&self) -> &'static str {
        "mouse"
    }

    fn is_active(&self, raw: &RawInput, _tuning: &InputTuning) -> bool {
        raw.pointer.active
    }

    fn attitude(&self, raw: &RawInput, tuning: &InputTuning) -> Attitude {
        Attitude {
            pitch: raw.pointer.y * tuning.pointer_sensitivity,
            roll: raw.pointer.x * tuning.pointer_sensitivity,
        }
    }
}

/// Pitch/roll sources, highest priority first. Neutral when none is active.
pub static ATTITUDE_SOURCES: [&dyn AttitudeSource; 4] =
    [&GamepadStick, &Keyboard, &Gyroscope, &Mouse];

/// Pick the attitude target for this frame
pub fn arbitrate(raw: &RawInput, tuning: &InputTuning) -> (Option<&'static str>, Attitude) {
    ATTITUDE_SOURCES
        .iter()
        .find(|source| source.is_active(raw, tuning))
        .map(|source| (Some(source.name()), source.attitude(raw, tuning)))
        .unwrap_or((None, Attitude::default()))
}

/// Fuses raw device samples into a smoothed control vector
#[derive(Debug, Clone)]
pub struct InputFusion {
    tuning: InputTuning,
    raw: RawInput,
    target_throttle: f32,
    target_pitch: f32,
    target_roll: f32,
    throttle: f32,
    pitch: f32,
    roll: f32,
    /// Source in control last frame, for change logging
    last_source: Option<&'static str>,
}

impl InputFusion {
    pub fn new(tuning: InputTuning) -> Self {
        Self {
            tuning,
            raw: RawInput::default(),
            target_throttle: 0.0,
            target_pitch: 0.0,
            target_roll: 0.0,
            throttle: 0.0,
            pitch: 0.0,
            roll: 0.0,
            last_source: None,
        }
    }

    pub fn tuning(&self) -> &InputTuning {
        &self.tuning
    }

    /// Latest raw samples
    pub fn raw(&self) -> &RawInput {
        &self.raw
    }

    // === Event writers ===

    /// Key or button press/release for a logical action
    pub fn set_action(&mut self, action: Action, pressed: bool) {
        self.raw.keys.set(action, pressed);
    }

    /// Key press/release by key code; unmapped codes are ignored.
    /// Returns whether the code was mapped.
    pub fn set_key(&mut self, code: &str, pressed: bool) -> bool {
        match Action::from_key_code(code) {
            Some(action) => {
                self.set_action(action, pressed);
                true
            }
            None => false,
        }
    }

    /// Wheel scroll. Scrolling down raises throttle by one step.
    pub fn on_wheel(&mut self, delta_y: f32) {
        if delta_y == 0.0 || delta_y.is_nan() {
            return;
        }
        let delta = delta_y.signum() * self.tuning.wheel_step;
        self.nudge_throttle(delta);
    }

    /// Pointer moved to (x, y) pixels inside a `width` x `height` window
    pub fn on_pointer_move(&mut self, x: f32, y: f32, width: f32, height: f32) {
        if ![x, y, width, height].iter().all(|v| v.is_finite()) {
            return;
        }
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let cx = width / 2.0;
        let cy = height / 2.0;
        let raw_x = ((x - cx) / cx).clamp(-1.0, 1.0);
        let raw_y = ((y - cy) / cy).clamp(-1.0, 1.0);
        let dz = self.tuning.pointer_deadzone;
        self.raw.pointer = PointerSample {
            x: if raw_x.abs() < dz { 0.0 } else { raw_x },
            y: if raw_y.abs() < dz { 0.0 } else { raw_y },
            active: true,
        };
    }

    /// Pointer left the window
    pub fn on_pointer_leave(&mut self) {
        self.raw.pointer = PointerSample::default();
    }

    /// Latest gamepad poll, `None` when no pad is connected
    pub fn set_gamepad(&mut self, sample: Option<GamepadSample>) {
        self.raw.gamepad = sample.map(GamepadSample::clamped);
    }

    /// Device orientation reading (degrees). The first reading becomes the
    /// baseline for the rest of the session.
    pub fn on_orientation(&mut self, front_back_deg: f32, left_right_deg: f32) {
        if !front_back_deg.is_finite() || !left_right_deg.is_finite() {
            return;
        }
        let gyro = &mut self.raw.gyro;
        let (base_pitch, base_roll) = *gyro.baseline.get_or_insert_with(|| {
            log::debug!(
                "Gyroscope baseline captured at ({:.1}, {:.1})",
                front_back_deg,
                left_right_deg
            );
            (front_back_deg, left_right_deg)
        });
        gyro.pitch_offset = front_back_deg - base_pitch;
        gyro.roll_offset = left_right_deg - base_roll;
        gyro.active = true;
    }

    /// Orientation events stopped. The baseline is kept.
    pub fn on_orientation_lost(&mut self) {
        let gyro = &mut self.raw.gyro;
        gyro.pitch_offset = 0.0;
        gyro.roll_offset = 0.0;
        gyro.active = false;
    }

    pub fn on_touch_start(&mut self, y: f32) {
        if y.is_finite() {
            self.raw.touch.last_y = Some(y);
        }
    }

    /// Finger dragged to `y` on a screen `height` pixels tall. Dragging up
    /// raises throttle immediately.
    pub fn on_touch_move(&mut self, y: f32, height: f32) {
        let Some(last_y) = self.raw.touch.last_y else {
            return;
        };
        if !y.is_finite() || !height.is_finite() {
            return;
        }
        if height > 0.0 {
            let delta = (last_y - y) / height * self.tuning.touch_throttle_gain;
            self.nudge_throttle(delta);
        }
        self.raw.touch.last_y = Some(y);
    }

    pub fn on_touch_end(&mut self) {
        self.raw.touch.last_y = None;
    }

    fn nudge_throttle(&mut self, delta: f32) {
        if !delta.is_finite() {
            return;
        }
        self.target_throttle = (self.target_throttle + delta).clamp(0.0, 1.0);
    }

    // === Per-frame update ===

    /// Advance targets and smoothing by one frame. Call exactly once per frame.
    pub fn update(&mut self, dt: f32) {
        let rate = self.tuning.throttle_rate;

        // Throttle: every source adds to the same target
        if self.raw.keys.throttle_up {
            self.nudge_throttle(dt * rate);
        }
        if self.raw.keys.throttle_down {
            self.nudge_throttle(-dt * rate);
        }
        if let Some(pad) = self.raw.gamepad {
            if pad.right_trigger > self.tuning.trigger_threshold {
                self.nudge_throttle(pad.right_trigger * dt * rate);
            }
            if pad.left_trigger > self.tuning.trigger_threshold {
                self.nudge_throttle(-pad.left_trigger * dt * rate);
            }
        }

        // Pitch/roll: first active source wins
        let (source, attitude) = arbitrate(&self.raw, &self.tuning);
        if source != self.last_source {
            log::debug!("Attitude source: {:?} -> {:?}", self.last_source, source);
            self.last_source = source;
        }
        self.target_pitch = attitude.pitch.clamp(-1.0, 1.0);
        self.target_roll = attitude.roll.clamp(-1.0, 1.0);

        self.throttle = approach(
            self.throttle,
            self.target_throttle,
            self.tuning.throttle_smoothing,
        );
        self.pitch = approach(self.pitch, self.target_pitch, self.tuning.control_smoothing);
        self.roll = approach(self.roll, self.target_roll, self.tuning.control_smoothing);
    }

    pub fn throttle(&self) -> f32 {
        self.throttle
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn roll(&self) -> f32 {
        self.roll
    }

    pub fn target_throttle(&self) -> f32 {
        self.target_throttle
    }

    pub fn target_pitch(&self) -> f32 {
        self.target_pitch
    }

    pub fn target_roll(&self) -> f32 {
        self.target_roll
    }

    /// Smoothed control vector for this frame
    pub fn control(&self) -> ControlVector {
        ControlVector {
            throttle: self.throttle,
            pitch: self.pitch,
            roll: self.roll,
        }
    }
}

impl Default for InputFusion {
    fn default() -> Self {
        Self::new(InputTuning::default())
    }
}

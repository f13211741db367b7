//! Stealth Flight - an endless gate-passing flight simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (input fusion, flight model, gates, scoring)
//! - `hud`: On-screen display interface and the horizon-dots life model
//! - `platform`: Frame timing outside the deterministic core
//! - `tuning`: Data-driven game balance

pub mod hud;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use hud::{HorizonOsd, Osd};
pub use tuning::{Tuning, TuningError};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Gate slots in the obstacle pool
    pub const POOL_SIZE: usize = 12;
    /// Largest frame delta accepted from the clock (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Step used by headless runs (60 Hz)
    pub const DEMO_DT: f32 = 1.0 / 60.0;
    /// Dots on the horizon indicator (odd, center dot is the last life)
    pub const HORIZON_DOT_COUNT: usize = 9;
}

/// One step of the exponential smoothing filter: `v += (target - v) * k`.
///
/// For `0 < k < 1` the result lies strictly between `current` and `target`
/// (unless they are equal), so repeated application never overshoots.
#[inline]
pub fn approach(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Convert a packed `0xRRGGBB` color to RGB components in [0, 1]
#[inline]
pub fn rgb_from_hex(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

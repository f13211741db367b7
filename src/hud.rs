//! On-screen display
//!
//! The OSD is an artificial horizon made of dots. It stays world-relative
//! (rotates against roll, shifts against pitch) and doubles as the life
//! counter: each miss removes the outermost pair of dots, and the miss after
//! the last pair takes the center dot and ends the run.

use serde::{Deserialize, Serialize};

use crate::consts::HORIZON_DOT_COUNT;

/// Pixels of horizon shift per unit of pitch deflection
pub const PITCH_SCALE: f32 = 60.0;

/// Display collaborator driven by the frame orchestrator
pub trait Osd {
    /// Pitch deflection (-1 to 1) and roll angle (radians) for this frame
    fn update(&mut self, pitch: f32, roll: f32);

    /// A life was lost. Returns true if this was the life-ending miss.
    fn on_miss(&mut self) -> bool;

    /// Run is over; replace the horizon with the final score
    fn show_score(&mut self, score: u64);
}

/// In-memory model of the horizon-dots display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizonOsd {
    /// Visibility of each dot, left to right
    pub dots: [bool; HORIZON_DOT_COUNT],
    /// Horizon rotation (degrees), opposite to roll
    pub rotation_deg: f32,
    /// Vertical horizon shift (pixels)
    pub pitch_offset_px: f32,
    /// Final score once shown; the dots are gone at that point
    pub score: Option<u64>,
    removed_pairs: usize,
}

impl Default for HorizonOsd {
    fn default() -> Self {
        Self::new()
    }
}

impl HorizonOsd {
    pub fn new() -> Self {
        Self {
            dots: [true; HORIZON_DOT_COUNT],
            rotation_deg: 0.0,
            pitch_offset_px: 0.0,
            score: None,
            removed_pairs: 0,
        }
    }

    const CENTER: usize = HORIZON_DOT_COUNT / 2;

    /// Misses that can be absorbed before the final one
    pub fn lives_remaining(&self) -> usize {
        if self.dots[Self::CENTER] {
            Self::CENTER - self.removed_pairs + 1
        } else {
            0
        }
    }

    pub fn visible_dots(&self) -> usize {
        self.dots.iter().filter(|&&d| d).count()
    }
}

impl Osd for HorizonOsd {
    fn update(&mut self, pitch: f32, roll: f32) {
        self.rotation_deg = -roll.to_degrees();
        self.pitch_offset_px = pitch * PITCH_SCALE;
    }

    fn on_miss(&mut self) -> bool {
        if self.removed_pairs >= Self::CENTER {
            self.dots[Self::CENTER] = false;
            return true;
        }

        self.dots[self.removed_pairs] = false;
        self.dots[HORIZON_DOT_COUNT - 1 - self.removed_pairs] = false;
        self.removed_pairs += 1;
        false
    }

    fn show_score(&mut self, score: u64) {
        self.rotation_deg = 0.0;
        self.pitch_offset_px = 0.0;
        self.dots = [false; HORIZON_DOT_COUNT];
        self.score = Some(score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_rotates() {
        let mut osd = HorizonOsd::new();
        osd.update(0.5, std::f32::consts::FRAC_PI_4);
        assert!((osd.rotation_deg + 45.0).abs() < 1e-4);
        assert!((osd.pitch_offset_px - 30.0).abs() < 1e-4);

        osd.update(-1.0, 0.0);
        assert!((osd.pitch_offset_px + PITCH_SCALE).abs() < 1e-4);
    }

    #[test]
    fn test_misses_remove_pairs_outside_in() {
        let mut osd = HorizonOsd::new();
        assert_eq!(osd.lives_remaining(), 5);

        assert!(!osd.on_miss());
        assert!(!osd.dots[0] && !osd.dots[8]);
        assert!(osd.dots[1] && osd.dots[7]);
        assert_eq!(osd.visible_dots(), 7);

        for _ in 0..3 {
            assert!(!osd.on_miss());
        }
        assert_eq!(osd.visible_dots(), 1);
        assert!(osd.dots[4]);
        assert_eq!(osd.lives_remaining(), 1);

        assert!(osd.on_miss());
        assert_eq!(osd.visible_dots(), 0);
        assert_eq!(osd.lives_remaining(), 0);
    }

    #[test]
    fn test_show_score() {
        let mut osd = HorizonOsd::new();
        osd.update(1.0, 1.0);
        osd.show_score(17);
        assert_eq!(osd.score, Some(17));
        assert_eq!(osd.rotation_deg, 0.0);
        assert_eq!(osd.visible_dots(), 0);
    }
}

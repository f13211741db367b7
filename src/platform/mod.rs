//! Platform abstraction layer
//!
//! Everything that touches wall-clock time stays out of `sim`.

pub mod time;

pub use time::FrameClock;

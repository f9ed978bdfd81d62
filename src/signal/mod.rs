//! # Signal Conditioning Module
//!
//! Turns raw 16-bit channel readings into bounded actuator commands.
//!
//! This module handles:
//! - Mapping a raw reading onto an actuator's travel range
//! - Collapsing small deviations around neutral (dead-zone)
//! - Damping noisy readings with a fixed-size moving average

pub mod actuator;
pub mod smoothing;

pub use actuator::{Actuator, ActuatorSpec};
pub use smoothing::SmoothingBuffer;

/// Full scale of a raw channel reading (16-bit).
pub const RAW_FULL_SCALE: f64 = 65536.0;

/// Raw reading at the middle of the input range.
pub const RAW_CENTER: u16 = 32768;

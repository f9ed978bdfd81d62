//! # Hardware Collaborators
//!
//! Narrow interfaces to the drivers the control link calls into. Pin
//! driving, ADC framing and screen rendering live behind these traits.
//!
//! This module provides:
//! - Traits for LEDs, servo/ESC outputs, analog inputs and the status display
//! - Simulated drivers that log what they would do
//! - Raspberry Pi drivers (feature `rpi`)

pub mod sim;

#[cfg(feature = "rpi")]
pub mod rpi;

#[cfg(test)]
pub mod mocks;

use crate::error::Result;

/// Digital outputs driving the feedback LEDs.
#[cfg_attr(test, mockall::automock)]
pub trait DigitalOutput: Send {
    /// Configures `pin` as an output.
    fn set_mode(&mut self, pin: u8) -> Result<()>;

    /// Drives `pin` high (`true`) or low (`false`).
    fn write(&mut self, pin: u8, level: bool) -> Result<()>;
}

/// Pulse-width outputs driving servos and speed controllers.
#[cfg_attr(test, mockall::automock)]
pub trait PwmOutput: Send {
    /// Sets the servo pulse width of `pin` in microseconds.
    fn set_pulse_width(&mut self, pin: u8, micros: u32) -> Result<()>;
}

/// Analog inputs sampled as unsigned 16-bit readings.
#[cfg_attr(test, mockall::automock)]
pub trait AnalogInput: Send {
    fn read_channel(&mut self, channel: u8) -> Result<u16>;
}

/// Status screen on the handheld.
#[cfg_attr(test, mockall::automock)]
pub trait Display: Send {
    fn render(&mut self, link_quality: i32, steering: u16, throttle: u16) -> Result<()>;
}

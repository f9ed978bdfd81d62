//! Simulated drivers for running without the Raspberry Pi peripherals.
//!
//! Outputs are logged through `tracing`; inputs return a fixed reading.

use std::collections::HashMap;

use tracing::{debug, info};

use super::{AnalogInput, Display, DigitalOutput, PwmOutput};
use crate::error::Result;
use crate::signal::RAW_CENTER;

/// LEDs that only log level changes.
#[derive(Debug, Default)]
pub struct SimulatedLeds {
    levels: HashMap<u8, bool>,
}

impl SimulatedLeds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DigitalOutput for SimulatedLeds {
    fn set_mode(&mut self, pin: u8) -> Result<()> {
        debug!("LED pin {} set to output", pin);
        self.levels.insert(pin, false);
        Ok(())
    }

    fn write(&mut self, pin: u8, level: bool) -> Result<()> {
        if self.levels.insert(pin, level) != Some(level) {
            debug!("LED pin {} -> {}", pin, if level { "on" } else { "off" });
        }
        Ok(())
    }
}

/// Servo outputs that only log pulse widths.
#[derive(Debug, Default)]
pub struct SimulatedServos;

impl PwmOutput for SimulatedServos {
    fn set_pulse_width(&mut self, pin: u8, micros: u32) -> Result<()> {
        debug!("Servo pin {} pulse width {}us", pin, micros);
        Ok(())
    }
}

/// Analog inputs that always read the same value (centered by default).
#[derive(Debug, Clone)]
pub struct SimulatedInputs {
    value: u16,
}

impl Default for SimulatedInputs {
    fn default() -> Self {
        Self { value: RAW_CENTER }
    }
}

impl SimulatedInputs {
    #[must_use]
    pub fn with_value(value: u16) -> Self {
        Self { value }
    }
}

impl AnalogInput for SimulatedInputs {
    fn read_channel(&mut self, _channel: u8) -> Result<u16> {
        Ok(self.value)
    }
}

/// Status display rendered as a log line.
#[derive(Debug, Default)]
pub struct LogDisplay;

impl Display for LogDisplay {
    fn render(&mut self, link_quality: i32, steering: u16, throttle: u16) -> Result<()> {
        info!("W: {} S: {} M: {}", link_quality, steering, throttle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_inputs_default_to_center() {
        let mut inputs = SimulatedInputs::default();
        assert_eq!(inputs.read_channel(0).unwrap(), RAW_CENTER);
        assert_eq!(inputs.read_channel(7).unwrap(), RAW_CENTER);
    }

    #[test]
    fn test_simulated_inputs_fixed_value() {
        let mut inputs = SimulatedInputs::with_value(1234);
        assert_eq!(inputs.read_channel(1).unwrap(), 1234);
    }

    #[test]
    fn test_simulated_outputs_accept_everything() {
        let mut leds = SimulatedLeds::new();
        assert!(leds.set_mode(5).is_ok());
        assert!(leds.write(5, true).is_ok());
        assert_eq!(leds.levels.get(&5), Some(&true));

        let mut servos = SimulatedServos;
        assert!(servos.set_pulse_width(23, 1450).is_ok());

        let mut display = LogDisplay;
        assert!(display.render(-1, 32768, 0).is_ok());
    }
}

//! Raspberry Pi drivers built on `rppal`.
//!
//! - LEDs and servo outputs on the BCM GPIO header (software PWM at 50Hz)
//! - MCP3008 10-bit ADC on SPI0.0, scaled to the 16-bit channel range

use std::collections::HashMap;
use std::time::Duration;

use rppal::gpio::{Gpio, OutputPin};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use tracing::info;

use super::{AnalogInput, DigitalOutput, PwmOutput};
use crate::error::{LinkError, Result};

/// Servo frame period (50Hz)
const SERVO_PERIOD: Duration = Duration::from_millis(20);

/// MCP3008 clock speed
const ADC_CLOCK_HZ: u32 = 488_000;

/// MCP3008 readings are 10-bit; shift them to the 16-bit channel range.
const ADC_SCALE: u16 = 64;

fn hw<E: std::fmt::Display>(e: E) -> LinkError {
    LinkError::Hardware(e.to_string())
}

/// Output pins acquired on first use.
struct PinBank {
    gpio: Gpio,
    pins: HashMap<u8, OutputPin>,
}

impl PinBank {
    fn new() -> Result<Self> {
        Ok(Self {
            gpio: Gpio::new().map_err(hw)?,
            pins: HashMap::new(),
        })
    }

    fn pin(&mut self, pin: u8) -> Result<&mut OutputPin> {
        if !self.pins.contains_key(&pin) {
            let output = self.gpio.get(pin).map_err(hw)?.into_output();
            info!("GPIO {} initialized as output", pin);
            self.pins.insert(pin, output);
        }
        self.pins
            .get_mut(&pin)
            .ok_or_else(|| LinkError::Hardware(format!("GPIO {} unavailable", pin)))
    }
}

/// Feedback LEDs on GPIO pins.
pub struct RpiLeds {
    bank: PinBank,
}

impl RpiLeds {
    pub fn new() -> Result<Self> {
        Ok(Self {
            bank: PinBank::new()?,
        })
    }
}

impl DigitalOutput for RpiLeds {
    fn set_mode(&mut self, pin: u8) -> Result<()> {
        self.bank.pin(pin).map(|_| ())
    }

    fn write(&mut self, pin: u8, level: bool) -> Result<()> {
        let output = self.bank.pin(pin)?;
        if level {
            output.set_high();
        } else {
            output.set_low();
        }
        Ok(())
    }
}

/// Servo and ESC outputs driven with software PWM.
pub struct RpiServos {
    bank: PinBank,
}

impl RpiServos {
    pub fn new() -> Result<Self> {
        Ok(Self {
            bank: PinBank::new()?,
        })
    }
}

impl PwmOutput for RpiServos {
    fn set_pulse_width(&mut self, pin: u8, micros: u32) -> Result<()> {
        self.bank
            .pin(pin)?
            .set_pwm(SERVO_PERIOD, Duration::from_micros(u64::from(micros)))
            .map_err(hw)
    }
}

/// MCP3008 8-channel ADC.
pub struct Mcp3008 {
    spi: Spi,
}

impl Mcp3008 {
    pub fn new() -> Result<Self> {
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, ADC_CLOCK_HZ, Mode::Mode0).map_err(hw)?;
        info!("MCP3008 ADC initialized on SPI0.0");
        Ok(Self { spi })
    }
}

impl AnalogInput for Mcp3008 {
    fn read_channel(&mut self, channel: u8) -> Result<u16> {
        if channel >= 8 {
            return Err(LinkError::Hardware(format!(
                "ADC channel must be 0-7, got {}",
                channel
            )));
        }

        let tx = [0x01, (0x08 | channel) << 4, 0x00];
        let mut rx = [0u8; 3];
        self.spi.transfer(&mut rx, &tx).map_err(hw)?;

        let value = (u16::from(rx[1] & 0x03) << 8) | u16::from(rx[2]);
        Ok(value * ADC_SCALE)
    }
}

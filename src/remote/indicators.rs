//! # Feedback Indicators
//!
//! The handheld's LED bar: startup sweep, "searching" animation while
//! connecting, and link-quality level once connected.

use std::time::Duration;

use tokio::time::sleep;

use crate::config::IndicatorConfig;
use crate::error::Result;
use crate::hardware::DigitalOutput;
use crate::link::IndicatorScale;

pub struct Indicators {
    outputs: Box<dyn DigitalOutput>,
    pins: Vec<u8>,
    scale: IndicatorScale,
}

impl std::fmt::Debug for Indicators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Indicators")
            .field("pins", &self.pins)
            .field("scale", &self.scale)
            .finish_non_exhaustive()
    }
}

impl Indicators {
    /// Creates the indicator bar and sets every pin to output mode.
    ///
    /// # Errors
    ///
    /// Returns error if a pin cannot be configured.
    pub fn new(
        mut outputs: Box<dyn DigitalOutput>,
        pins: Vec<u8>,
        scale: IndicatorScale,
    ) -> Result<Self> {
        for &pin in &pins {
            outputs.set_mode(pin)?;
        }
        Ok(Self {
            outputs,
            pins,
            scale,
        })
    }

    /// Builds the bar from `[indicators]` configuration.
    ///
    /// # Errors
    ///
    /// Returns error if a pin cannot be configured.
    pub fn from_config(outputs: Box<dyn DigitalOutput>, config: &IndicatorConfig) -> Result<Self> {
        let scale = IndicatorScale::new(config.pins.len(), config.quality_low, config.quality_high);
        Self::new(outputs, config.pins.clone(), scale)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.pins.len()
    }

    /// Sets indicator `index` on or off. Out-of-range indices are ignored.
    ///
    /// # Errors
    ///
    /// Returns error if the output cannot be driven.
    pub fn set(&mut self, index: usize, on: bool) -> Result<()> {
        match self.pins.get(index) {
            Some(&pin) => self.outputs.write(pin, on),
            None => Ok(()),
        }
    }

    /// Lights the first `level` indicators and turns off the rest.
    ///
    /// # Errors
    ///
    /// Returns error if an output cannot be driven.
    pub fn show_level(&mut self, level: usize) -> Result<()> {
        for (i, &pin) in self.pins.iter().enumerate() {
            self.outputs.write(pin, i < level)?;
        }
        Ok(())
    }

    /// Shows `quality` on the bar, returns the number of lit indicators.
    ///
    /// # Errors
    ///
    /// Returns error if an output cannot be driven.
    pub fn show_quality(&mut self, quality: i32) -> Result<usize> {
        let level = self.scale.level(quality);
        self.show_level(level)?;
        Ok(level)
    }

    /// Lights a single indicator that moves one step per connection attempt.
    ///
    /// # Errors
    ///
    /// Returns error if an output cannot be driven.
    pub fn show_searching(&mut self, attempt: u64) -> Result<()> {
        if self.pins.is_empty() {
            return Ok(());
        }
        let lit = (attempt % self.pins.len() as u64) as usize;
        for (i, &pin) in self.pins.iter().enumerate() {
            self.outputs.write(pin, i == lit)?;
        }
        Ok(())
    }

    /// Startup animation: light each indicator in turn, pause, then
    /// extinguish each in turn.
    ///
    /// # Errors
    ///
    /// Returns error if an output cannot be driven.
    pub async fn sweep(&mut self, step: Duration) -> Result<()> {
        for i in 0..self.pins.len() {
            self.set(i, true)?;
            sleep(step).await;
        }
        sleep(step * 2).await;
        for i in 0..self.pins.len() {
            self.set(i, false)?;
            sleep(step).await;
        }
        Ok(())
    }
}

//! # Actuator Bank
//!
//! The vehicle's actuators and the outputs that drive them.
//!
//! The bank is the only owner of actuator state. It conditions incoming
//! control messages, writes the results to every pin of each actuator, and
//! re-arms everything to neutral on demand.

use tracing::{debug, info};

use crate::error::Result;
use crate::hardware::PwmOutput;
use crate::protocol::ControlMessage;
use crate::signal::{Actuator, ActuatorSpec};

pub struct ActuatorBank {
    actuators: Vec<Actuator>,
    outputs: Box<dyn PwmOutput>,
}

impl std::fmt::Debug for ActuatorBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActuatorBank")
            .field("actuators", &self.actuators)
            .finish_non_exhaustive()
    }
}

impl ActuatorBank {
    /// Creates the bank with every actuator at neutral. Nothing is driven yet.
    pub fn new(specs: Vec<ActuatorSpec>, outputs: Box<dyn PwmOutput>) -> Self {
        Self {
            actuators: specs.into_iter().map(Actuator::new).collect(),
            outputs,
        }
    }

    /// Current `(name, value)` of every actuator.
    #[must_use]
    pub fn values(&self) -> Vec<(&str, i32)> {
        self.actuators.iter().map(|a| (a.name(), a.value())).collect()
    }

    #[must_use]
    pub fn value(&self, name: &str) -> Option<i32> {
        self.actuators
            .iter()
            .find(|a| a.name() == name)
            .map(Actuator::value)
    }

    /// Returns every actuator to `mid` and drives the outputs.
    ///
    /// Used at startup and at the end of every session.
    ///
    /// # Errors
    ///
    /// Returns error if an output cannot be driven.
    pub fn rearm(&mut self) -> Result<()> {
        for actuator in &mut self.actuators {
            actuator.rearm();
            drive(self.outputs.as_mut(), actuator)?;
        }
        info!("Actuators re-armed to neutral: {}", self.summary());
        Ok(())
    }

    /// Conditions and drives every actuator from `msg`.
    ///
    /// All channels are checked before anything is driven, so a rejected
    /// message leaves every output untouched.
    ///
    /// # Errors
    ///
    /// - `MissingChannel` if a declared channel is absent
    /// - Hardware errors from the outputs
    pub fn apply(&mut self, msg: &ControlMessage) -> Result<()> {
        let raws = self
            .actuators
            .iter()
            .map(|a| msg.channel(a.name()))
            .collect::<Result<Vec<f64>>>()?;

        for (actuator, raw) in self.actuators.iter_mut().zip(raws) {
            actuator.update(raw);
            drive(self.outputs.as_mut(), actuator)?;
        }

        debug!("{}", self.summary());
        Ok(())
    }

    fn summary(&self) -> String {
        self.actuators
            .iter()
            .map(|a| format!("{}={}", a.name(), a.value()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Writes the actuator's value to all of its pins.
fn drive(outputs: &mut dyn PwmOutput, actuator: &Actuator) -> Result<()> {
    let micros = actuator.value().max(0) as u32;
    for &pin in &actuator.spec().pins {
        outputs.set_pulse_width(pin, micros)?;
    }
    Ok(())
}

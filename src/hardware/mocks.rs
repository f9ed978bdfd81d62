//! Recording fakes for the hardware traits.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use super::{AnalogInput, Display, DigitalOutput, PwmOutput};
use crate::error::{LinkError, Result};

/// Records every pulse width written, shareable across the test and the code under test.
#[derive(Clone, Default)]
pub struct RecordingPwm {
    pub writes: Arc<Mutex<Vec<(u8, u32)>>>,
    pub fail: Arc<Mutex<bool>>,
}

impl RecordingPwm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<(u8, u32)> {
        self.writes.lock().unwrap().clone()
    }

    /// Last pulse width written to `pin`.
    pub fn last(&self, pin: u8) -> Option<u32> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(p, _)| *p == pin)
            .map(|(_, us)| *us)
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

impl PwmOutput for RecordingPwm {
    fn set_pulse_width(&mut self, pin: u8, micros: u32) -> Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(LinkError::Hardware(format!("mock pwm failure on pin {}", pin)));
        }
        self.writes.lock().unwrap().push((pin, micros));
        Ok(())
    }
}

/// Records LED levels.
#[derive(Clone, Default)]
pub struct RecordingLeds {
    pub writes: Arc<Mutex<Vec<(u8, bool)>>>,
    pub modes: Arc<Mutex<Vec<u8>>>,
}

impl RecordingLeds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<(u8, bool)> {
        self.writes.lock().unwrap().clone()
    }

    /// Current level of `pin` (low if never written).
    pub fn level(&self, pin: u8) -> bool {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(p, _)| *p == pin)
            .map(|(_, l)| *l)
            .unwrap_or(false)
    }
}

impl DigitalOutput for RecordingLeds {
    fn set_mode(&mut self, pin: u8) -> Result<()> {
        self.modes.lock().unwrap().push(pin);
        Ok(())
    }

    fn write(&mut self, pin: u8, level: bool) -> Result<()> {
        self.writes.lock().unwrap().push((pin, level));
        Ok(())
    }
}

/// Analog inputs returning queued readings per call, then a fixed fallback.
#[derive(Clone)]
pub struct ScriptedInputs {
    pub queue: Arc<Mutex<VecDeque<u16>>>,
    pub fallback: u16,
    pub fail: bool,
}

impl ScriptedInputs {
    pub fn constant(value: u16) -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            fallback: value,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::constant(0)
        }
    }

    pub fn push(&self, value: u16) {
        self.queue.lock().unwrap().push_back(value);
    }
}

impl AnalogInput for ScriptedInputs {
    fn read_channel(&mut self, channel: u8) -> Result<u16> {
        if self.fail {
            return Err(LinkError::Io(io::Error::new(
                io::ErrorKind::Other,
                format!("mock adc failure on channel {}", channel),
            )));
        }
        Ok(self.queue.lock().unwrap().pop_front().unwrap_or(self.fallback))
    }
}

/// Records every rendered frame.
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    pub frames: Arc<Mutex<Vec<(i32, u16, u16)>>>,
}

impl RecordingDisplay {
    pub fn frames(&self) -> Vec<(i32, u16, u16)> {
        self.frames.lock().unwrap().clone()
    }
}

impl Display for RecordingDisplay {
    fn render(&mut self, link_quality: i32, steering: u16, throttle: u16) -> Result<()> {
        self.frames
            .lock()
            .unwrap()
            .push((link_quality, steering, throttle));
        Ok(())
    }
}

//! # Actuator Conditioning
//!
//! Maps a raw channel reading onto an actuator's travel range.
//!
//! ## Mapping
//!
//! ```text
//! fraction = raw / 65536
//! value    = floor(mid - range/2 + fraction * range)
//! ```
//!
//! If `|value - mid| < deadband` the value is forced to exactly `mid`.
//!
//! Raw values outside `0..=65535` are not clamped: they produce fractions
//! outside `[0, 1)` and therefore values outside the travel range. Results
//! beyond the `i32` range saturate.
//!
//! ## Usage
//!
//! ```
//! use pizlink::signal::actuator::ActuatorSpec;
//!
//! let rudder = ActuatorSpec::new("safran", vec![23, 24], 1450, 600, 30);
//!
//! assert_eq!(rudder.condition(0.0), 1150);     // full travel one way
//! assert_eq!(rudder.condition(32768.0), 1450); // neutral
//! assert!(rudder.condition(65535.0) < 1750);   // never reaches mid + range/2
//! ```

use serde::Deserialize;

use super::RAW_FULL_SCALE;

/// Static description of one actuator output.
///
/// Created once at startup from configuration and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActuatorSpec {
    /// Channel name, also the key in the wire message.
    pub name: String,
    /// Physical output pins driven with the same value.
    pub pins: Vec<u8>,
    /// Neutral command value.
    pub mid: i32,
    /// Full excursion width.
    pub range: i32,
    /// Tolerance around `mid` collapsed to `mid`.
    #[serde(default)]
    pub deadband: i32,
}

impl ActuatorSpec {
    /// Creates a new actuator description.
    #[must_use]
    pub fn new(name: &str, pins: Vec<u8>, mid: i32, range: i32, deadband: i32) -> Self {
        Self {
            name: name.to_string(),
            pins,
            mid,
            range,
            deadband,
        }
    }

    /// Lowest command value (`mid - range/2`).
    #[must_use]
    pub fn min_value(&self) -> f64 {
        self.mid as f64 - self.range as f64 / 2.0
    }

    /// Upper bound of the travel range (`mid + range/2`), never reached.
    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.mid as f64 + self.range as f64 / 2.0
    }

    /// Checks `range > 0`, `0 <= deadband < range/2` and that at least one pin is set.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated invariant.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name.is_empty() {
            return Err("actuator name cannot be empty".to_string());
        }
        if self.pins.is_empty() {
            return Err(format!("actuator '{}' needs at least one pin", self.name));
        }
        if self.range <= 0 {
            return Err(format!("actuator '{}': range must be greater than 0", self.name));
        }
        if self.deadband < 0 {
            return Err(format!("actuator '{}': deadband cannot be negative", self.name));
        }
        if (self.deadband as f64) >= self.range as f64 / 2.0 {
            return Err(format!(
                "actuator '{}': deadband must be less than range/2",
                self.name
            ));
        }
        if self.min_value() < 0.0 {
            return Err(format!(
                "actuator '{}': mid must be at least range/2",
                self.name
            ));
        }
        Ok(())
    }

    /// Conditions a raw channel reading into a command value.
    ///
    /// # Examples
    ///
    /// ```
    /// use pizlink::signal::actuator::ActuatorSpec;
    ///
    /// let motor = ActuatorSpec::new("moteur", vec![25], 1400, 800, 50);
    ///
    /// assert_eq!(motor.condition(0.0), 1000);
    /// // Inside the dead-zone
    /// assert_eq!(motor.condition(33000.0), 1400);
    /// ```
    #[must_use]
    pub fn condition(&self, raw: f64) -> i32 {
        let fraction = raw / RAW_FULL_SCALE;
        let value = (self.min_value() + fraction * f64::from(self.range)).floor();

        if (value - f64::from(self.mid)).abs() < f64::from(self.deadband) {
            self.mid
        } else {
            // Saturating cast
            value as i32
        }
    }
}

/// An actuator and its current command value.
///
/// Owned by the vehicle session; the value starts at `mid` and is
/// recomputed on every accepted control message.
#[derive(Debug, Clone)]
pub struct Actuator {
    spec: ActuatorSpec,
    value: i32,
}

impl Actuator {
    /// Creates an actuator at its neutral value.
    #[must_use]
    pub fn new(spec: ActuatorSpec) -> Self {
        let value = spec.mid;
        Self { spec, value }
    }

    #[must_use]
    pub fn spec(&self) -> &ActuatorSpec {
        &self.spec
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Current command value.
    #[must_use]
    pub fn value(&self) -> i32 {
        self.value
    }

    /// Conditions `raw` and stores the result as the current value.
    pub fn update(&mut self, raw: f64) -> i32 {
        self.value = self.spec.condition(raw);
        self.value
    }

    /// Resets the current value to neutral.
    pub fn rearm(&mut self) -> i32 {
        self.value = self.spec.mid;
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rudder() -> ActuatorSpec {
        ActuatorSpec::new("safran", vec![23, 24], 1450, 600, 30)
    }

    fn motor() -> ActuatorSpec {
        ActuatorSpec::new("moteur", vec![25], 1400, 800, 50)
    }

    // ==================== Mapping Tests ====================

    #[test]
    fn test_raw_zero_is_minimum() {
        assert_eq!(rudder().condition(0.0), 1150);
        assert_eq!(motor().condition(0.0), 1000);
    }

    #[test]
    fn test_raw_max_stays_below_upper_bound() {
        let spec = rudder();
        let value = spec.condition(65535.0);
        assert!((value as f64) < spec.max_value());
        assert_eq!(value, 1749);
    }

    #[test]
    fn test_raw_center_is_mid() {
        assert_eq!(rudder().condition(32768.0), 1450);
        assert_eq!(motor().condition(32768.0), 1400);
    }

    #[test]
    fn test_all_raw_values_within_travel() {
        for spec in [rudder(), motor()] {
            for raw in (0..=65535u32).step_by(97).chain(std::iter::once(65535)) {
                let v = spec.condition(raw as f64) as f64;
                assert!(v >= spec.min_value(), "{} below range for raw {}", v, raw);
                assert!(v < spec.max_value(), "{} above range for raw {}", v, raw);
            }
        }
    }

    #[test]
    fn test_mapping_is_monotonic() {
        let spec = motor();
        let mut previous = spec.condition(0.0);
        for raw in (0..=65535u32).step_by(13) {
            let v = spec.condition(raw as f64);
            assert!(v >= previous, "not monotonic at raw {}", raw);
            previous = v;
        }
    }

    #[test]
    fn test_out_of_range_raw_is_not_clamped() {
        let spec = motor();
        assert!((spec.condition(70000.0) as f64) >= spec.max_value());
        assert!((spec.condition(-1000.0) as f64) < spec.min_value());
    }

    #[test]
    fn test_extreme_raw_saturates() {
        let spec = rudder();
        assert_eq!(spec.condition(-1e20), i32::MIN);
        assert_eq!(spec.condition(1e20), i32::MAX);
        assert_eq!(spec.condition(f64::MAX), i32::MAX);
    }

    // ==================== Dead-zone Tests ====================

    #[test]
    fn test_deadband_collapses_to_mid() {
        let spec = rudder();
        // 600 units over 65536 raw: 30 units is ~3277 raw counts
        for raw in [30000.0, 31000.0, 32768.0, 34000.0, 35000.0] {
            assert_eq!(spec.condition(raw), 1450, "raw {}", raw);
        }
    }

    #[test]
    fn test_deadband_edge_is_kept() {
        let spec = rudder();
        // Exactly deadband away from mid is outside the dead-zone
        assert_eq!(spec.condition(36045.0), 1480);
        assert_eq!(spec.condition(29492.0), 1420);
    }

    #[test]
    fn test_zero_deadband_passes_everything() {
        let spec = ActuatorSpec::new("ecoute_gv", vec![22], 1450, 1000, 0);
        assert_eq!(spec.condition(32834.0), 1451);
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(rudder().validate().is_ok());
        assert!(motor().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_specs() {
        let mut spec = rudder();
        spec.range = 0;
        assert!(spec.validate().is_err());

        let mut spec = rudder();
        spec.deadband = -1;
        assert!(spec.validate().is_err());

        let mut spec = rudder();
        spec.deadband = 300;
        assert!(spec.validate().is_err());

        let mut spec = rudder();
        spec.pins.clear();
        assert!(spec.validate().is_err());

        let mut spec = rudder();
        spec.mid = 100;
        assert!(spec.validate().is_err());
    }

    // ==================== Actuator State Tests ====================

    #[test]
    fn test_actuator_starts_at_mid() {
        let actuator = Actuator::new(motor());
        assert_eq!(actuator.value(), 1400);
        assert_eq!(actuator.name(), "moteur");
    }

    #[test]
    fn test_actuator_update_and_rearm() {
        let mut actuator = Actuator::new(motor());
        assert_eq!(actuator.update(0.0), 1000);
        assert_eq!(actuator.value(), 1000);
        assert_eq!(actuator.rearm(), 1400);
        assert_eq!(actuator.value(), 1400);
    }
}

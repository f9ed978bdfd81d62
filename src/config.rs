//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Both programs read the same file; each uses the sections it needs.
//! Every field has a default, so an empty file is a valid configuration.

use serde::de::Error;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use tracing::warn;

use crate::error::{LinkError, Result};
use crate::protocol::DEFAULT_PORT;
use crate::signal::ActuatorSpec;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub boat: BoatConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub indicators: IndicatorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration
#[derive(Debug, Deserialize, Clone)]
pub struct NetworkConfig {
    /// Vehicle address the handheld connects to
    #[serde(default = "default_host")]
    pub host: String,

    /// Address the vehicle listens on
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Vehicle (controller session) configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BoatConfig {
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    #[serde(default = "default_actuators")]
    pub actuators: Vec<ActuatorSpec>,
}

/// One sampled input channel on the handheld
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Channel name, must match an actuator name on the vehicle
    pub name: String,

    pub adc_channel: u8,

    /// Moving-average window (1 = no smoothing)
    #[serde(default = "default_smoothing")]
    pub smoothing: usize,

    /// ADC channel of a trim dial added to this channel
    #[serde(default)]
    pub trim_adc_channel: Option<u8>,

    /// Full trim excursion in raw units
    #[serde(default)]
    pub trim_span: i32,
}

/// Handheld (remote loop) configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,

    #[serde(default = "default_ack_timeout_ms")]
    pub ack_timeout_ms: u64,

    #[serde(default = "default_cycle_delay_ms")]
    pub cycle_delay_ms: u64,

    #[serde(default = "default_display_refresh_ms")]
    pub display_refresh_ms: u64,

    #[serde(default = "default_status_log_interval_ms")]
    pub status_log_interval_ms: u64,

    #[serde(default = "default_steering_channel")]
    pub steering_channel: String,

    #[serde(default = "default_throttle_channel")]
    pub throttle_channel: String,

    #[serde(default = "default_channels")]
    pub channels: Vec<ChannelConfig>,
}

/// Feedback LED configuration
#[derive(Debug, Deserialize, Clone)]
pub struct IndicatorConfig {
    #[serde(default = "default_indicator_pins")]
    pub pins: Vec<u8>,

    /// Link quality at which no indicator is lit
    #[serde(default = "default_quality_low")]
    pub quality_low: i32,

    /// Link quality at which all indicators are lit
    #[serde(default = "default_quality_high")]
    pub quality_high: i32,

    /// Delay between steps of the startup sweep
    #[serde(default = "default_startup_step_ms")]
    pub startup_step_ms: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for a daily rolling log file (stderr only when unset)
    #[serde(default)]
    pub log_dir: Option<String>,
}

// Default value functions
fn default_host() -> String { "10.250.1.2".to_string() }
fn default_listen_address() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { DEFAULT_PORT }

fn default_idle_timeout_ms() -> u64 { 1000 }
fn default_actuators() -> Vec<ActuatorSpec> {
    vec![
        ActuatorSpec::new("safran", vec![23, 24], 1450, 600, 30),
        ActuatorSpec::new("moteur", vec![25], 1400, 800, 50),
    ]
}

fn default_connect_timeout_ms() -> u64 { 1000 }
fn default_reconnect_interval_ms() -> u64 { 1000 }
fn default_ack_timeout_ms() -> u64 { 2000 }
fn default_cycle_delay_ms() -> u64 { 40 }
fn default_display_refresh_ms() -> u64 { 500 }
fn default_status_log_interval_ms() -> u64 { 1000 }
fn default_steering_channel() -> String { "safran".to_string() }
fn default_throttle_channel() -> String { "moteur".to_string() }
fn default_smoothing() -> usize { 1 }
fn default_channels() -> Vec<ChannelConfig> {
    vec![
        ChannelConfig {
            name: "safran".to_string(),
            adc_channel: 0,
            smoothing: default_smoothing(),
            trim_adc_channel: None,
            trim_span: 0,
        },
        ChannelConfig {
            name: "moteur".to_string(),
            adc_channel: 1,
            smoothing: default_smoothing(),
            trim_adc_channel: None,
            trim_span: 0,
        },
    ]
}

fn default_indicator_pins() -> Vec<u8> { vec![5, 6, 13, 19, 26] }
fn default_quality_low() -> i32 { 30 }
fn default_quality_high() -> i32 { 70 }
fn default_startup_step_ms() -> u64 { 100 }

fn default_log_level() -> String { "info".to_string() }

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            listen_address: default_listen_address(),
            port: default_port(),
        }
    }
}

impl Default for BoatConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: default_idle_timeout_ms(),
            actuators: default_actuators(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
            ack_timeout_ms: default_ack_timeout_ms(),
            cycle_delay_ms: default_cycle_delay_ms(),
            display_refresh_ms: default_display_refresh_ms(),
            status_log_interval_ms: default_status_log_interval_ms(),
            steering_channel: default_steering_channel(),
            throttle_channel: default_throttle_channel(),
            channels: default_channels(),
        }
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            pins: default_indicator_pins(),
            quality_low: default_quality_low(),
            quality_high: default_quality_high(),
            startup_step_ms: default_startup_step_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: None,
        }
    }
}

impl NetworkConfig {
    /// `host:port` the handheld connects to.
    #[must_use]
    pub fn connect_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `listen_address:port` the vehicle binds.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen_address, self.port)
    }
}

impl BoatConfig {
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

impl RemoteConfig {
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    #[must_use]
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    #[must_use]
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }

    #[must_use]
    pub fn cycle_delay(&self) -> Duration {
        Duration::from_millis(self.cycle_delay_ms)
    }

    #[must_use]
    pub fn display_refresh(&self) -> Duration {
        Duration::from_millis(self.display_refresh_ms)
    }

    #[must_use]
    pub fn status_log_interval(&self) -> Duration {
        Duration::from_millis(self.status_log_interval_ms)
    }
}

impl IndicatorConfig {
    /// Delay between steps of the startup sweep.
    #[must_use]
    pub fn startup_step(&self) -> Duration {
        Duration::from_millis(self.startup_step_ms)
    }
}

fn invalid(message: impl std::fmt::Display) -> LinkError {
    LinkError::Config(toml::de::Error::custom(message))
}

fn check_millis(name: &str, value: u64) -> Result<()> {
    if value == 0 || value > 60000 {
        return Err(invalid(format!("{} must be between 1 and 60000", name)));
    }
    Ok(())
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pizlink::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Like [`Config::load`], but a missing file yields the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be parsed or validated.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            let config = Config::default();
            config.validate()?;
            return Ok(config);
        }
        Self::load(path)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.network.host.is_empty() {
            return Err(invalid("network host cannot be empty"));
        }

        if self.network.port == 0 {
            return Err(invalid("network port cannot be 0"));
        }

        check_millis("idle_timeout_ms", self.boat.idle_timeout_ms)?;
        check_millis("connect_timeout_ms", self.remote.connect_timeout_ms)?;
        check_millis("reconnect_interval_ms", self.remote.reconnect_interval_ms)?;
        check_millis("ack_timeout_ms", self.remote.ack_timeout_ms)?;
        check_millis("cycle_delay_ms", self.remote.cycle_delay_ms)?;
        check_millis("display_refresh_ms", self.remote.display_refresh_ms)?;
        check_millis("status_log_interval_ms", self.remote.status_log_interval_ms)?;

        // Actuators
        if self.boat.actuators.is_empty() {
            return Err(invalid("at least one actuator must be configured"));
        }
        let mut names = HashSet::new();
        for actuator in &self.boat.actuators {
            actuator.validate().map_err(invalid)?;
            if !names.insert(actuator.name.as_str()) {
                return Err(invalid(format!("duplicate actuator '{}'", actuator.name)));
            }
        }

        // Remote channels
        if self.remote.channels.is_empty() {
            return Err(invalid("at least one remote channel must be configured"));
        }
        let mut names = HashSet::new();
        for channel in &self.remote.channels {
            if channel.name.is_empty() || channel.name == "ts" {
                return Err(invalid(format!("invalid channel name '{}'", channel.name)));
            }
            if !names.insert(channel.name.as_str()) {
                return Err(invalid(format!("duplicate channel '{}'", channel.name)));
            }
            if channel.smoothing == 0 || channel.smoothing > 100 {
                return Err(invalid(format!(
                    "channel '{}': smoothing must be between 1 and 100",
                    channel.name
                )));
            }
            if channel.trim_span < 0 {
                return Err(invalid(format!(
                    "channel '{}': trim_span cannot be negative",
                    channel.name
                )));
            }
        }

        for (role, name) in [
            ("steering_channel", &self.remote.steering_channel),
            ("throttle_channel", &self.remote.throttle_channel),
        ] {
            if !names.contains(name.as_str()) {
                return Err(invalid(format!(
                    "{} '{}' is not a configured channel",
                    role, name
                )));
            }
        }

        // Indicators
        if self.indicators.pins.is_empty() {
            return Err(invalid("at least one indicator pin must be configured"));
        }

        if self.indicators.quality_high <= self.indicators.quality_low {
            return Err(invalid("quality_high must be greater than quality_low"));
        }

        if self.indicators.startup_step_ms > 10000 {
            return Err(invalid("startup_step_ms must be at most 10000"));
        }

        if self.logging.level.is_empty() {
            return Err(invalid("logging level cannot be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.network.port, 10012);
        assert_eq!(config.boat.actuators.len(), 2);
        assert_eq!(config.remote.channels.len(), 2);
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.network.connect_addr(), "10.250.1.2:10012");
        assert_eq!(config.network.listen_addr(), "0.0.0.0:10012");
        assert_eq!(config.boat.idle_timeout(), Duration::from_secs(1));
        assert_eq!(config.remote.ack_timeout(), Duration::from_secs(2));
        assert_eq!(config.remote.cycle_delay(), Duration::from_millis(40));
        assert_eq!(config.remote.reconnect_interval(), Duration::from_secs(1));
        assert_eq!(config.remote.display_refresh(), Duration::from_millis(500));
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[network]
host = "192.168.1.20"

[boat]
idle_timeout_ms = 1500

[[boat.actuators]]
name = "safran"
pins = [23, 24]
mid = 1450
range = 600
deadband = 30

[[boat.actuators]]
name = "moteur"
pins = [25]
mid = 1400
range = 800
deadband = 50

[[boat.actuators]]
name = "ecoute_gv"
pins = [22]
mid = 1450
range = 1000
deadband = 50

[remote]

[[remote.channels]]
name = "safran"
adc_channel = 0
smoothing = 5
trim_adc_channel = 2
trim_span = 8000

[[remote.channels]]
name = "moteur"
adc_channel = 1
smoothing = 3

[indicators]
pins = [5, 6, 13, 19, 26]

[logging]
level = "debug"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.network.host, "192.168.1.20");
        assert_eq!(config.boat.actuators.len(), 3);
        assert_eq!(config.boat.actuators[2].name, "ecoute_gv");
        assert_eq!(config.remote.channels[0].smoothing, 5);
        assert_eq!(config.remote.channels[0].trim_adc_channel, Some(2));
        assert_eq!(config.remote.channels[1].trim_adc_channel, None);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/pizlink.toml").unwrap();
        assert_eq!(config.network.port, 10012);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        match Config::load("/nonexistent/pizlink.toml") {
            Err(LinkError::Io(_)) => {}
            other => panic!("Expected Io error, got: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Config::from_toml("[network\nport = 1"),
            Err(LinkError::Config(_))
        ));
    }

    #[test]
    fn test_empty_host() {
        let mut config = Config::default();
        config.network.host = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_idle_timeout_bounds() {
        let mut config = Config::default();
        config.boat.idle_timeout_ms = 0;
        assert!(config.validate().is_err());
        config.boat.idle_timeout_ms = 60001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ack_timeout_zero() {
        let mut config = Config::default();
        config.remote.ack_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cycle_delay_too_high() {
        let mut config = Config::default();
        config.remote.cycle_delay_ms = 60001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reconnect_interval_zero() {
        let mut config = Config::default();
        config.remote.reconnect_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_no_actuators() {
        let mut config = Config::default();
        config.boat.actuators.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_actuator() {
        let mut config = Config::default();
        let first = config.boat.actuators[0].clone();
        config.boat.actuators.push(first);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deadband_too_wide() {
        let mut config = Config::default();
        config.boat.actuators[0].deadband = 300;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_range() {
        let mut config = Config::default();
        config.boat.actuators[1].range = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_smoothing_zero() {
        let mut config = Config::default();
        config.remote.channels[0].smoothing = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_channel() {
        let mut config = Config::default();
        config.remote.channels[1].name = "safran".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_channel_named_ts() {
        let mut config = Config::default();
        config.remote.channels[0].name = "ts".to_string();
        config.remote.steering_channel = "ts".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_steering_channel() {
        let mut config = Config::default();
        config.remote.steering_channel = "rudder".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_trim_span() {
        let mut config = Config::default();
        config.remote.channels[0].trim_span = -5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_no_indicator_pins() {
        let mut config = Config::default();
        config.indicators.pins.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_quality_bounds_inverted() {
        let mut config = Config::default();
        config.indicators.quality_low = 70;
        config.indicators.quality_high = 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_host(), "10.250.1.2");
        assert_eq!(default_listen_address(), "0.0.0.0");
        assert_eq!(default_port(), 10012);
        assert_eq!(default_idle_timeout_ms(), 1000);
        assert_eq!(default_connect_timeout_ms(), 1000);
        assert_eq!(default_reconnect_interval_ms(), 1000);
        assert_eq!(default_ack_timeout_ms(), 2000);
        assert_eq!(default_cycle_delay_ms(), 40);
        assert_eq!(default_display_refresh_ms(), 500);
        assert_eq!(default_status_log_interval_ms(), 1000);
        assert_eq!(default_smoothing(), 1);
        assert_eq!(default_indicator_pins(), vec![5, 6, 13, 19, 26]);
        assert_eq!(default_quality_low(), 30);
        assert_eq!(default_quality_high(), 70);
        assert_eq!(default_startup_step_ms(), 100);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let config = Config::from_toml(include_str!("../config/default.toml")).unwrap();
        assert_eq!(config.remote.channels[0].smoothing, 5);
        assert_eq!(config.remote.channels[1].smoothing, 3);
        assert_eq!(config.boat.actuators.len(), 2);
        assert_eq!(config.indicators.startup_step(), Duration::from_millis(100));
    }
}

//! # Vehicle Module
//!
//! Runs on the boat: accepts the handheld's connection, drives the
//! actuators from its control messages and acknowledges each one with
//! timing and link-quality data.

pub mod actuators;
pub mod session;

pub use actuators::ActuatorBank;
pub use session::{SessionEnd, SessionState, VehicleServer};

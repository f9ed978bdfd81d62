//! # Handheld Module
//!
//! Runs on the remote control: samples the sticks, streams control
//! messages to the vehicle, and shows link health on the LED bar and the
//! status display.

pub mod client;
pub mod indicators;
pub mod stats;
pub mod telemetry;

pub use client::{apply_trim, ConnectionState, CycleReport, RemoteLoop};
pub use indicators::Indicators;
pub use stats::LinkCounters;
pub use telemetry::{run_display, Telemetry};

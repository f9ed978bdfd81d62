//! # Link Quality Module
//!
//! Wireless link health: reading the platform counter, tracking it, and
//! turning it into indicator feedback.

pub mod quality;
pub mod wireless;

pub use quality::{IndicatorScale, LinkQualityMonitor, LinkQualityStats, QUALITY_UNAVAILABLE};
pub use wireless::{ProcNetWireless, WirelessQuality};

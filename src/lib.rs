//! # PizLink Library
//!
//! Remote control link for a small radio-controlled boat over WiFi.
//!
//! The handheld samples its sticks, sends one JSON control message per
//! cycle over TCP and waits for the boat's acknowledgement. The boat maps
//! each channel onto its servo and speed controller and answers with
//! timing and wireless link-quality data, which the handheld shows on an
//! LED bar and a small display.

pub mod boat;
pub mod config;
pub mod error;
pub mod hardware;
pub mod link;
pub mod logging;
pub mod protocol;
pub mod remote;
pub mod signal;

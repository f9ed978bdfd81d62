//! # Control Link Protocol
//!
//! Request/acknowledge protocol between the handheld and the vehicle.
//!
//! This module handles:
//! - Control and acknowledgement message types
//! - JSON line encoding with a 4096-byte ceiling
//! - Splitting decode failures into lost-connection and protocol violations
//! - Millisecond wall-clock timestamps

pub mod codec;
pub mod messages;

pub use codec::{decode_ack, decode_control, encode, MAX_MESSAGE_SIZE};
pub use messages::{AckMessage, AckStatus, ControlMessage};

/// Default TCP port of the vehicle.
pub const DEFAULT_PORT: u16 = 10012;

/// Current wall-clock time in milliseconds since the epoch.
#[must_use]
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

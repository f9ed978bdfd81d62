//! # Wire Messages
//!
//! JSON payloads exchanged between the handheld and the vehicle.
//!
//! | Direction | Payload |
//! |-----------|---------|
//! | remote → boat | `{"safran": 32768, "moteur": 0, "ts": 1000}` |
//! | boat → remote | `{"status": "ok", "ts": 1000, "myTs": 1003, "linkQuality": 58}` |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::error::{LinkError, Result};

/// Control message: one raw reading per channel plus the sender timestamp.
///
/// Channel values are kept as JSON numbers so that fractional or
/// out-of-range readings are carried through unchanged.
///
/// # Examples
///
/// ```
/// use pizlink::protocol::messages::ControlMessage;
///
/// let msg = ControlMessage::new(1000)
///     .with_channel("safran", 32768)
///     .with_channel("moteur", 0);
///
/// assert_eq!(msg.channel("safran").unwrap(), 32768.0);
/// assert!(msg.channel("ecoute_gv").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlMessage {
    /// Sender timestamp, milliseconds since the epoch.
    pub ts: i64,
    /// Raw channel readings keyed by channel name.
    #[serde(flatten)]
    pub channels: BTreeMap<String, Number>,
}

impl ControlMessage {
    #[must_use]
    pub fn new(ts: i64) -> Self {
        Self {
            ts,
            channels: BTreeMap::new(),
        }
    }

    /// Adds (or replaces) a channel reading.
    #[must_use]
    pub fn with_channel(mut self, name: &str, raw: u16) -> Self {
        self.set_channel(name, raw);
        self
    }

    pub fn set_channel(&mut self, name: &str, raw: u16) {
        self.channels.insert(name.to_string(), Number::from(raw));
    }

    /// Raw reading for `name`.
    ///
    /// # Errors
    ///
    /// Returns `MissingChannel` if the message has no such channel.
    /// Non-numeric values are already rejected when the message is decoded.
    pub fn channel(&self, name: &str) -> Result<f64> {
        self.channels
            .get(name)
            .and_then(Number::as_f64)
            .ok_or_else(|| LinkError::MissingChannel(name.to_string()))
    }
}

/// Acknowledgement status. Only `"ok"` exists on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    Ok,
}

/// Acknowledgement sent by the vehicle for every accepted control message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckMessage {
    pub status: AckStatus,
    /// Echo of the control message `ts`.
    pub ts: i64,
    /// Vehicle receive time, milliseconds since the epoch.
    pub my_ts: i64,
    /// Vehicle's own link quality, `-1` if unavailable.
    pub link_quality: i32,
}

impl AckMessage {
    #[must_use]
    pub fn ok(ts: i64, my_ts: i64, link_quality: i32) -> Self {
        Self {
            status: AckStatus::Ok,
            ts,
            my_ts,
            link_quality,
        }
    }
}

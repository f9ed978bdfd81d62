//! # Message Codec
//!
//! One JSON object per write, one per read, at most [`MAX_MESSAGE_SIZE`]
//! bytes. Outgoing messages are terminated by a newline; incoming payloads
//! may or may not carry one.

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;
use tracing::debug;

use super::messages::{AckMessage, ControlMessage};
use crate::error::{LinkError, Result};

/// Maximum size of a single message on the wire.
pub const MAX_MESSAGE_SIZE: usize = 4096;

/// Serializes a message as a newline-terminated JSON line.
///
/// # Errors
///
/// Returns `MessageTooLarge` if the encoded line exceeds [`MAX_MESSAGE_SIZE`].
///
/// # Examples
///
/// ```
/// use pizlink::protocol::codec::encode;
/// use pizlink::protocol::messages::AckMessage;
///
/// let line = encode(&AckMessage::ok(1000, 1001, -1)).unwrap();
/// assert!(line.ends_with(b"\n"));
/// ```
pub fn encode<T: Serialize>(message: &T) -> Result<Bytes> {
    let json = serde_json::to_vec(message)?;
    let len = json.len() + 1;
    if len > MAX_MESSAGE_SIZE {
        return Err(LinkError::MessageTooLarge {
            len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut buf = BytesMut::with_capacity(len);
    buf.put_slice(&json);
    buf.put_u8(b'\n');
    Ok(buf.freeze())
}

fn check_size(payload: &[u8]) -> Result<()> {
    if payload.len() > MAX_MESSAGE_SIZE {
        return Err(LinkError::MessageTooLarge {
            len: payload.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    Ok(())
}

/// Decodes a control message received by the vehicle.
///
/// # Errors
///
/// Returns `Malformed` if the payload is not a valid control message.
pub fn decode_control(payload: &[u8]) -> Result<ControlMessage> {
    check_size(payload)?;
    let msg: ControlMessage = serde_json::from_slice(payload)?;
    debug!("Decoded control message ts={} ({} channels)", msg.ts, msg.channels.len());
    Ok(msg)
}

/// Decodes an acknowledgement received by the handheld.
///
/// Invalid JSON is a lost connection (`Malformed`). Valid JSON that is not
/// a well-formed ack breaks the protocol contract (`Protocol`).
///
/// # Errors
///
/// - `Malformed` if the payload is not JSON
/// - `Protocol` if the JSON lacks required ack fields
pub fn decode_ack(payload: &[u8]) -> Result<AckMessage> {
    check_size(payload)?;
    let value: serde_json::Value = serde_json::from_slice(payload)?;
    serde_json::from_value(value)
        .map_err(|e| LinkError::Protocol(format!("invalid acknowledgement: {}", e)))
}

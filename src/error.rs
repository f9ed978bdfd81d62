//! # Error Types
//!
//! Custom error types for the PizBoat control link using `thiserror`.
//!
//! Errors fall in two tiers. Transient errors end the current session or
//! connection and the owner goes back to accepting/connecting. Everything
//! else is fatal and terminates the process after being logged.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for the control link
#[derive(Debug, Error)]
pub enum LinkError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Payload is not valid JSON for the expected message
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Payload exceeds the per-message ceiling
    #[error("Message too large: {len} bytes (max {max})")]
    MessageTooLarge { len: usize, max: usize },

    /// Control message lacks a declared channel
    #[error("Missing channel '{0}' in control message")]
    MissingChannel(String),

    /// No acknowledgement within the ack timeout
    #[error("No acknowledgement received within {0:?}")]
    AckTimeout(Duration),

    /// Peer closed the connection (zero-length read)
    #[error("Peer closed the connection")]
    PeerClosed,

    /// A well-formed message that breaks the protocol contract
    #[error("Protocol violation: {0}")]
    Protocol(String),

    /// Hardware driver failure
    #[error("Hardware error: {0}")]
    Hardware(String),
}

impl LinkError {
    /// Whether this error only ends the current session/connection.
    ///
    /// The recoverable set is closed: any variant or I/O kind not listed
    /// here is fatal.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            LinkError::AckTimeout(_)
            | LinkError::PeerClosed
            | LinkError::Malformed(_)
            | LinkError::MessageTooLarge { .. }
            | LinkError::MissingChannel(_) => true,
            LinkError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::NotConnected
            ),
            LinkError::Config(_) | LinkError::Protocol(_) | LinkError::Hardware(_) => false,
        }
    }
}

/// Result type alias for the control link
pub type Result<T> = std::result::Result<T, LinkError>;

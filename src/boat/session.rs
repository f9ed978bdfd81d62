//! # Controller Session
//!
//! Vehicle-side server: one client at a time, one acknowledgement per
//! control message.
//!
//! ## State Machine
//!
//! ```text
//!            re-arm            accept
//!   ┌──────────────────► WaitingForClient ──────► Active
//!   │                                               │
//!   └───────────────────────────────────────────────┘
//!       idle timeout / peer closed / malformed / reset
//! ```
//!
//! Every session end re-arms all actuators to neutral before the next
//! client is accepted. Only fatal errors leave the loop, and they re-arm too.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use super::actuators::ActuatorBank;
use crate::error::Result;
use crate::link::LinkQualityMonitor;
use crate::protocol::{decode_control, encode, now_ms, AckMessage, MAX_MESSAGE_SIZE};

/// Pause after a failed `accept` before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(500);

/// Server state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    WaitingForClient,
    Active,
}

/// Normal ways for a session to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// No data within the idle timeout
    IdleTimeout,
    /// Zero-length read
    PeerClosed,
}

/// Accepts handheld connections and drives the actuators from them.
#[derive(Debug)]
pub struct VehicleServer {
    listener: TcpListener,
    bank: ActuatorBank,
    monitor: LinkQualityMonitor,
    idle_timeout: Duration,
    state: SessionState,
    sessions: u64,
}

impl VehicleServer {
    /// Binds the listening socket.
    ///
    /// # Errors
    ///
    /// Returns error if the address cannot be bound.
    pub async fn bind(
        addr: &str,
        bank: ActuatorBank,
        monitor: LinkQualityMonitor,
        idle_timeout: Duration,
    ) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            bank,
            monitor,
            idle_timeout,
            state: SessionState::WaitingForClient,
            sessions: 0,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn bank(&self) -> &ActuatorBank {
        &self.bank
    }

    /// Number of sessions accepted so far.
    #[must_use]
    pub fn sessions(&self) -> u64 {
        self.sessions
    }

    /// Serves clients forever.
    ///
    /// # Errors
    ///
    /// Returns only on a fatal error, after re-arming the actuators.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.accept_and_serve().await?;
        }
    }

    /// Re-arms, waits for one client and serves it until the session ends.
    ///
    /// # Errors
    ///
    /// Returns error if re-arming fails or the session hits a fatal error.
    pub async fn accept_and_serve(&mut self) -> Result<()> {
        self.bank.rearm()?;
        self.state = SessionState::WaitingForClient;
        info!("Waiting for connection...");

        let listener = &self.listener;
        let (stream, peer) = retry_accept(move || listener.accept(), ACCEPT_BACKOFF).await;

        self.state = SessionState::Active;
        self.sessions += 1;
        info!("Client connected from {} (session {})", peer, self.sessions);

        let outcome = self.serve_session(stream).await;
        self.state = SessionState::WaitingForClient;
        let rearmed = self.bank.rearm();

        match outcome {
            Ok(end) => info!("Session with {} ended: {:?}", peer, end),
            Err(e) if e.is_transient() => warn!("Session with {} lost: {}", peer, e),
            Err(e) => {
                error!("Fatal error in session with {}: {}", peer, e);
                if let Err(re) = rearmed {
                    error!("Failed to re-arm actuators: {}", re);
                }
                return Err(e);
            }
        }

        rearmed
    }

    /// Runs the request/acknowledge loop on one connection.
    async fn serve_session(&mut self, mut stream: TcpStream) -> Result<SessionEnd> {
        let mut buf = BytesMut::with_capacity(MAX_MESSAGE_SIZE);

        loop {
            buf.clear();
            let read = match timeout(self.idle_timeout, stream.read_buf(&mut buf)).await {
                Ok(read) => read?,
                Err(_) => {
                    info!("No data for {:?}", self.idle_timeout);
                    return Ok(SessionEnd::IdleTimeout);
                }
            };

            if read == 0 {
                return Ok(SessionEnd::PeerClosed);
            }

            let received_at = now_ms();
            let msg = decode_control(&buf)?;
            self.bank.apply(&msg)?;

            let quality = self.monitor.sample();
            self.monitor.update_stats(quality);

            let ack = AckMessage::ok(msg.ts, received_at, quality);
            stream.write_all(&encode(&ack)?).await?;
            debug!("Acked ts={} linkQuality={}", msg.ts, quality);
        }
    }
}

/// Calls `accept` until it succeeds, pausing `backoff` after each failure.
async fn retry_accept<T, F, Fut>(mut accept: F, backoff: Duration) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<T>>,
{
    loop {
        match accept().await {
            Ok(accepted) => return accepted,
            Err(e) => {
                warn!("Failed to accept connection: {}, retrying in {:?}", e, backoff);
                sleep(backoff).await;
            }
        }
    }
}

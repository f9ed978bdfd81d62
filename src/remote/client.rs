//! # Remote Loop
//!
//! Handheld side of the link: sample the sticks, send one control message,
//! wait for its acknowledgement, show link quality, repeat.
//!
//! ## Connection State Machine
//!
//! ```text
//!                  attempt                 connected
//!   Disconnected ───────────► Connecting ────────────► Connected
//!        ▲                    │      ▲                     │
//!        │                    └──────┘                     │
//!        │              refused / timeout                  │
//!        │              (wait, retry forever)              │
//!        └─────────────────────────────────────────────────┘
//!          ack timeout / reset / peer closed / garbled ack
//! ```
//!
//! A malformed acknowledgement counts as a lost connection. An
//! acknowledgement that parses but lacks required fields, or any other
//! unexpected failure, stops the loop.

use std::time::Instant;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use super::indicators::Indicators;
use super::stats::LinkCounters;
use super::telemetry::Telemetry;
use crate::config::{ChannelConfig, Config, RemoteConfig};
use crate::error::{LinkError, Result};
use crate::hardware::AnalogInput;
use crate::link::LinkQualityStats;
use crate::protocol::{decode_ack, encode, now_ms, ControlMessage, MAX_MESSAGE_SIZE};
use crate::signal::{SmoothingBuffer, RAW_CENTER};

/// Handheld connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Timing and quality of one completed exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// `sent_ts - ack.ts`
    pub lag_ms: i64,
    /// Time from send to acknowledgement
    pub send_time_ms: i64,
    pub link_quality: i32,
    /// Indicators lit for `link_quality`
    pub level: usize,
}

/// Adds the trim offset to a raw reading.
///
/// The trim input is centered on 32768 and scaled so that its full travel
/// shifts the reading by `span`. The result saturates to `0..=65535`.
#[must_use]
pub fn apply_trim(raw: u16, trim_raw: u16, span: i32) -> u16 {
    let offset = (i64::from(trim_raw) - i64::from(RAW_CENTER)) * i64::from(span) / 65536;
    (i64::from(raw) + offset).clamp(0, i64::from(u16::MAX)) as u16
}

/// One stick axis: its analog input, optional trim, and smoothing.
#[derive(Debug, Clone)]
struct InputChannel {
    config: ChannelConfig,
    buffer: SmoothingBuffer,
}

impl InputChannel {
    fn new(config: ChannelConfig) -> Self {
        let buffer = SmoothingBuffer::new(config.smoothing);
        Self { config, buffer }
    }

    fn sample(&mut self, inputs: &mut dyn AnalogInput) -> Result<u16> {
        let mut raw = inputs.read_channel(self.config.adc_channel)?;
        if let Some(trim_channel) = self.config.trim_adc_channel {
            let trim = inputs.read_channel(trim_channel)?;
            raw = apply_trim(raw, trim, self.config.trim_span);
        }
        self.buffer.add(raw);
        Ok(self.buffer.average_raw())
    }
}

/// Drives the handheld's side of the control link.
pub struct RemoteLoop {
    config: RemoteConfig,
    addr: String,
    inputs: Box<dyn AnalogInput>,
    indicators: Indicators,
    channels: Vec<InputChannel>,
    telemetry: watch::Sender<Telemetry>,
    stats: LinkQualityStats,
    counters: LinkCounters,
    state: ConnectionState,
    attempts: u64,
}

impl std::fmt::Debug for RemoteLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteLoop")
            .field("addr", &self.addr)
            .field("state", &self.state)
            .field("attempts", &self.attempts)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl RemoteLoop {
    pub fn new(
        config: &Config,
        inputs: Box<dyn AnalogInput>,
        indicators: Indicators,
        telemetry: watch::Sender<Telemetry>,
    ) -> Self {
        let channels = config
            .remote
            .channels
            .iter()
            .cloned()
            .map(InputChannel::new)
            .collect();

        Self {
            config: config.remote.clone(),
            addr: config.network.connect_addr(),
            inputs,
            indicators,
            channels,
            telemetry,
            stats: LinkQualityStats::default(),
            counters: LinkCounters::new(),
            state: ConnectionState::Disconnected,
            attempts: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Failed attempts in the current connecting phase.
    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    #[must_use]
    pub fn stats(&self) -> LinkQualityStats {
        self.stats
    }

    #[must_use]
    pub fn counters(&self) -> &LinkCounters {
        &self.counters
    }

    /// Runs the link forever, reconnecting whenever the connection is lost.
    ///
    /// # Errors
    ///
    /// Returns only on a fatal error.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let mut stream = self.connect().await?;
            self.indicators.set(0, true)?;

            loop {
                match self.cycle(&mut stream).await {
                    Ok(_) => sleep(self.config.cycle_delay()).await,
                    Err(e) if e.is_transient() => {
                        warn!("Connection lost: {}", e);
                        self.state = ConnectionState::Disconnected;
                        break;
                    }
                    Err(e) => {
                        error!("Unexpected error: {}", e);
                        self.state = ConnectionState::Disconnected;
                        return Err(e);
                    }
                }
            }
        }
    }

    /// Connects to the vehicle, retrying without limit.
    ///
    /// # Errors
    ///
    /// Returns error only if the indicators cannot be driven.
    pub async fn connect(&mut self) -> Result<TcpStream> {
        self.attempts = 0;

        loop {
            self.state = ConnectionState::Connecting;
            self.indicators.show_searching(self.attempts)?;
            info!(
                "Uptime {}s, connecting to {} (attempt {})",
                self.counters.uptime().as_secs(),
                self.addr,
                self.attempts + 1
            );

            let started = Instant::now();
            match timeout(self.config.connect_timeout(), TcpStream::connect(&self.addr)).await {
                Ok(Ok(stream)) => {
                    if let Err(e) = stream.set_nodelay(true) {
                        debug!("Could not set TCP_NODELAY: {}", e);
                    }
                    self.state = ConnectionState::Connected;
                    self.counters.connects += 1;
                    info!(
                        "Connected to {} in {}ms (connection {})",
                        self.addr,
                        started.elapsed().as_millis(),
                        self.counters.connects
                    );
                    return Ok(stream);
                }
                Ok(Err(e)) => warn!("Could not connect to {}: {}", self.addr, e),
                Err(_) => warn!(
                    "Connecting to {} timed out after {:?}",
                    self.addr,
                    self.config.connect_timeout()
                ),
            }

            self.attempts += 1;
            sleep(self.config.reconnect_interval()).await;
        }
    }

    /// Sends one control message and waits for its acknowledgement.
    ///
    /// # Errors
    ///
    /// Transient errors mean the connection is lost; anything else is fatal.
    pub async fn cycle(&mut self, stream: &mut TcpStream) -> Result<CycleReport> {
        let values = self.sample_channels()?;

        let sent_at = now_ms();
        let mut msg = ControlMessage::new(sent_at);
        for (name, value) in &values {
            msg.set_channel(name, *value);
        }

        self.indicators.set(0, true)?;
        stream.write_all(&encode(&msg)?).await?;
        self.counters.packets += 1;
        self.indicators.set(0, false)?;

        let mut buf = BytesMut::with_capacity(MAX_MESSAGE_SIZE);
        let read = match timeout(self.config.ack_timeout(), stream.read_buf(&mut buf)).await {
            Ok(read) => read?,
            Err(_) => return Err(LinkError::AckTimeout(self.config.ack_timeout())),
        };
        if read == 0 {
            return Err(LinkError::PeerClosed);
        }

        let ack = decode_ack(&buf)?;
        let report = CycleReport {
            lag_ms: sent_at - ack.ts,
            send_time_ms: now_ms() - sent_at,
            link_quality: ack.link_quality,
            level: 0,
        };
        debug!(
            "Ack ts={} lag={}ms send={}ms linkQuality={}",
            ack.ts, report.lag_ms, report.send_time_ms, ack.link_quality
        );

        self.stats.update(ack.link_quality);
        let level = self.indicators.show_quality(ack.link_quality)?;
        self.publish(&values, ack.link_quality);

        if self.counters.report_due(self.config.status_log_interval()) {
            self.log_status(&values, &report);
        }

        Ok(CycleReport { level, ..report })
    }

    /// Reads every configured channel through trim and smoothing.
    fn sample_channels(&mut self) -> Result<Vec<(String, u16)>> {
        let inputs = self.inputs.as_mut();
        self.channels
            .iter_mut()
            .map(|channel| {
                let value = channel.sample(&mut *inputs)?;
                Ok((channel.config.name.clone(), value))
            })
            .collect()
    }

    fn publish(&self, values: &[(String, u16)], link_quality: i32) {
        let lookup = |wanted: &str| {
            values
                .iter()
                .find(|(name, _)| name == wanted)
                .map_or(0, |(_, value)| *value)
        };
        self.telemetry.send_replace(Telemetry {
            steering: lookup(&self.config.steering_channel),
            throttle: lookup(&self.config.throttle_channel),
            link_quality,
        });
    }

    fn log_status(&self, values: &[(String, u16)], report: &CycleReport) {
        let channels = values
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join(" ");
        info!(
            "Uptime {}s | {} | conn {} | {:.1} msg/s | lag {}ms | send {}ms | quality {} [{}-{}]",
            self.counters.uptime().as_secs(),
            channels,
            self.counters.connects,
            self.counters.message_rate(),
            report.lag_ms,
            report.send_time_ms,
            report.link_quality,
            self.stats.min,
            self.stats.max
        );
    }
}

//! # Telemetry Snapshot
//!
//! Latest channel values and link quality, published by the remote loop
//! over a `watch` channel and rendered periodically by the display task.
//! The channel is the only state shared between the two tasks.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::interval;
use tracing::{info, warn};

use crate::hardware::Display;
use crate::link::QUALITY_UNAVAILABLE;

/// What the status display shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Telemetry {
    pub steering: u16,
    pub throttle: u16,
    pub link_quality: i32,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self {
            steering: 0,
            throttle: 0,
            link_quality: QUALITY_UNAVAILABLE,
        }
    }
}

/// Creates the snapshot channel, starting from an empty snapshot.
#[must_use]
pub fn channel() -> (watch::Sender<Telemetry>, watch::Receiver<Telemetry>) {
    watch::channel(Telemetry::default())
}

/// Renders the latest snapshot every `period` until the sender is dropped.
///
/// Render failures are logged and the next refresh tries again.
pub async fn run_display(
    mut snapshots: watch::Receiver<Telemetry>,
    mut display: Box<dyn Display>,
    period: Duration,
) {
    let mut ticker = interval(period);

    loop {
        ticker.tick().await;

        let snapshot = *snapshots.borrow_and_update();
        let rendered =
            display.render(snapshot.link_quality, snapshot.steering, snapshot.throttle);
        if let Err(e) = rendered {
            warn!("Display refresh failed: {}", e);
        }

        if snapshots.has_changed().is_err() {
            info!("Telemetry source closed, stopping display");
            return;
        }
    }
}

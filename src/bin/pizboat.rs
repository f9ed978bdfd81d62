//! # PizBoat
//!
//! Vehicle side of the control link: listens for the handheld, drives the
//! rudder and motor from its control messages and acknowledges each one.
//!
//! ```bash
//! pizboat config/default.toml
//! ```

use anyhow::{Context, Result};
use tracing::info;

use pizlink::boat::{ActuatorBank, VehicleServer};
use pizlink::config::Config;
use pizlink::hardware::PwmOutput;
use pizlink::link::{LinkQualityMonitor, ProcNetWireless};
use pizlink::logging;

const DEFAULT_CONFIG: &str = "config/default.toml";

#[cfg(feature = "rpi")]
fn outputs() -> Result<Box<dyn PwmOutput>> {
    Ok(Box::new(pizlink::hardware::rpi::RpiServos::new()?))
}

#[cfg(not(feature = "rpi"))]
fn outputs() -> Result<Box<dyn PwmOutput>> {
    Ok(Box::new(pizlink::hardware::sim::SimulatedServos))
}

#[tokio::main]
async fn main() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config = Config::load_or_default(&path).with_context(|| format!("loading {}", path))?;
    let _guard = logging::init(&config.logging, "pizboat");

    info!("PizBoat v{} starting...", env!("CARGO_PKG_VERSION"));

    let bank = ActuatorBank::new(config.boat.actuators.clone(), outputs()?);
    let monitor = LinkQualityMonitor::new(Box::new(ProcNetWireless::default()));
    let mut server = VehicleServer::bind(
        &config.network.listen_addr(),
        bank,
        monitor,
        config.boat.idle_timeout(),
    )
    .await
    .context("binding control port")?;

    info!("Press Ctrl+C to exit");

    tokio::select! {
        result = server.run() => {
            result.context("vehicle server stopped")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            info!("Sessions served: {}", server.sessions());
        }
    }

    Ok(())
}

//! # PizRemote
//!
//! Handheld side of the control link: reads the sticks, streams control
//! messages to the boat and shows link quality on the LED bar and display.
//!
//! ```bash
//! pizremote config/default.toml
//! ```

use anyhow::{Context, Result};
use tracing::info;

use pizlink::config::Config;
use pizlink::hardware::{AnalogInput, DigitalOutput, Display};
use pizlink::logging;
use pizlink::remote::{run_display, telemetry, Indicators, RemoteLoop};

const DEFAULT_CONFIG: &str = "config/default.toml";

#[cfg(feature = "rpi")]
fn drivers() -> Result<(Box<dyn DigitalOutput>, Box<dyn AnalogInput>, Box<dyn Display>)> {
    use pizlink::hardware::{rpi, sim};
    Ok((
        Box::new(rpi::RpiLeds::new()?),
        Box::new(rpi::Mcp3008::new()?),
        Box::new(sim::LogDisplay),
    ))
}

#[cfg(not(feature = "rpi"))]
fn drivers() -> Result<(Box<dyn DigitalOutput>, Box<dyn AnalogInput>, Box<dyn Display>)> {
    use pizlink::hardware::sim;
    Ok((
        Box::new(sim::SimulatedLeds::new()),
        Box::new(sim::SimulatedInputs::default()),
        Box::new(sim::LogDisplay),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config = Config::load_or_default(&path).with_context(|| format!("loading {}", path))?;
    let _guard = logging::init(&config.logging, "pizremote");

    info!("PizRemote v{} starting...", env!("CARGO_PKG_VERSION"));

    let (leds, inputs, display) = drivers()?;
    let mut indicators = Indicators::from_config(leds, &config.indicators)?;
    indicators.sweep(config.indicators.startup_step()).await?;

    let (snapshots, receiver) = telemetry::channel();
    let display_task = tokio::spawn(run_display(
        receiver,
        display,
        config.remote.display_refresh(),
    ));

    let mut remote = RemoteLoop::new(&config, inputs, indicators, snapshots);
    info!("Press Ctrl+C to exit");

    let outcome = tokio::select! {
        result = remote.run() => result.context("control link stopped"),
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            info!(
                "Messages sent: {}, connections: {}",
                remote.counters().packets,
                remote.counters().connects
            );
            Ok(())
        }
    };

    drop(remote);
    let _ = display_task.await;
    outcome
}

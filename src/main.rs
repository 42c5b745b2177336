//! LightSwarm daemon entry point.

use std::net::Ipv4Addr;
use std::time::Duration;

use log::{error, info};
use tokio::signal;
use tokio::time::Instant;

mod config;
mod device;
mod driver;
mod error;
mod roster;
mod swarm;
mod types;
mod wire;

use config::Config;
use device::{AmbientSensor, FileIndicator, FileSensor, FixedSensor, Indicator, LogIndicator, UdpTransport};
use swarm::Swarm;
use types::Millis;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Load configuration
    let cfg = Config::load()?;
    info!(
        "LightSwarm {} (protocol v{})",
        env!("CARGO_PKG_VERSION"),
        wire::PROTOCOL_VERSION
    );
    info!("Starting with config: {:?}", cfg);

    let identity = device::self_address(cfg.address)?;
    let started = Instant::now();
    let clock = move || started.elapsed().as_millis() as Millis;

    let shutdown = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down..."),
            Err(err) => error!("Unable to listen for shutdown signal: {}", err),
        }
    };

    let swarm = driver::run(
        |now| build_swarm(&cfg, identity, now),
        clock,
        Duration::from_millis(cfg.poll_interval_ms),
        shutdown,
    )
    .await?;

    info!(
        "Shutdown complete ({} devices known).",
        swarm.roster().len()
    );
    Ok(())
}

async fn build_swarm(cfg: &Config, identity: Ipv4Addr, now: Millis) -> anyhow::Result<Swarm> {
    let transport = UdpTransport::bind(cfg.port, identity).await?;

    let sensor: Box<dyn AmbientSensor> = match &cfg.sensor_path {
        Some(path) => Box::new(FileSensor::new(path)),
        None => Box::new(FixedSensor::new(cfg.channels())),
    };
    let indicator: Box<dyn Indicator> = match &cfg.indicator_path {
        Some(path) => Box::new(FileIndicator::new(path, cfg.indicator_active_low)),
        None => Box::new(LogIndicator::default()),
    };

    Ok(Swarm::new(
        identity,
        cfg,
        Box::new(transport),
        sensor,
        indicator,
        now,
    )?)
}

//! Discover command - find X-Plane on the local network.

use std::time::Duration;

use clap::Args;
use tracing::info;
use xgps::xplane::{BeaconInfo, DiscoveryClient};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Timeout of each round in a sweep.
const SWEEP_ROUND: Duration = Duration::from_secs(1);

#[derive(Debug, Args)]
pub struct DiscoverArgs {
    /// Seconds to listen (default: simulator.discovery_timeout)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// List every instance heard instead of waiting for the master
    #[arg(long)]
    pub sweep: bool,
}

pub async fn run(runner: &CliRunner, args: DiscoverArgs) -> Result<(), CliError> {
    runner.log_startup("discover");
    let timeout = args
        .timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| runner.config().simulator.discovery_timeout());

    if args.sweep {
        return sweep(timeout).await;
    }

    let beacon = find_simulator(timeout).await?;
    println!("{}", beacon.details());
    println!("Address: {}", beacon.endpoint());
    Ok(())
}

/// Wait for the master instance.
pub async fn find_simulator(timeout: Duration) -> Result<BeaconInfo, CliError> {
    println!("Searching for X-Plane ({}s)...", timeout.as_secs());
    let client = DiscoveryClient::bind()?;
    client.discover(timeout).await?.ok_or(CliError::NoSimulator)
}

async fn sweep(total: Duration) -> Result<(), CliError> {
    println!("Listening for X-Plane instances ({}s)...", total.as_secs());
    let client = DiscoveryClient::bind()?;
    let instances = client.sweep(total, SWEEP_ROUND).await;
    info!(count = instances.len(), "Sweep finished");

    if instances.is_empty() {
        println!("No X-Plane instances found");
        return Ok(());
    }
    for id in instances.list() {
        println!("  {}", id);
    }
    Ok(())
}

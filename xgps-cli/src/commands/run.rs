//! Run command - stream simulator positions to the serial device.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use xgps::nmea::Precision;
use xgps::pipeline::{OutputTarget, Pipeline};
use xgps::status::Status;

use super::discover::find_simulator;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Heartbeats are only shown after this long without any other message.
const HEARTBEAT_QUIET_PERIOD: Duration = Duration::from_secs(20);

#[derive(Debug, Args)]
pub struct RunArgs {
    /// X-Plane address as ip:port (skips discovery)
    #[arg(long)]
    pub address: Option<SocketAddr>,

    /// Serial device, e.g. /dev/ttyUSB0 or COM3
    #[arg(long)]
    pub port: Option<String>,

    /// Serial baud rate
    #[arg(long)]
    pub baud: Option<u32>,

    /// Position records per second (1-60)
    #[arg(long)]
    pub frequency: Option<u32>,

    /// Sentence precision: standard or enhanced
    #[arg(long)]
    pub precision: Option<Precision>,

    /// Log sentences instead of writing them to the serial device
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(runner: &CliRunner, args: RunArgs) -> Result<(), CliError> {
    runner.log_startup("run");
    let config = runner.config();
    let pipeline = Pipeline::new(config.to_app_config());

    if let Some(port) = &args.port {
        pipeline.set_serial_port(port);
    }
    if let Some(baud) = args.baud {
        pipeline.set_baud_rate(baud);
    }
    if let Some(frequency) = args.frequency {
        pipeline.set_frequency(frequency)?;
    }
    if let Some(precision) = args.precision {
        pipeline.set_precision(precision);
    }
    if args.dry_run {
        pipeline.set_output(OutputTarget::Log);
    }

    if let Some(address) = args.address {
        pipeline.set_endpoint(Some(address));
    }
    if pipeline.endpoint().is_none() {
        let beacon = find_simulator(config.simulator.discovery_timeout()).await?;
        println!("Found {}", beacon);
        pipeline.set_endpoint(Some(beacon.endpoint()));
    }

    // Set up signal handler for graceful shutdown
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    ctrlc::set_handler(move || {
        info!("Interrupted, stopping");
        println!("\nStopping...");
        signal_cancel.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let mut statuses = pipeline.run(cancel.clone())?;

    let app = pipeline.config();
    println!(
        "Streaming from {} at {} Hz to {}",
        app.endpoint.map(|e| e.to_string()).unwrap_or_default(),
        app.frequency,
        match &app.output {
            OutputTarget::Serial(params) => params.to_string(),
            OutputTarget::Log => "log".to_string(),
        }
    );
    println!("Press Ctrl+C to stop");

    let mut display = StatusDisplay::new(Instant::now());
    let mut fatal = None;

    while let Some(status) = statuses.recv().await {
        if let Status::Fatal(reason) = &status {
            warn!(reason = %reason, "Output failed, stopping");
            fatal.get_or_insert_with(|| reason.clone());
            cancel.cancel();
        }
        if let Some(line) = display.render(&status, Instant::now()) {
            println!("{}", line);
        }
    }

    info!(state = %pipeline.state(), "Run finished");
    match fatal {
        Some(reason) => Err(CliError::Fatal(reason)),
        None => Ok(()),
    }
}

/// Decides which status events are worth printing.
///
/// Every event except a heartbeat is shown. A heartbeat is shown only when
/// nothing has been printed for [`HEARTBEAT_QUIET_PERIOD`], so a healthy
/// stream prints a "Receiving positions" line every 20 seconds at most.
#[derive(Debug)]
pub(crate) struct StatusDisplay {
    last_shown: Instant,
}

impl StatusDisplay {
    pub(crate) fn new(now: Instant) -> Self {
        Self { last_shown: now }
    }

    pub(crate) fn render(&mut self, status: &Status, now: Instant) -> Option<String> {
        let line = match status {
            Status::Heartbeat => {
                if now.saturating_duration_since(self.last_shown) < HEARTBEAT_QUIET_PERIOD {
                    return None;
                }
                "Receiving positions".to_string()
            }
            Status::Timeout => "No data from X-Plane".to_string(),
            other => other.to_string(),
        };
        self.last_shown = now;
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heartbeat_hidden_during_quiet_period() {
        let start = Instant::now();
        let mut display = StatusDisplay::new(start);

        assert_eq!(display.render(&Status::Heartbeat, start), None);
        assert_eq!(
            display.render(&Status::Heartbeat, start + Duration::from_secs(19)),
            None
        );
        assert_eq!(
            display.render(&Status::Heartbeat, start + Duration::from_secs(20)),
            Some("Receiving positions".to_string())
        );
        assert_eq!(
            display.render(&Status::Heartbeat, start + Duration::from_secs(21)),
            None
        );
    }

    #[test]
    fn test_other_messages_always_shown_and_reset_quiet_period() {
        let start = Instant::now();
        let mut display = StatusDisplay::new(start);

        assert_eq!(
            display.render(&Status::info("subscribed"), start + Duration::from_secs(1)),
            Some("subscribed".to_string())
        );
        assert_eq!(
            display.render(&Status::Timeout, start + Duration::from_secs(2)),
            Some("No data from X-Plane".to_string())
        );
        assert_eq!(
            display.render(&Status::Heartbeat, start + Duration::from_secs(21)),
            None
        );
        assert!(display
            .render(&Status::Heartbeat, start + Duration::from_secs(22))
            .is_some());
    }

    #[test]
    fn test_fatal_shown() {
        let start = Instant::now();
        let mut display = StatusDisplay::new(start);
        let line = display.render(&Status::Fatal("port gone".into()), start);
        assert_eq!(line, Some("Fatal: port gone".to_string()));
    }
}

//! xgps - X-Plane to serial GPS bridge
//!
//! Discovers a running X-Plane instance on the local network, subscribes to
//! its RPOS position telemetry over UDP, renders every sample as NMEA 0183
//! sentences and writes them to a serial device that emulates a GPS receiver.
//!
//! # Architecture
//!
//! ```text
//! DiscoveryClient ──► simulator endpoint ──► Pipeline
//!                                               │
//!        ┌──────────────────────────────────────┴───────────────┐
//!        ▼                                                      ▼
//! TelemetrySource ── mpsc<TelemetrySample> ──► OutputSink ──► device bytes
//!        │                                          │
//!        └────────────── Status ──────► StatusStream ◄──────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use tokio_util::sync::CancellationToken;
//! use xgps::pipeline::{AppConfig, Pipeline};
//! use xgps::xplane::DiscoveryClient;
//!
//! let discovery = DiscoveryClient::bind()?;
//! if let Some(beacon) = discovery.discover(Duration::from_secs(5)).await? {
//!     let pipeline = Pipeline::new(AppConfig::default());
//!     pipeline.set_endpoint(Some(beacon.endpoint()));
//!     pipeline.set_serial_port("/dev/ttyUSB0");
//!
//!     let cancel = CancellationToken::new();
//!     let mut status = pipeline.run(cancel.clone())?;
//!     while let Some(event) = status.recv().await {
//!         if event.is_fatal() {
//!             cancel.cancel();
//!         }
//!     }
//! }
//! ```

pub mod config;
pub mod log;
pub mod logging;
pub mod nmea;
pub mod output;
pub mod pipeline;
pub mod status;
pub mod xplane;

/// Version of the xgps library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

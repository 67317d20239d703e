//! Run orchestration.
//!
//! A [`Pipeline`] holds the runtime configuration (simulator endpoint,
//! output target, poll frequency, precision) and starts runs. Each run
//! spawns a [`TelemetrySource`](crate::xplane::TelemetrySource) task and an
//! [`OutputSink`](crate::output::OutputSink) worker joined by one sample
//! channel, and hands the caller a single merged
//! [`StatusStream`](crate::status::StatusStream).
//!
//! ```text
//! Incomplete ──configure──► Runable ──run──► Running
//!     ▲                        ▲                │
//!     └──────unconfigure───────┴───stream closed┘
//! ```

mod config;
mod controller;
mod error;
mod state;

pub use config::{AppConfig, OutputTarget};
pub use controller::Pipeline;
pub use error::PipelineError;
pub use state::ConnectionState;

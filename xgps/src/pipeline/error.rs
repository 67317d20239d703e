use thiserror::Error;

use super::state::ConnectionState;
use crate::xplane::TelemetryError;

/// Errors from configuring or starting the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// `run` called while not [`ConnectionState::Runable`].
    #[error("Pipeline cannot start while {state}")]
    NotRunnable { state: ConnectionState },

    /// Poll frequency outside `1..=60` Hz.
    #[error("Frequency {0} Hz is outside 1..=60 Hz")]
    InvalidFrequency(u32),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

//! `tracing` adapter.

use crate::log::{LogLevel, Logger};
use std::fmt::Arguments;

/// Logger that forwards to the `tracing` subscriber.
///
/// With a component name every event carries a `component` field, so the
/// dry-run sink's sentences can be told apart from the rest of the log.
///
/// ```ignore
/// let logger: Arc<dyn Logger> = Arc::new(TracingLogger::with_component("nmea"));
/// log_info!(logger, "$GPVTG,...");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    component: Option<String>,
}

impl TracingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component(component: impl Into<String>) -> Self {
        Self {
            component: Some(component.into()),
        }
    }

    pub fn component(&self) -> Option<&str> {
        self.component.as_deref()
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        match (&self.component, level) {
            (Some(c), LogLevel::Trace) => tracing::trace!(component = %c, "{}", args),
            (Some(c), LogLevel::Debug) => tracing::debug!(component = %c, "{}", args),
            (Some(c), LogLevel::Info) => tracing::info!(component = %c, "{}", args),
            (Some(c), LogLevel::Warn) => tracing::warn!(component = %c, "{}", args),
            (Some(c), LogLevel::Error) => tracing::error!(component = %c, "{}", args),
            (None, LogLevel::Trace) => tracing::trace!("{}", args),
            (None, LogLevel::Debug) => tracing::debug!("{}", args),
            (None, LogLevel::Info) => tracing::info!("{}", args),
            (None, LogLevel::Warn) => tracing::warn!("{}", args),
            (None, LogLevel::Error) => tracing::error!("{}", args),
        }
    }
}

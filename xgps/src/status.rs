//! Status events flowing from the pipeline to its caller.
//!
//! Both halves of a run (telemetry source and output sink) hold a
//! [`StatusReporter`]; the caller reads the merged events from the matching
//! [`StatusStream`]. The stream ends once every reporter has been dropped.

use std::fmt;

use tokio::sync::mpsc;
use tracing::trace;

/// A single status event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// A sample was decoded successfully. Always precedes the sample itself.
    Heartbeat,
    /// Informational or recoverable condition.
    Info(String),
    /// No telemetry arrived within the receive deadline.
    Timeout,
    /// The output sink failed; the caller is expected to cancel the run.
    Fatal(String),
}

impl Status {
    /// Shorthand for an [`Status::Info`] event.
    pub fn info(message: impl Into<String>) -> Self {
        Status::Info(message.into())
    }

    /// Whether this event asks the caller to cancel the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Status::Fatal(_))
    }

    /// Whether this event is a decode heartbeat.
    pub fn is_heartbeat(&self) -> bool {
        matches!(self, Status::Heartbeat)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Heartbeat => Ok(()),
            Status::Info(message) => f.write_str(message),
            Status::Timeout => f.write_str("Timeout"),
            Status::Fatal(reason) => write!(f, "Fatal: {}", reason),
        }
    }
}

/// Create a connected reporter/stream pair.
pub fn status_channel() -> (StatusReporter, StatusStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (StatusReporter { tx }, StatusStream { rx })
}

/// Sending half of a status channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    tx: mpsc::UnboundedSender<Status>,
}

impl StatusReporter {
    /// Report an event.
    ///
    /// Returns `false` when the caller has stopped listening.
    pub fn report(&self, status: Status) -> bool {
        match self.tx.send(status) {
            Ok(()) => true,
            Err(mpsc::error::SendError(status)) => {
                trace!(status = ?status, "Status listener gone, event discarded");
                false
            }
        }
    }

    /// Report an informational message.
    pub fn info(&self, message: impl Into<String>) -> bool {
        self.report(Status::info(message))
    }

    /// Whether the receiving side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half of a status channel.
#[derive(Debug)]
pub struct StatusStream {
    rx: mpsc::UnboundedReceiver<Status>,
}

impl StatusStream {
    /// Wait for the next event. `None` once every reporter is gone.
    pub async fn recv(&mut self) -> Option<Status> {
        self.rx.recv().await
    }

    /// Blocking variant of [`recv`](Self::recv) for use outside async code.
    pub fn blocking_recv(&mut self) -> Option<Status> {
        self.rx.blocking_recv()
    }

    /// Take an event if one is ready.
    pub fn try_recv(&mut self) -> Option<Status> {
        self.rx.try_recv().ok()
    }
}

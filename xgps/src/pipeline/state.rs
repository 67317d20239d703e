use std::fmt;

/// Lifecycle state, derived from configuration and the running flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Simulator endpoint or output not configured.
    Incomplete,
    /// Configured and idle.
    Runable,
    Running,
}

impl ConnectionState {
    pub(crate) fn derive(endpoint_set: bool, output_configured: bool, running: bool) -> Self {
        match (endpoint_set && output_configured, running) {
            (false, _) => ConnectionState::Incomplete,
            (true, true) => ConnectionState::Running,
            (true, false) => ConnectionState::Runable,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionState::Incomplete => "Incomplete",
            ConnectionState::Runable => "Runable",
            ConnectionState::Running => "Running",
        })
    }
}

//! CLI error handling with user-friendly messages.

use std::fmt;
use std::process;

use xgps::config::ConfigFileError;
use xgps::pipeline::PipelineError;
use xgps::xplane::DiscoveryError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file error
    Config(String),
    /// Bad command-line value
    InvalidInput(String),
    /// Could not listen for or decode beacons
    Discovery(DiscoveryError),
    /// No master X-Plane instance answered
    NoSimulator,
    /// Pipeline refused to start
    Pipeline(PipelineError),
    /// The run ended because the output failed
    Fatal(String),
}

impl CliError {
    /// Exit the process with an error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Discovery(DiscoveryError::Bind { .. }) => {
                eprintln!();
                eprintln!("Could not listen for X-Plane beacons on this network interface.");
                eprintln!("Pass the simulator address directly: xgps run --address <ip:port>");
            }
            CliError::NoSimulator => {
                eprintln!();
                eprintln!("Make sure:");
                eprintln!("  1. X-Plane is running on this network");
                eprintln!("  2. A firewall does not block multicast 239.255.1.1:49707");
                eprintln!("  3. Or pass the address directly: xgps run --address <ip:port>");
            }
            CliError::Pipeline(PipelineError::NotRunnable { .. }) => {
                eprintln!();
                eprintln!("Set a serial port with --port, or in ~/.xgps/config.ini,");
                eprintln!("or use --dry-run to print sentences instead.");
            }
            _ => {}
        }

        process::exit(match self {
            CliError::Config(_) | CliError::InvalidInput(_) => 2,
            _ => 1,
        })
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Discovery(e) => write!(f, "Discovery failed: {}", e),
            CliError::NoSimulator => write!(f, "No X-Plane master instance found"),
            CliError::Pipeline(e) => write!(f, "Failed to start: {}", e),
            CliError::Fatal(reason) => write!(f, "Stopped: {}", reason),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Discovery(e) => Some(e),
            CliError::Pipeline(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<DiscoveryError> for CliError {
    fn from(e: DiscoveryError) -> Self {
        CliError::Discovery(e)
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        CliError::Pipeline(e)
    }
}

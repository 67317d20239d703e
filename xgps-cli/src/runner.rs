//! CLI runner for common setup.
//!
//! Loads the configuration file and initializes logging so command
//! handlers don't repeat it.

use tracing::info;
use xgps::config::ConfigFile;
use xgps::logging::{default_log_file, init_logging, LoggingGuard};

use crate::error::CliError;

/// Keeps logging alive and holds the loaded configuration.
pub struct CliRunner {
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
}

impl CliRunner {
    /// Load config and initialize logging.
    ///
    /// `verbose` enables debug-level logging unless `RUST_LOG` is set.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let log_path = &config.logging.file;
        let log_dir = log_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| ".".into());
        let log_file = log_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| default_log_file().to_string());

        let logging_guard = init_logging(&log_dir, &log_file, verbose)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("xgps v{}", xgps::VERSION);
        info!("xgps CLI: {} command", command);
    }
}

//! Settings structs, one per `[section]`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use super::file::config_directory;
use crate::logging::default_log_file;
use crate::nmea::Precision;
use crate::output::{SentenceKind, SerialParams};
use crate::pipeline::{AppConfig, OutputTarget};
use crate::xplane::DEFAULT_FREQUENCY;

/// How long `discover` waits for a master beacon by default.
pub const DEFAULT_DISCOVERY_TIMEOUT_SECS: u64 = 5;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub simulator: SimulatorSettings,
    pub serial: SerialParams,
    pub nmea: NmeaSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorSettings {
    /// Fixed simulator address; discovery is used when unset.
    pub address: Option<SocketAddr>,
    /// RPOS records per second.
    pub frequency: u32,
    /// Seconds to wait for a beacon.
    pub discovery_timeout: u64,
}

impl SimulatorSettings {
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout)
    }
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            address: None,
            frequency: DEFAULT_FREQUENCY,
            discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NmeaSettings {
    pub precision: Precision,
    pub sentences: Vec<SentenceKind>,
}

impl Default for NmeaSettings {
    fn default() -> Self {
        Self {
            precision: Precision::default(),
            sentences: SentenceKind::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log file, truncated at the start of every session.
    pub file: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: config_directory().join(default_log_file()),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            simulator: SimulatorSettings::default(),
            serial: SerialParams::default(),
            nmea: NmeaSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl ConfigFile {
    /// Runtime configuration for a serial run.
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            endpoint: self.simulator.address,
            output: OutputTarget::Serial(self.serial.clone()),
            frequency: self.simulator.frequency,
            precision: self.nmea.precision,
            sentences: self.nmea.sentences.clone(),
        }
    }
}

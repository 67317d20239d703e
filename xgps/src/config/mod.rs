//! User configuration file (`~/.xgps/config.ini`).
//!
//! [`ConfigFile`] is the persisted form; [`ConfigFile::to_app_config`]
//! turns it into the runtime [`AppConfig`](crate::pipeline::AppConfig) a
//! [`Pipeline`](crate::pipeline::Pipeline) starts from.
//!
//! ```ini
//! [simulator]
//! address = 192.168.1.20:49000
//! frequency = 10
//!
//! [serial]
//! port = /dev/ttyUSB0
//! baud_rate = 38400
//! ```

mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    ConfigFile, LoggingSettings, NmeaSettings, SimulatorSettings, DEFAULT_DISCOVERY_TIMEOUT_SECS,
};

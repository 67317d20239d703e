//! Output error types.

use thiserror::Error;

/// Errors from encoding samples or writing them to a device.
#[derive(Debug, Error)]
pub enum OutputError {
    /// No serial port (or a zero baud rate) configured.
    #[error("Serial output is not configured")]
    NotConfigured,

    /// The device could not be opened with the requested parameters.
    #[error("Failed to open serial port {port}: {source}")]
    DeviceOpen {
        port: String,
        #[source]
        source: std::io::Error,
    },

    /// Write attempted before open or after close.
    #[error("Device is not open")]
    NotOpen,

    /// Writing to an open device failed.
    #[error("Failed to write to device: {0}")]
    Write(#[source] std::io::Error),

    /// A sample could not be rendered as a sentence.
    #[error("Cannot encode {sentence}: {reason}")]
    Encode {
        sentence: &'static str,
        reason: String,
    },

    /// Unknown parameter value in configuration or on the command line.
    #[error("Invalid {field} '{value}'")]
    InvalidParameter { field: &'static str, value: String },
}

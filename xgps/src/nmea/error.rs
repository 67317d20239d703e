//! Error types for NMEA sentence handling.

use thiserror::Error;

/// Errors raised when checking a framed sentence.
///
/// Encoding itself is total; these only come from [`super::verify_sentence`].
#[derive(Debug, Error)]
pub enum NmeaError {
    /// Sentence does not start with `$`.
    #[error("sentence does not start with '$'")]
    MissingStart,

    /// Sentence is not terminated with `\r\n`.
    #[error("sentence is not terminated with CRLF")]
    MissingTerminator,

    /// No `*` separating the body from the checksum.
    #[error("sentence has no checksum field")]
    MissingChecksum,

    /// Checksum field is not two hex digits.
    #[error("invalid checksum field '{0}'")]
    InvalidChecksum(String),

    /// Declared checksum does not match the body.
    #[error("checksum mismatch: declared {declared:02X}, computed {computed:02X}")]
    ChecksumMismatch { declared: u8, computed: u8 },
}

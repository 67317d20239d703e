//! Error types for the X-Plane network protocols.

use std::net::SocketAddr;

use thiserror::Error;

/// Errors from the RPOS telemetry protocol.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to open the local UDP socket.
    #[error("Failed to bind telemetry socket: {0}")]
    Bind(#[source] std::io::Error),

    /// Failed to send the subscribe request.
    #[error("Failed to request positions from {endpoint}: {source}")]
    Subscribe {
        endpoint: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Socket read failed with something other than a timeout.
    #[error("Failed to read from UDP: {0}")]
    Receive(#[source] std::io::Error),

    /// Datagram is not a position record.
    #[error("Malformed position record: {0}")]
    MalformedRecord(String),

    /// Decoder consumed a different number of bytes than the record layout
    /// declares. Indicates a programming error in the field table.
    #[error("Protocol mismatch: record layout is {expected} bytes, decoder read {actual}")]
    ProtocolMismatch { expected: usize, actual: usize },
}

/// Errors from simulator discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Failed to open or join the multicast group.
    #[error("Failed to listen for beacons on {group}: {source}")]
    Bind {
        group: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Socket read failed with something other than a timeout.
    #[error("Failed to read beacon: {0}")]
    Receive(#[source] std::io::Error),

    /// Datagram does not start with the beacon tag.
    #[error("Invalid beacon tag {0:?}")]
    InvalidTag(Vec<u8>),

    /// Beacon body is too short or otherwise undecodable.
    #[error("Malformed beacon: {0}")]
    MalformedBeacon(String),
}

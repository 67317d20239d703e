//! X-Plane network protocols.
//!
//! - [`discovery`]: BECN multicast beacons and master-instance selection
//! - [`source`]: RPOS subscription and the telemetry receive loop
//! - [`position`]: the binary RPOS record

mod beacon;
pub mod discovery;
mod error;
mod multicast;
pub mod position;
mod registry;
pub mod source;

pub use beacon::{decode_beacon, encode_beacon, parse_beacon, BeaconInfo, BEACON_TAG};
pub use discovery::{BeaconReceiver, DiscoveryClient, MAX_ATTEMPTS, MULTICAST_GROUP, MULTICAST_PORT};
pub use error::{DiscoveryError, TelemetryError};
pub use multicast::open_multicast_listener;
pub use position::{decode_position, encode_position, TelemetrySample, RECORD_LEN, RPOS_TAG};
pub use registry::DiscoveredInstances;
pub use source::{
    bind_ephemeral, subscribe_request, TelemetrySource, TelemetrySourceConfig, TelemetryTransport,
    DEFAULT_FREQUENCY, MAX_FREQUENCY, RECV_TIMEOUT, SUPPORTED_FREQUENCIES,
};

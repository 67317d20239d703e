//! Simulator discovery over the X-Plane beacon multicast group.
//!
//! A [`DiscoveryClient`] listens for BECN beacons and picks the first one
//! sent by a master instance. Visual and IOS sub-instances advertise on the
//! same group, so non-master beacons are skipped rather than treated as an
//! answer.
//!
//! ```ignore
//! let client = DiscoveryClient::bind()?;
//! match client.discover(Duration::from_secs(5)).await? {
//!     Some(beacon) => println!("Found {}", beacon.details()),
//!     None => println!("No simulator on the network"),
//! }
//! ```

use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::beacon::{parse_beacon, BeaconInfo};
use super::error::DiscoveryError;
use super::multicast::open_multicast_listener;
use super::registry::DiscoveredInstances;

/// Multicast group X-Plane beacons are sent to.
pub const MULTICAST_GROUP: Ipv4Addr = Ipv4Addr::new(239, 255, 1, 1);

/// Multicast port X-Plane beacons are sent to.
pub const MULTICAST_PORT: u16 = 49707;

/// Datagrams read per [`DiscoveryClient::discover`] call before giving up.
pub const MAX_ATTEMPTS: usize = 10;

/// Beacons are small; anything larger is truncated and fails to decode.
const BEACON_BUFFER_SIZE: usize = 512;

/// Source of beacon datagrams.
///
/// Implemented for the tokio UDP socket; tests script datagrams through it.
pub trait BeaconReceiver: Send + Sync {
    /// Receive one datagram and the address it came from.
    fn recv_from(
        &self,
        buf: &mut [u8],
    ) -> impl Future<Output = std::io::Result<(usize, SocketAddr)>> + Send;
}

impl BeaconReceiver for UdpSocket {
    async fn recv_from(&self, buf: &mut [u8]) -> std::io::Result<(usize, SocketAddr)> {
        UdpSocket::recv_from(self, buf).await
    }
}

/// Listens for simulator beacons.
pub struct DiscoveryClient<R = UdpSocket> {
    receiver: R,
    max_attempts: usize,
}

impl DiscoveryClient<UdpSocket> {
    /// Join the well-known beacon group.
    pub fn bind() -> Result<Self, DiscoveryError> {
        let socket = open_multicast_listener(MULTICAST_GROUP, MULTICAST_PORT).map_err(|source| {
            DiscoveryError::Bind {
                group: SocketAddr::V4(SocketAddrV4::new(MULTICAST_GROUP, MULTICAST_PORT)),
                source,
            }
        })?;
        debug!(group = %MULTICAST_GROUP, port = MULTICAST_PORT, "Listening for X-Plane beacons");
        Ok(Self::with_receiver(socket))
    }
}

impl<R: BeaconReceiver> DiscoveryClient<R> {
    /// Use an already-open beacon source.
    pub fn with_receiver(receiver: R) -> Self {
        Self {
            receiver,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    /// Override the number of datagrams read per discovery.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Wait for the first master beacon.
    ///
    /// Returns `Ok(None)` when the timeout elapses or every attempt produced
    /// an unusable or non-master beacon. Only socket failures are errors.
    pub async fn discover(&self, timeout: Duration) -> Result<Option<BeaconInfo>, DiscoveryError> {
        let deadline = Instant::now() + timeout;
        let mut buf = [0u8; BEACON_BUFFER_SIZE];

        for attempt in 1..=self.max_attempts {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            let (len, source) =
                match tokio::time::timeout(remaining, self.receiver.recv_from(&mut buf)).await {
                    Ok(Ok(received)) => received,
                    Ok(Err(e)) => return Err(DiscoveryError::Receive(e)),
                    Err(_) => {
                        debug!(attempt, "No beacon before deadline");
                        break;
                    }
                };

            let beacon = match parse_beacon(&buf[..len], source.ip()) {
                Ok(beacon) => beacon,
                Err(e) => {
                    warn!(attempt, %source, error = %e, "Ignoring invalid beacon");
                    continue;
                }
            };

            if !beacon.is_master() {
                info!(attempt, beacon = %beacon, "Found non-master X-Plane");
                continue;
            }

            info!(beacon = %beacon.details(), "Found X-Plane");
            return Ok(Some(beacon));
        }

        Ok(None)
    }

    /// Collect every master instance seen within `total`.
    ///
    /// Runs [`discover`](Self::discover) repeatedly with `per_attempt` as the
    /// timeout of each round. Receive errors are logged and the sweep goes
    /// on until the overall deadline.
    pub async fn sweep(&self, total: Duration, per_attempt: Duration) -> DiscoveredInstances {
        let deadline = Instant::now() + total;
        let mut instances = DiscoveredInstances::new();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            match self.discover(per_attempt.min(remaining)).await {
                Ok(Some(beacon)) => {
                    instances.add(beacon);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "Discovery round failed");
                    // a broken socket fails instantly; don't spin on it
                    tokio::time::sleep(per_attempt.min(remaining)).await;
                }
            }
        }

        debug!(count = instances.len(), instances = ?instances.list(), "Discovery sweep finished");
        instances
    }
}

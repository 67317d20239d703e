//! RPOS telemetry source.
//!
//! Subscribes to position records from one simulator, decodes them and
//! feeds them into the pipeline's sample channel. Each decoded sample is
//! preceded by a [`Status::Heartbeat`]; receive timeouts are reported as
//! [`Status::Timeout`] and the loop keeps going.
//!
//! Whatever ends the loop (cancellation, a socket failure, or the sample
//! consumer going away), the source sends exactly one zero-frequency
//! unsubscribe before the socket is dropped. Dropping the source's sample
//! sender is what tells the output sink to finish.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use super::error::TelemetryError;
use super::position::{decode_position, TelemetrySample};
use crate::status::{Status, StatusReporter};

/// Deadline for each receive attempt.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(1);

/// Largest datagram read from the simulator.
pub const MAX_DATAGRAM_SIZE: usize = 1500;

/// Default subscription rate in Hz.
pub const DEFAULT_FREQUENCY: u32 = 10;

/// Highest rate the simulator accepts.
pub const MAX_FREQUENCY: u32 = 60;

/// Rates offered to the user. Any rate up to [`MAX_FREQUENCY`] works.
pub const SUPPORTED_FREQUENCIES: [u32; 5] = [1, 2, 5, 10, 20];

/// Build an RPOS subscribe request. A frequency of 0 unsubscribes.
pub fn subscribe_request(frequency: u32) -> Vec<u8> {
    format!("RPOS\0{}\0", frequency).into_bytes()
}

/// Datagram transport used by the source.
///
/// Implemented for the tokio UDP socket; tests record sends and script
/// received datagrams through it.
pub trait TelemetryTransport: Send + Sync {
    fn send_to(
        &self,
        buf: &[u8],
        target: SocketAddr,
    ) -> impl Future<Output = std::io::Result<usize>> + Send;

    /// Receive one datagram from any peer.
    fn recv(&self, buf: &mut [u8]) -> impl Future<Output = std::io::Result<usize>> + Send;
}

impl TelemetryTransport for UdpSocket {
    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> std::io::Result<usize> {
        UdpSocket::send_to(self, buf, target).await
    }

    async fn recv(&self, buf: &mut [u8]) -> std::io::Result<usize> {
        UdpSocket::recv_from(self, buf).await.map(|(len, _)| len)
    }
}

impl<T: TelemetryTransport> TelemetryTransport for Arc<T> {
    fn send_to(
        &self,
        buf: &[u8],
        target: SocketAddr,
    ) -> impl Future<Output = std::io::Result<usize>> + Send {
        (**self).send_to(buf, target)
    }

    fn recv(&self, buf: &mut [u8]) -> impl Future<Output = std::io::Result<usize>> + Send {
        (**self).recv(buf)
    }
}

/// Where and how often to request positions.
#[derive(Debug, Clone)]
pub struct TelemetrySourceConfig {
    /// Simulator address from its beacon.
    pub endpoint: SocketAddr,
    /// Requested records per second.
    pub frequency: u32,
    /// Deadline for each receive attempt.
    pub recv_timeout: Duration,
}

impl TelemetrySourceConfig {
    pub fn new(endpoint: SocketAddr, frequency: u32) -> Self {
        Self {
            endpoint,
            frequency,
            recv_timeout: RECV_TIMEOUT,
        }
    }
}

/// Streams position samples from one simulator.
pub struct TelemetrySource<T = UdpSocket> {
    transport: T,
    config: TelemetrySourceConfig,
}

impl TelemetrySource<UdpSocket> {
    /// Open an ephemeral local UDP socket. Must be called inside a tokio
    /// runtime.
    pub fn bind(config: TelemetrySourceConfig) -> Result<Self, TelemetryError> {
        Ok(Self::with_transport(bind_ephemeral()?, config))
    }
}

/// Bind an ephemeral UDP socket on all interfaces.
pub fn bind_ephemeral() -> Result<UdpSocket, TelemetryError> {
    let socket = std::net::UdpSocket::bind("0.0.0.0:0").map_err(TelemetryError::Bind)?;
    socket.set_nonblocking(true).map_err(TelemetryError::Bind)?;
    let socket = UdpSocket::from_std(socket).map_err(TelemetryError::Bind)?;
    debug!(local_addr = ?socket.local_addr().ok(), "Telemetry socket bound");
    Ok(socket)
}

impl<T: TelemetryTransport> TelemetrySource<T> {
    pub fn with_transport(transport: T, config: TelemetrySourceConfig) -> Self {
        Self { transport, config }
    }

    pub fn endpoint(&self) -> SocketAddr {
        self.config.endpoint
    }

    /// Run until cancelled or the socket fails.
    ///
    /// Consumes the source: the transport and the sample sender are dropped
    /// on return, closing the sample channel.
    ///
    /// A sample is delivered whenever the channel has room. If the consumer
    /// stops reading and the channel stays full, cancellation still ends the
    /// run; the sample waiting for room is dropped.
    pub async fn run(
        self,
        samples: mpsc::Sender<TelemetrySample>,
        status: StatusReporter,
        cancel: CancellationToken,
    ) -> Result<(), TelemetryError> {
        info!(
            endpoint = %self.config.endpoint,
            frequency = self.config.frequency,
            "Requesting positions"
        );

        let result = self.stream(&samples, &status, &cancel).await;
        self.unsubscribe().await;

        if let Err(e) = &result {
            error!(error = %e, "Telemetry source stopped");
        }
        result
    }

    async fn stream(
        &self,
        samples: &mpsc::Sender<TelemetrySample>,
        status: &StatusReporter,
        cancel: &CancellationToken,
    ) -> Result<(), TelemetryError> {
        let endpoint = self.config.endpoint;
        let recv_timeout = self.config.recv_timeout;
        if let Err(source) = self
            .transport
            .send_to(&subscribe_request(self.config.frequency), endpoint)
            .await
        {
            status.info("Failed to request positions");
            return Err(TelemetryError::Subscribe { endpoint, source });
        }

        let mut buf = [0u8; MAX_DATAGRAM_SIZE];
        let mut received: u64 = 0;
        let mut timeouts: u64 = 0;

        loop {
            let recv = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Telemetry source cancelled");
                    break;
                }
                recv = tokio::time::timeout(recv_timeout, self.transport.recv(&mut buf)) => recv,
            };

            let len = match recv {
                Ok(Ok(len)) => len,
                Ok(Err(e)) => {
                    status.info(format!("Failed to read from UDP: {}", e));
                    return Err(TelemetryError::Receive(e));
                }
                Err(_) => {
                    timeouts += 1;
                    trace!(timeouts, "No position before deadline");
                    status.report(Status::Timeout);
                    continue;
                }
            };

            let sample = match decode_position(&buf[..len]) {
                Ok(sample) => sample,
                Err(e @ TelemetryError::ProtocolMismatch { .. }) => {
                    status.info(e.to_string());
                    return Err(e);
                }
                Err(e) => {
                    warn!(error = %e, len, "Dropping datagram");
                    status.info(e.to_string());
                    continue;
                }
            };

            received += 1;
            if received == 1 {
                info!(
                    lat = format!("{:.4}", sample.latitude),
                    lon = format!("{:.4}", sample.longitude),
                    "First position received"
                );
            }

            status.report(Status::Heartbeat);
            tokio::select! {
                biased;
                sent = samples.send(sample) => {
                    if sent.is_err() {
                        debug!("Sample consumer gone, stopping");
                        break;
                    }
                }
                _ = cancel.cancelled() => {
                    debug!("Telemetry source cancelled while the sample channel was full");
                    break;
                }
            }
        }

        info!(received, timeouts, "Telemetry stream ended");
        Ok(())
    }

    async fn unsubscribe(&self) {
        let endpoint = self.config.endpoint;
        match self.transport.send_to(&subscribe_request(0), endpoint).await {
            Ok(_) => debug!(%endpoint, "Unsubscribed from positions"),
            Err(e) => warn!(%endpoint, error = %e, "Failed to unsubscribe"),
        }
    }
}

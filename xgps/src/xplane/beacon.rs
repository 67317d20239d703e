//! X-Plane BECN multicast beacons.
//!
//! Every running X-Plane instance advertises itself on a multicast group:
//!
//! ```text
//! "BECN\0" | u8 major | u8 minor | i32 host id | i32 version | u32 role | u16 port
//!          | computer name, NUL terminated | u16 raknet port
//! ```
//!
//! All integers are little-endian.

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use super::error::DiscoveryError;

/// Tag that starts every beacon datagram.
pub const BEACON_TAG: &[u8; 5] = b"BECN\0";

/// Size of the fixed part of the beacon body.
const BASIC_BEACON_LEN: usize = 1 + 1 + 4 + 4 + 4 + 2;

/// Trailing raknet port.
const RAKNET_PORT_LEN: usize = 2;

/// Host id of X-Plane itself (as opposed to PlaneMaker).
const APPLICATION_XPLANE: i32 = 1;

/// Role of the primary simulator process.
const ROLE_MASTER: u32 = 1;

/// Decoded beacon of one simulator instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeaconInfo {
    /// 1 for X-Plane 10.40 and 11.55.
    pub major_version: u8,
    /// 1 for X-Plane 10.40, 2 for 11.55.
    pub minor_version: u8,
    /// 1 for X-Plane, 2 for PlaneMaker.
    pub application_id: i32,
    /// e.g. 115501 for 11.55r1.
    pub version_number: i32,
    /// 1 master, 2 external visual, 3 IOS.
    pub role: u32,
    /// UDP port the simulator listens on.
    pub port: u16,
    /// Address the beacon came from.
    pub source_ip: IpAddr,
    pub computer_name: String,
    /// Port of the simulator's raknet client.
    pub raknet_port: u16,
}

impl BeaconInfo {
    /// Primary X-Plane process, not a visual or IOS sub-instance.
    pub fn is_master(&self) -> bool {
        self.application_id == APPLICATION_XPLANE && self.role == ROLE_MASTER
    }

    /// Address to send RPOS requests to.
    pub fn endpoint(&self) -> SocketAddr {
        SocketAddr::new(self.source_ip, self.port)
    }

    /// Address of the raknet client.
    pub fn raknet_endpoint(&self) -> SocketAddr {
        SocketAddr::new(self.source_ip, self.raknet_port)
    }

    /// Beacon protocol version as `major.minor`.
    pub fn beacon_version(&self) -> String {
        format!("{}.{}", self.major_version, self.minor_version)
    }

    pub fn application_type(&self) -> &'static str {
        match self.application_id {
            1 => "X-Plane",
            2 => "PlaneMaker",
            _ => "Unknown",
        }
    }

    pub fn role_type(&self) -> &'static str {
        match self.role {
            1 => "Master",
            2 => "Extern visual",
            3 => "IOS",
            _ => "Unknown",
        }
    }

    /// Single-line description with every decoded field.
    pub fn details(&self) -> String {
        format!(
            "X-Plane Beacon Version: {} {}({} {}) on {} UDP Port: {} Raknet: {}",
            self.beacon_version(),
            self.application_type(),
            self.version_number,
            self.role_type(),
            self.computer_name,
            self.endpoint(),
            self.raknet_endpoint(),
        )
    }
}

impl fmt::Display for BeaconInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} on {}",
            self.application_type(),
            self.role_type(),
            self.computer_name
        )
    }
}

/// Decode a full beacon datagram, checking the tag first.
pub fn parse_beacon(datagram: &[u8], source_ip: IpAddr) -> Result<BeaconInfo, DiscoveryError> {
    match datagram.get(..BEACON_TAG.len()) {
        Some(tag) if tag == BEACON_TAG => decode_beacon(&datagram[BEACON_TAG.len()..], source_ip),
        _ => Err(DiscoveryError::InvalidTag(
            datagram[..datagram.len().min(BEACON_TAG.len())].to_vec(),
        )),
    }
}

/// Decode the beacon body that follows the tag.
pub fn decode_beacon(body: &[u8], source_ip: IpAddr) -> Result<BeaconInfo, DiscoveryError> {
    if body.len() < BASIC_BEACON_LEN + RAKNET_PORT_LEN {
        return Err(DiscoveryError::MalformedBeacon(format!(
            "beacon body is {} bytes, need at least {}",
            body.len(),
            BASIC_BEACON_LEN + RAKNET_PORT_LEN
        )));
    }

    let u16_at = |at: usize| u16::from_le_bytes([body[at], body[at + 1]]);
    let u32_at =
        |at: usize| u32::from_le_bytes([body[at], body[at + 1], body[at + 2], body[at + 3]]);

    let name_end = body.len() - RAKNET_PORT_LEN;
    let name_field = &body[BASIC_BEACON_LEN..name_end];
    let name = match name_field.iter().position(|&b| b == 0) {
        Some(nul) => &name_field[..nul],
        None => name_field,
    };

    Ok(BeaconInfo {
        major_version: body[0],
        minor_version: body[1],
        application_id: u32_at(2) as i32,
        version_number: u32_at(6) as i32,
        role: u32_at(10),
        port: u16_at(14),
        source_ip,
        computer_name: String::from_utf8_lossy(name).into_owned(),
        raknet_port: u16_at(name_end),
    })
}

/// Build a beacon datagram. Used by fake simulators and tests.
pub fn encode_beacon(beacon: &BeaconInfo) -> Vec<u8> {
    let mut datagram = BEACON_TAG.to_vec();
    datagram.push(beacon.major_version);
    datagram.push(beacon.minor_version);
    datagram.extend_from_slice(&beacon.application_id.to_le_bytes());
    datagram.extend_from_slice(&beacon.version_number.to_le_bytes());
    datagram.extend_from_slice(&beacon.role.to_le_bytes());
    datagram.extend_from_slice(&beacon.port.to_le_bytes());
    datagram.extend_from_slice(beacon.computer_name.as_bytes());
    datagram.push(0);
    datagram.extend_from_slice(&beacon.raknet_port.to_le_bytes());
    datagram
}

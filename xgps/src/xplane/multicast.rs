//! Multicast listener factory.
//!
//! Everything platform-specific about receiving beacons lives here. The
//! port is shared with other listeners on the host, so the simulator or a
//! second bridge can hold the beacon port at the same time.

use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};

use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use tokio::net::UdpSocket;

/// Open a non-blocking socket joined to `group` on `port`.
///
/// Must be called inside a tokio runtime.
pub fn open_multicast_listener(group: Ipv4Addr, port: u16) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    share_port(&socket)?;
    socket.bind(&SockAddr::from(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port)))?;
    socket.join_multicast_v4(&group, &Ipv4Addr::UNSPECIFIED)?;
    enable_loopback(&socket)?;
    socket.set_nonblocking(true)?;
    UdpSocket::from_std(socket.into())
}

/// Linux and the BSDs need SO_REUSEPORT as well for several processes to
/// receive on one multicast port.
#[cfg(unix)]
fn share_port(socket: &Socket) -> io::Result<()> {
    socket.set_reuse_port(true)
}

#[cfg(not(unix))]
fn share_port(_socket: &Socket) -> io::Result<()> {
    Ok(())
}

/// Windows does not deliver multicast to the sending host unless asked.
#[cfg(windows)]
fn enable_loopback(socket: &Socket) -> io::Result<()> {
    socket.set_multicast_loop_v4(true)
}

#[cfg(not(windows))]
fn enable_loopback(_socket: &Socket) -> io::Result<()> {
    Ok(())
}

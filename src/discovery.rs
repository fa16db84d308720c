use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use tracing::debug;

use crate::protocol::{DISCOVERY_PORTS, DISCOVERY_REQUEST, DiscoveryReply, parse_discovery_datagram};
use crate::Result;

const RECEIVE_TIMEOUT: Duration = Duration::from_secs(2);

/// Broadcasts on each discovery port in turn and returns the first controller
/// that answers, with its port if the firmware reports one.
pub fn discover() -> Result<Option<(IpAddr, Option<u16>)>> {
    for port in DISCOVERY_PORTS {
        if let Some(found) = discover_on(port)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

fn discover_on(port: u16) -> Result<Option<(IpAddr, Option<u16>)>> {
    debug!(port, "sending discovery broadcast");
    let socket = UdpSocket::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port))?;
    socket.set_broadcast(true)?;
    socket.set_read_timeout(Some(RECEIVE_TIMEOUT))?;
    socket.send_to(
        DISCOVERY_REQUEST.as_bytes(),
        SocketAddr::new(IpAddr::V4(Ipv4Addr::BROADCAST), port),
    )?;

    let mut buf = [0u8; 1024];
    loop {
        let (len, from) = match socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let payload = String::from_utf8_lossy(&buf[..len]);
        match parse_discovery_datagram(&payload) {
            DiscoveryReply::Echo => continue,
            DiscoveryReply::Found(reported) => {
                debug!(ip = %from.ip(), port = ?reported, "controller answered");
                if reported.is_none() {
                    debug!("reply had no valid port, old firmware probably");
                }
                return Ok(Some((from.ip(), reported)));
            }
            DiscoveryReply::Foreign => {
                debug!(ip = %from.ip(), "reply with wrong magic, skipping");
            }
        }
    }
}

//! Collaborators the swarm core talks to: the network, the light sensor and
//! the status indicator. Each sits behind a narrow trait so the controller
//! can be driven by in-memory fakes in tests.

use std::io;
use std::net::{IpAddr, Ipv4Addr};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::info;

use crate::types::Reading;

#[cfg(test)]
pub(crate) mod fakes;
pub mod indicator;
pub mod sensor;
pub mod udp;

pub use indicator::{FileIndicator, LogIndicator};
pub use sensor::{FileSensor, FixedSensor};
pub use udp::UdpTransport;

#[async_trait]
pub trait Transport: Send {
    /// Make `group` reachable for sending and receiving on `port`.
    fn join_multicast_group(&mut self, group: Ipv4Addr, port: u16) -> io::Result<()>;

    async fn send(&self, bytes: &[u8], group: Ipv4Addr, port: u16) -> io::Result<()>;

    /// Non-blocking receive. `Ok(None)` when nothing is queued.
    fn try_receive(&mut self) -> io::Result<Option<Vec<u8>>>;
}

pub trait AmbientSensor: Send {
    fn read_ambient(&mut self) -> io::Result<Reading>;
}

pub trait Indicator: Send {
    fn set_indicator(&mut self, active: bool) -> io::Result<()>;
}

/// Resolve the local identity: the configured address if any, otherwise the
/// address of the default outbound interface.
pub fn self_address(configured: Option<Ipv4Addr>) -> Result<Ipv4Addr> {
    if let Some(addr) = configured {
        return Ok(addr);
    }
    let addr = ipv4_identity(local_ip_address::local_ip()?)?;
    info!("Detected local address {}", addr);
    Ok(addr)
}

/// The wire identity is four bytes, so only IPv4 addresses qualify.
fn ipv4_identity(addr: IpAddr) -> Result<Ipv4Addr> {
    match addr {
        IpAddr::V4(addr) => Ok(addr),
        IpAddr::V6(addr) => Err(anyhow!(
            "Detected IPv6 address {}; set LIGHTSWARM_ADDRESS to an IPv4 address",
            addr
        )),
    }
}

/// Destination for dissemination: the /24 broadcast address of `addr`.
pub fn group_address(addr: Ipv4Addr) -> Ipv4Addr {
    let [a, b, c, _] = addr.octets();
    Ipv4Addr::new(a, b, c, 255)
}

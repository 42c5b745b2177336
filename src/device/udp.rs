use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};

use async_trait::async_trait;
use log::{debug, info};
use tokio::net::UdpSocket;

use super::Transport;
use crate::wire::PACKET_LEN;

/// Headroom so oversized datagrams are read whole and then truncated by the
/// codec rather than by the socket.
const RECV_BUF_LEN: usize = 512;

pub struct UdpTransport {
    socket: UdpSocket,
    /// Local interface used for multicast membership.
    interface: Ipv4Addr,
    buf: Vec<u8>,
}

impl UdpTransport {
    /// Bind to `0.0.0.0:port`. Multicast groups are joined on `interface`.
    pub async fn bind(port: u16, interface: Ipv4Addr) -> io::Result<Self> {
        let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port)).await?;
        info!("UDP transport bound to {}", socket.local_addr()?);
        Ok(Self {
            socket,
            interface,
            buf: vec![0; RECV_BUF_LEN.max(PACKET_LEN)],
        })
    }
}

#[async_trait]
impl Transport for UdpTransport {
    fn join_multicast_group(&mut self, group: Ipv4Addr, port: u16) -> io::Result<()> {
        if group.is_multicast() {
            self.socket.join_multicast_v4(group, self.interface)?;
            info!(
                "Joined multicast group {}:{} on {}",
                group, port, self.interface
            );
        } else {
            // subnet.255 is a broadcast address, not a multicast one.
            self.socket.set_broadcast(true)?;
            info!("Broadcasting to {}:{}", group, port);
        }
        Ok(())
    }

    async fn send(&self, bytes: &[u8], group: Ipv4Addr, port: u16) -> io::Result<()> {
        let sent = self
            .socket
            .send_to(bytes, SocketAddrV4::new(group, port))
            .await?;
        debug!("Sent {} bytes to {}:{}", sent, group, port);
        Ok(())
    }

    fn try_receive(&mut self) -> io::Result<Option<Vec<u8>>> {
        match self.socket.try_recv_from(&mut self.buf) {
            Ok((len, from)) => {
                debug!("Received {} bytes from {}", len, from);
                Ok(Some(self.buf[..len].to_vec()))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }
}

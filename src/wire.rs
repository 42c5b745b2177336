//! Fixed-size binary packet codec.
//!
//! All integers are big-endian. The layout is:
//!
//! ```text
//! offset size field
//! 0      4    cmd
//! 4      4    identity (IPv4 octets)
//! 8      1    is_master
//! 9      8    r, g, b, c
//! 17     2    temperature
//! 19     2    lux
//! 21     4    last_seen (sender clock, truncated)
//! ```
//!
//! `Empty` and `Reset` carry a zeroed device block. Bytes past
//! [`PACKET_LEN`] are ignored.

use std::net::Ipv4Addr;

use crate::error::{Result, SwarmError};
use crate::types::{Channels, Command, DeviceRecord, Packet};

pub const PACKET_LEN: usize = 25;

/// Reported at startup for humans. Never sent: peers with a matching layout
/// interoperate regardless of version.
pub const PROTOCOL_VERSION: u32 = 42;

pub fn encode(packet: &Packet) -> [u8; PACKET_LEN] {
    let mut buf = [0u8; PACKET_LEN];
    buf[0..4].copy_from_slice(&(packet.command() as u32).to_be_bytes());

    if let Packet::UpdateColor(device) = packet {
        buf[4..8].copy_from_slice(&device.identity.octets());
        buf[8] = device.is_master as u8;
        let fields = [
            device.channels.r,
            device.channels.g,
            device.channels.b,
            device.channels.c,
            device.temperature,
            device.lux,
        ];
        for (i, field) in fields.iter().enumerate() {
            let at = 9 + i * 2;
            buf[at..at + 2].copy_from_slice(&field.to_be_bytes());
        }
        // The wire only has room for the low 32 bits of the clock.
        buf[21..25].copy_from_slice(&(device.last_seen as u32).to_be_bytes());
    }

    buf
}

pub fn decode(bytes: &[u8]) -> Result<Packet> {
    if bytes.len() < PACKET_LEN {
        return Err(SwarmError::Truncated {
            expected: PACKET_LEN,
            actual: bytes.len(),
        });
    }

    let cmd = read_u32(bytes, 0);
    match Command::try_from(cmd).map_err(SwarmError::UnknownCommand)? {
        Command::Empty => Ok(Packet::Empty),
        Command::Reset => Ok(Packet::Reset),
        Command::UpdateColor => {
            let identity = Ipv4Addr::new(bytes[4], bytes[5], bytes[6], bytes[7]);
            Ok(Packet::UpdateColor(DeviceRecord {
                identity,
                is_master: bytes[8] != 0,
                channels: Channels {
                    r: read_u16(bytes, 9),
                    g: read_u16(bytes, 11),
                    b: read_u16(bytes, 13),
                    c: read_u16(bytes, 15),
                },
                temperature: read_u16(bytes, 17),
                lux: read_u16(bytes, 19),
                last_seen: read_u32(bytes, 21) as u64,
            }))
        }
    }
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

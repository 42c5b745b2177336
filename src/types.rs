//! Data structures shared by the roster, the wire codec and the controller.
//!
//! A [`DeviceRecord`] is both a roster row and the payload of an
//! `UpdateColor` packet. Timestamps are monotonic milliseconds on the local
//! clock of whoever holds the record; a receiver always overwrites
//! `last_seen` with its own clock when it applies an update.

use std::net::Ipv4Addr;

/// Monotonic milliseconds since the local process started.
pub type Millis = u64;

/// Raw sensor channel readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Channels {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub c: u16,
}

/// One reading from the ambient sensor, raw and derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reading {
    pub channels: Channels,
    pub temperature: u16,
    pub lux: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceRecord {
    pub identity: Ipv4Addr,
    pub is_master: bool,
    pub channels: Channels,
    pub temperature: u16,
    /// Light intensity; the sole election criterion.
    pub lux: u16,
    pub last_seen: Millis,
}

impl DeviceRecord {
    /// A fresh record with zeroed readings.
    pub fn new(identity: Ipv4Addr) -> Self {
        Self {
            identity,
            is_master: false,
            channels: Channels::default(),
            temperature: 0,
            lux: 0,
            last_seen: 0,
        }
    }

    /// Store a sensor reading, leaving identity, master flag and timestamp alone.
    pub fn apply_reading(&mut self, reading: Reading) {
        self.channels = reading.channels;
        self.temperature = reading.temperature;
        self.lux = reading.lux;
    }

    /// Age of this record relative to `now`. A timestamp from the future
    /// counts as age zero.
    pub fn age(&self, now: Millis) -> Millis {
        now.saturating_sub(self.last_seen)
    }
}

/// Wire command tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Command {
    Empty = 0,
    Reset = 1,
    UpdateColor = 2,
}

impl TryFrom<u32> for Command {
    type Error = u32;

    fn try_from(value: u32) -> std::result::Result<Self, u32> {
        match value {
            0 => Ok(Command::Empty),
            1 => Ok(Command::Reset),
            2 => Ok(Command::UpdateColor),
            other => Err(other),
        }
    }
}

/// A decoded swarm packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    /// Nothing received this cycle.
    Empty,
    /// Restart the receiving process.
    Reset,
    /// Full snapshot of the sender's own record.
    UpdateColor(DeviceRecord),
}

impl Packet {
    pub fn command(&self) -> Command {
        match self {
            Packet::Empty => Command::Empty,
            Packet::Reset => Command::Reset,
            Packet::UpdateColor(_) => Command::UpdateColor,
        }
    }
}

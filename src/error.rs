//! Error taxonomy for the swarm core.
//!
//! Every variant here is recoverable from the point of view of the control
//! loop: the caller logs it and skips the operation. Only I/O failures while
//! bringing up the transport are allowed to escape to `main`.

use std::net::Ipv4Addr;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SwarmError>;

#[derive(Debug, Error)]
pub enum SwarmError {
    /// An insert was attempted for an identity already in the roster.
    #[error("device {0} is already in the roster")]
    DuplicateDevice(Ipv4Addr),

    /// Update or remove for an identity the roster does not hold.
    #[error("device {0} not found")]
    DeviceNotFound(Ipv4Addr),

    /// The self-entry can never be removed.
    #[error("refusing to remove the self entry")]
    SelfEntry,

    #[error("roster is full ({0} devices)")]
    CapacityExhausted(usize),

    #[error("packet truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("invalid packet command {0}")]
    UnknownCommand(u32),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

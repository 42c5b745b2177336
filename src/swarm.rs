//! The swarm controller.
//!
//! [`Swarm`] owns the roster and the collaborators, and runs one protocol
//! cycle per call to [`Swarm::cycle`]: ingest at most one packet, evict
//! stale peers, re-run the election, then disseminate and list when their
//! periods have elapsed. Nothing in a cycle blocks on the network.

use std::net::Ipv4Addr;

use log::{debug, info, warn};

use crate::config::Config;
use crate::device::{group_address, AmbientSensor, Indicator, Transport};
use crate::error::Result;
use crate::roster::Roster;
use crate::types::{Millis, Packet};
use crate::wire;

/// What the driver should do after a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// A reset command arrived; discard all state and start over.
    Reset,
}

/// Local election rule: self is master unless some peer reports strictly
/// less light. Ties keep self as master.
pub fn elect_master(roster: &Roster) -> bool {
    let own = roster.self_entry().lux;
    !roster.peers().iter().any(|peer| peer.lux < own)
}

pub struct Swarm {
    roster: Roster,
    port: u16,
    group: Ipv4Addr,
    send_interval: Millis,
    device_timeout: Millis,
    list_interval: Millis,
    transport: Box<dyn Transport>,
    sensor: Box<dyn AmbientSensor>,
    indicator: Box<dyn Indicator>,
    last_sent: Millis,
    last_listed: Millis,
}

impl Swarm {
    pub fn new(
        identity: Ipv4Addr,
        cfg: &Config,
        mut transport: Box<dyn Transport>,
        sensor: Box<dyn AmbientSensor>,
        indicator: Box<dyn Indicator>,
        now: Millis,
    ) -> Result<Self> {
        let group = group_address(identity);
        transport.join_multicast_group(group, cfg.port)?;
        Ok(Self {
            roster: Roster::new(identity, cfg.max_devices, now),
            port: cfg.port,
            group,
            send_interval: cfg.send_interval_ms,
            device_timeout: cfg.device_timeout_ms,
            list_interval: cfg.list_interval_ms,
            transport,
            sensor,
            indicator,
            last_sent: now,
            last_listed: now,
        })
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn group(&self) -> Ipv4Addr {
        self.group
    }

    pub async fn cycle(&mut self, now: Millis) -> Flow {
        let packet = self.receive();
        if self.dispatch(packet, now) == Flow::Reset {
            return Flow::Reset;
        }

        self.reap(now);
        self.elect();

        if now.saturating_sub(self.last_sent) > self.send_interval {
            self.disseminate(now).await;
            self.last_sent = now;
        }

        if let Some(lines) = self.device_listing(now) {
            for line in lines {
                info!("{}", line);
            }
        }

        Flow::Continue
    }

    /// Poll the transport once. Anything that does not decode is dropped.
    fn receive(&mut self) -> Packet {
        let bytes = match self.transport.try_receive() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Packet::Empty,
            Err(e) => {
                warn!("Receive failed: {}", e);
                return Packet::Empty;
            }
        };
        match wire::decode(&bytes) {
            Ok(packet) => packet,
            Err(e) => {
                warn!("Discarding packet {}: {}", hex::encode(&bytes), e);
                Packet::Empty
            }
        }
    }

    /// Fold one packet into the roster.
    pub fn dispatch(&mut self, packet: Packet, now: Millis) -> Flow {
        match packet {
            Packet::Empty => {}
            Packet::Reset => {
                warn!("Reset command received");
                return Flow::Reset;
            }
            Packet::UpdateColor(record) => {
                if self.roster.find(record.identity).is_none() {
                    match self.roster.insert(record, now) {
                        Ok(()) => info!("Discovered device {}", record.identity),
                        Err(e) => warn!("Could not add device {}: {}", record.identity, e),
                    }
                }
                // Our own broadcast lands here too; applying it is harmless.
                if let Err(e) = self.roster.update(&record, now) {
                    warn!("Dropping update: {}", e);
                }
            }
        }
        Flow::Continue
    }

    pub fn reap(&mut self, now: Millis) {
        for device in self.roster.evict_older_than(self.device_timeout, now) {
            info!(
                "Removed device {} (silent for {} ms)",
                device.identity,
                device.age(now)
            );
        }
    }

    /// Refresh the local reading, recompute mastership and drive the
    /// indicator. Returns the new master flag.
    pub fn elect(&mut self) -> bool {
        match self.sensor.read_ambient() {
            Ok(reading) => self.roster.self_entry_mut().apply_reading(reading),
            Err(e) => warn!("Sensor read failed, keeping last reading: {}", e),
        }

        let master = elect_master(&self.roster);
        let me = self.roster.self_entry_mut();
        if me.is_master != master {
            info!(
                "{} master (lux {})",
                if master { "Became" } else { "No longer" },
                me.lux
            );
        }
        me.is_master = master;

        if let Err(e) = self.indicator.set_indicator(master) {
            warn!("Indicator update failed: {}", e);
        }
        master
    }

    /// Broadcast the self-entry. Failures wait for the next period.
    pub async fn disseminate(&mut self, now: Millis) {
        let mut me = *self.roster.self_entry();
        me.last_seen = now;
        let bytes = wire::encode(&Packet::UpdateColor(me));
        match self.transport.send(&bytes, self.group, self.port).await {
            Ok(()) => debug!("Sent update (lux {}, master {})", me.lux, me.is_master),
            Err(e) => warn!("Failed to send update to {}:{}: {}", self.group, self.port, e),
        }
    }

    /// The diagnostic device listing, once per `list_interval`. `None` when
    /// the period has not elapsed or listing is turned off.
    pub fn device_listing(&mut self, now: Millis) -> Option<Vec<String>> {
        if self.list_interval == 0 || now.saturating_sub(self.last_listed) <= self.list_interval {
            return None;
        }
        self.last_listed = now;

        let mut lines = vec![format!("Device list ({} entries):", self.roster.len())];
        lines.extend(self.roster.iter().map(|device| {
            format!(
                "  {:<15} master={:<5} lux={:<5} temp={:<5} age={}ms",
                device.identity,
                device.is_master,
                device.lux,
                device.temperature,
                device.age(now)
            )
        }));
        Some(lines)
    }
}

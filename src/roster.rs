//! The roster of known devices.
//!
//! Backed by a `Vec` whose first element is always the local device. The
//! roster is small (tens of entries at most), so lookups are a linear scan
//! on identity.

use std::net::Ipv4Addr;

use crate::error::{Result, SwarmError};
use crate::types::{DeviceRecord, Millis};

#[derive(Debug, Clone)]
pub struct Roster {
    devices: Vec<DeviceRecord>,
    capacity: usize,
}

impl Roster {
    /// Create a roster holding only the self-entry. `capacity` counts the
    /// self-entry and is clamped to at least one.
    pub fn new(self_identity: Ipv4Addr, capacity: usize, now: Millis) -> Self {
        let mut me = DeviceRecord::new(self_identity);
        me.last_seen = now;
        Self {
            devices: vec![me],
            capacity: capacity.max(1),
        }
    }

    pub fn self_identity(&self) -> Ipv4Addr {
        self.devices[0].identity
    }

    pub fn self_entry(&self) -> &DeviceRecord {
        &self.devices[0]
    }

    pub(crate) fn self_entry_mut(&mut self) -> &mut DeviceRecord {
        &mut self.devices[0]
    }

    /// Every entry other than self, in insertion order.
    pub fn peers(&self) -> &[DeviceRecord] {
        &self.devices[1..]
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.devices.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn find(&self, identity: Ipv4Addr) -> Option<&DeviceRecord> {
        self.devices.iter().find(|d| d.identity == identity)
    }

    fn position(&self, identity: Ipv4Addr) -> Option<usize> {
        self.devices.iter().position(|d| d.identity == identity)
    }

    /// Append a new peer stamped with `now`. Rejected when the identity is
    /// already present or the roster is full; the roster is left unchanged.
    pub fn insert(&mut self, record: DeviceRecord, now: Millis) -> Result<()> {
        if self.find(record.identity).is_some() {
            return Err(SwarmError::DuplicateDevice(record.identity));
        }
        if self.devices.len() >= self.capacity {
            return Err(SwarmError::CapacityExhausted(self.capacity));
        }
        let mut record = record;
        record.last_seen = now;
        self.devices.push(record);
        Ok(())
    }

    /// Overwrite every field of the entry matching `fields.identity` and
    /// stamp it with `now`.
    pub fn update(&mut self, fields: &DeviceRecord, now: Millis) -> Result<()> {
        let at = self
            .position(fields.identity)
            .ok_or(SwarmError::DeviceNotFound(fields.identity))?;
        let entry = &mut self.devices[at];
        entry.is_master = fields.is_master;
        entry.channels = fields.channels;
        entry.temperature = fields.temperature;
        entry.lux = fields.lux;
        entry.last_seen = now;
        Ok(())
    }

    pub fn remove(&mut self, identity: Ipv4Addr) -> Result<DeviceRecord> {
        match self.position(identity) {
            Some(0) => Err(SwarmError::SelfEntry),
            Some(at) => Ok(self.devices.remove(at)),
            None => Err(SwarmError::DeviceNotFound(identity)),
        }
    }

    /// Drop every peer whose age is strictly greater than `timeout` and
    /// return what was dropped. The self-entry is never considered.
    pub fn evict_older_than(&mut self, timeout: Millis, now: Millis) -> Vec<DeviceRecord> {
        let stale: Vec<Ipv4Addr> = self
            .peers()
            .iter()
            .filter(|d| d.age(now) > timeout)
            .map(|d| d.identity)
            .collect();
        stale
            .into_iter()
            .filter_map(|identity| self.remove(identity).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ME: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);

    fn peer(last_octet: u8, lux: u16) -> DeviceRecord {
        let mut record = DeviceRecord::new(Ipv4Addr::new(10, 0, 0, last_octet));
        record.lux = lux;
        record
    }

    #[test]
    fn starts_with_only_self() {
        let roster = Roster::new(ME, 8, 100);
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.self_identity(), ME);
        assert_eq!(roster.self_entry().last_seen, 100);
        assert!(roster.peers().is_empty());
    }

    #[test]
    fn insert_rejects_duplicates() {
        let mut roster = Roster::new(ME, 8, 0);
        roster.insert(peer(2, 10), 5).unwrap();
        let err = roster.insert(peer(2, 99), 6).unwrap_err();
        assert!(matches!(err, SwarmError::DuplicateDevice(ip) if ip == Ipv4Addr::new(10, 0, 0, 2)));
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.find(Ipv4Addr::new(10, 0, 0, 2)).unwrap().lux, 10);

        assert!(matches!(
            roster.insert(DeviceRecord::new(ME), 7),
            Err(SwarmError::DuplicateDevice(_))
        ));
    }

    #[test]
    fn identities_stay_unique_under_repeated_inserts() {
        let mut roster = Roster::new(ME, 64, 0);
        for round in 0..3u8 {
            for octet in 1..=10u8 {
                let _ = roster.insert(peer(octet, round as u16), round as u64);
            }
        }
        let mut seen: Vec<_> = roster.iter().map(|d| d.identity).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), roster.len());
        assert_eq!(roster.len(), 10);
    }

    #[test]
    fn insert_stamps_local_clock() {
        let mut roster = Roster::new(ME, 8, 0);
        let mut record = peer(2, 10);
        record.last_seen = 123_456;
        roster.insert(record, 42).unwrap();
        assert_eq!(roster.find(record.identity).unwrap().last_seen, 42);
    }

    #[test]
    fn insert_fails_when_full() {
        let mut roster = Roster::new(ME, 2, 0);
        roster.insert(peer(2, 10), 0).unwrap();
        assert!(matches!(
            roster.insert(peer(3, 10), 0),
            Err(SwarmError::CapacityExhausted(2))
        ));
        assert_eq!(roster.len(), 2);
        assert!(roster.find(Ipv4Addr::new(10, 0, 0, 3)).is_none());
    }

    #[test]
    fn update_overwrites_fields_and_refreshes() {
        let mut roster = Roster::new(ME, 8, 0);
        roster.insert(peer(2, 10), 0).unwrap();

        let mut fresh = peer(2, 77);
        fresh.is_master = true;
        fresh.temperature = 4000;
        fresh.channels.c = 9;
        fresh.last_seen = 1;
        roster.update(&fresh, 500).unwrap();

        let entry = roster.find(fresh.identity).unwrap();
        assert_eq!(entry.lux, 77);
        assert!(entry.is_master);
        assert_eq!(entry.temperature, 4000);
        assert_eq!(entry.channels.c, 9);
        assert_eq!(entry.last_seen, 500);
    }

    #[test]
    fn update_of_unknown_device_is_not_found() {
        let mut roster = Roster::new(ME, 8, 0);
        assert!(matches!(
            roster.update(&peer(9, 1), 0),
            Err(SwarmError::DeviceNotFound(_))
        ));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn remove_keeps_self() {
        let mut roster = Roster::new(ME, 8, 0);
        roster.insert(peer(2, 10), 0).unwrap();
        roster.insert(peer(3, 10), 0).unwrap();

        assert!(matches!(roster.remove(ME), Err(SwarmError::SelfEntry)));
        assert_eq!(roster.remove(Ipv4Addr::new(10, 0, 0, 2)).unwrap().identity.octets()[3], 2);
        assert!(matches!(
            roster.remove(Ipv4Addr::new(10, 0, 0, 2)),
            Err(SwarmError::DeviceNotFound(_))
        ));
        let left: Vec<_> = roster.iter().map(|d| d.identity.octets()[3]).collect();
        assert_eq!(left, vec![1, 3]);
    }

    #[test]
    fn eviction_drops_only_stale_peers() {
        let mut roster = Roster::new(ME, 8, 0);
        roster.insert(peer(2, 10), 0).unwrap();
        roster.insert(peer(3, 20), 3000).unwrap();
        roster.insert(peer(4, 30), 0).unwrap();
        let young_before = *roster.find(Ipv4Addr::new(10, 0, 0, 3)).unwrap();

        let evicted = roster.evict_older_than(5000, 5001);

        let gone: Vec<_> = evicted.iter().map(|d| d.identity.octets()[3]).collect();
        assert_eq!(gone, vec![2, 4]);
        assert_eq!(roster.len(), 2);
        assert_eq!(*roster.find(Ipv4Addr::new(10, 0, 0, 3)).unwrap(), young_before);
    }

    #[test]
    fn eviction_boundary_is_strict() {
        let mut roster = Roster::new(ME, 8, 0);
        roster.insert(peer(2, 10), 0).unwrap();
        assert!(roster.evict_older_than(5000, 5000).is_empty());
        assert_eq!(roster.evict_older_than(5000, 5001).len(), 1);
    }

    #[test]
    fn self_survives_any_number_of_passes() {
        let mut roster = Roster::new(ME, 8, 0);
        for now in [10_000, 1_000_000, u64::MAX] {
            roster.evict_older_than(5000, now);
            assert_eq!(roster.self_identity(), ME);
            assert_eq!(roster.len(), 1);
        }
    }
}

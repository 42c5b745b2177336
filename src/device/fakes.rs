//! In-memory collaborators for driving a [`Swarm`](crate::swarm::Swarm)
//! without a network, sensor or LED. Clones share state, so a test can keep
//! one handle while the swarm owns another.

use std::collections::VecDeque;
use std::io;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{AmbientSensor, Indicator, Transport};
use crate::types::{Channels, Packet, Reading};
use crate::wire::encode;

#[derive(Default, Clone)]
pub(crate) struct FakeNet {
    pub inbox: Arc<Mutex<VecDeque<Vec<u8>>>>,
    pub sent: Arc<Mutex<Vec<(Vec<u8>, Ipv4Addr, u16)>>>,
    pub joined: Arc<Mutex<Vec<(Ipv4Addr, u16)>>>,
    pub fail_sends: Arc<Mutex<bool>>,
}

impl FakeNet {
    pub fn deliver(&self, packet: &Packet) {
        self.inbox.lock().unwrap().push_back(encode(packet).to_vec());
    }

    pub fn deliver_raw(&self, bytes: &[u8]) {
        self.inbox.lock().unwrap().push_back(bytes.to_vec());
    }

    pub fn sent(&self) -> Vec<(Vec<u8>, Ipv4Addr, u16)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeNet {
    fn join_multicast_group(&mut self, group: Ipv4Addr, port: u16) -> io::Result<()> {
        self.joined.lock().unwrap().push((group, port));
        Ok(())
    }

    async fn send(&self, bytes: &[u8], group: Ipv4Addr, port: u16) -> io::Result<()> {
        if *self.fail_sends.lock().unwrap() {
            return Err(io::Error::new(io::ErrorKind::Other, "network down"));
        }
        self.sent.lock().unwrap().push((bytes.to_vec(), group, port));
        Ok(())
    }

    fn try_receive(&mut self) -> io::Result<Option<Vec<u8>>> {
        Ok(self.inbox.lock().unwrap().pop_front())
    }
}

/// Reports a settable lux value directly; `None` makes reads fail.
#[derive(Clone)]
pub(crate) struct FakeSensor {
    lux: Arc<Mutex<Option<u16>>>,
}

impl FakeSensor {
    pub fn new(lux: u16) -> Self {
        Self {
            lux: Arc::new(Mutex::new(Some(lux))),
        }
    }

    pub fn set(&self, lux: Option<u16>) {
        *self.lux.lock().unwrap() = lux;
    }
}

impl AmbientSensor for FakeSensor {
    fn read_ambient(&mut self) -> io::Result<Reading> {
        match *self.lux.lock().unwrap() {
            Some(lux) => Ok(Reading {
                channels: Channels {
                    r: 1,
                    g: 2,
                    b: 3,
                    c: lux,
                },
                temperature: 3000,
                lux,
            }),
            None => Err(io::Error::new(io::ErrorKind::Other, "sensor unplugged")),
        }
    }
}

#[derive(Default, Clone)]
pub(crate) struct FakeLed {
    pub states: Arc<Mutex<Vec<bool>>>,
}

impl Indicator for FakeLed {
    fn set_indicator(&mut self, active: bool) -> io::Result<()> {
        self.states.lock().unwrap().push(active);
        Ok(())
    }
}

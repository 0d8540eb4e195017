use std::collections::HashMap;
use std::net::Ipv4Addr;

use kasa::canonical_mac;
use log::warn;

use crate::{Error, Result};

/// MAC address to logical identity. Immutable once loaded.
#[derive(Clone, Debug, Default)]
pub struct IdentityMap {
    identities: HashMap<String, String>,
}

impl IdentityMap {
    pub fn resolve(&self, mac: &str) -> Result<&str> {
        self.identities
            .get(&canonical_mac(mac))
            .map(String::as_str)
            .ok_or_else(|| Error::UnknownDevice(mac.to_string()))
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

impl FromIterator<(String, String)> for IdentityMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let identities = iter
            .into_iter()
            .map(|(mac, identity)| (canonical_mac(&mac), identity))
            .collect();

        Self { identities }
    }
}

/// Identity to the last address it answered from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IpCache {
    ips: HashMap<String, Ipv4Addr>,
}

impl IpCache {
    pub fn contains_ip(&self, ip: Ipv4Addr) -> bool {
        self.ips.values().any(|cached| *cached == ip)
    }

    pub fn get(&self, identity: &str) -> Option<Ipv4Addr> {
        self.ips.get(identity).copied()
    }

    pub fn insert(&mut self, identity: &str, ip: Ipv4Addr) -> Option<Ipv4Addr> {
        self.ips.insert(identity.to_string(), ip)
    }

    pub fn len(&self) -> usize {
        self.ips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ips.is_empty()
    }
}

impl FromIterator<(String, String)> for IpCache {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let ips = iter
            .into_iter()
            .filter_map(|(identity, ip)| match ip.parse() {
                Ok(ip) => Some((identity, ip)),
                Err(_) => {
                    warn!("ignoring cached address {ip} of {identity}");
                    None
                }
            })
            .collect();

        Self { ips }
    }
}

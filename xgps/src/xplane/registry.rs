//! Instances found during a discovery sweep.

use std::collections::HashMap;
use std::net::SocketAddr;

use super::beacon::BeaconInfo;

/// Simulator instances keyed by their endpoint.
///
/// The first beacon seen for an endpoint wins; later beacons from the same
/// address never overwrite it.
#[derive(Debug, Default, Clone)]
pub struct DiscoveredInstances {
    instances: HashMap<String, BeaconInfo>,
}

impl DiscoveredInstances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a beacon. Returns `false` if the endpoint was already known.
    pub fn add(&mut self, beacon: BeaconInfo) -> bool {
        let key = beacon.endpoint().to_string();
        if self.instances.contains_key(&key) {
            return false;
        }
        self.instances.insert(key, beacon);
        true
    }

    /// Human-readable identifiers, one per instance, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .instances
            .iter()
            .map(|(endpoint, beacon)| format!("{} ({})", endpoint, beacon))
            .collect();
        ids.sort();
        ids
    }

    /// Look up an instance by endpoint string or by an identifier from
    /// [`list`](Self::list).
    pub fn find(&self, id: &str) -> Option<SocketAddr> {
        let key = id.split_whitespace().next().unwrap_or(id);
        self.instances.get(key).map(BeaconInfo::endpoint)
    }

    pub fn get(&self, endpoint: &str) -> Option<&BeaconInfo> {
        self.instances.get(endpoint)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BeaconInfo> {
        self.instances.values()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

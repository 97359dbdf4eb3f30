//! Lock-guarded registry of discovered media servers.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::device::ServerDevice;

/// The set of media servers seen during the current discovery session,
/// keyed by UDN.
///
/// The registry is the single piece of shared mutable state between the
/// discovery worker and the dialog thread; every operation takes one lock
/// for as short a critical section as possible. Entries are insertion-only
/// within a session: a device leaving the network does not remove it, the
/// list is instead rebuilt wholesale when the next session starts.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    entries: Mutex<HashMap<String, ServerDevice>>,
}

impl DeviceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all entries. Called before a new search starts.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    /// Insert a device unless its UDN is already present.
    ///
    /// First-seen wins: devices re-advertise periodically, and a duplicate
    /// must never overwrite the stored fields. Returns whether the device
    /// was newly inserted.
    pub fn insert_if_absent(&self, device: ServerDevice) -> bool {
        let Ok(mut entries) = self.entries.lock() else {
            return false;
        };

        match entries.entry(device.udn.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(device);
                true
            }
        }
    }

    /// Look up a device by UDN.
    pub fn get(&self, udn: &str) -> Option<ServerDevice> {
        self.entries.lock().ok()?.get(udn).cloned()
    }

    /// Copy out the current entries, ordered by friendly name for stable
    /// rendering. The copy never exposes references that could be mutated
    /// while the dialog iterates.
    pub fn snapshot(&self) -> Vec<ServerDevice> {
        let mut devices: Vec<ServerDevice> = self
            .entries
            .lock()
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default();

        // sorted outside the lock
        devices.sort_by(|a, b| {
            a.friendly_name
                .cmp(&b.friendly_name)
                .then_with(|| a.udn.cmp(&b.udn))
        });
        devices
    }

    /// Number of devices currently listed.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Whether no devices have been seen yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn server(udn: &str, name: &str) -> ServerDevice {
        ServerDevice {
            udn: udn.to_string(),
            device_type: crate::device::MEDIA_SERVER_DEVICE_TYPE.to_string(),
            friendly_name: name.to_string(),
            base_url: "http://192.168.1.2:8200/".to_string(),
            presentation_url: None,
        }
    }

    #[test]
    fn distinct_udns_all_inserted() {
        let registry = DeviceRegistry::new();
        for i in 0..5 {
            assert!(registry.insert_if_absent(server(&format!("uuid:{i}"), "Server")));
        }
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn first_seen_wins() {
        let registry = DeviceRegistry::new();
        assert!(registry.insert_if_absent(server("udn-1", "First name")));
        assert!(!registry.insert_if_absent(server("udn-1", "Second name")));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("udn-1").unwrap().friendly_name, "First name");
    }

    #[test]
    fn clear_empties_the_registry() {
        let registry = DeviceRegistry::new();
        registry.insert_if_absent(server("udn-1", "A"));
        registry.insert_if_absent(server("udn-2", "B"));

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.snapshot().is_empty());
        assert!(registry.get("udn-1").is_none());
    }

    #[test]
    fn snapshot_is_ordered_by_friendly_name() {
        let registry = DeviceRegistry::new();
        registry.insert_if_absent(server("udn-2", "Zimmer"));
        registry.insert_if_absent(server("udn-1", "Attic"));
        registry.insert_if_absent(server("udn-3", "Kitchen"));

        let names: Vec<_> = registry
            .snapshot()
            .into_iter()
            .map(|d| d.friendly_name)
            .collect();
        assert_eq!(names, ["Attic", "Kitchen", "Zimmer"]);
    }

    #[test]
    fn snapshot_is_a_copy() {
        let registry = DeviceRegistry::new();
        registry.insert_if_absent(server("udn-1", "A"));

        let snapshot = registry.snapshot();
        registry.clear();
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn concurrent_inserts_lose_no_updates() {
        let registry = Arc::new(DeviceRegistry::new());
        let threads: Vec<_> = (0..8)
            .map(|t| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let udn = format!("uuid:thread-{t}-device-{i}");
                        assert!(registry.insert_if_absent(server(&udn, "Server")));
                    }
                })
            })
            .collect();

        for handle in threads {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 8 * 50);
    }
}

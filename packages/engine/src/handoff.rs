//! One-shot result-set handoff from another screen.
//!
//! When the map screen is opened from the recommendation overview, the
//! upstream screen leaves a selected result list (and optionally the
//! user location) in external key-value storage. The payload is read
//! once and deleted, so a page refresh starts clean.

use dine_map_models::{Coordinate, PreloadedEntry};

use crate::providers::KeyValueStore;

/// Storage key for the handed-off result list.
pub const SELECTED_RESULTS_KEY: &str = "selectedRestaurants";

/// Storage key for the handed-off user location.
pub const USER_LOCATION_KEY: &str = "userLocation";

/// A handoff payload read from external storage.
#[derive(Debug, Clone, PartialEq)]
pub struct HandoffPayload {
    /// The pre-selected result list, in upstream rank order.
    pub entries: Vec<PreloadedEntry>,
    /// The user location, when the upstream screen had one.
    pub user_location: Option<Coordinate>,
}

/// Reads and consumes the handoff payload, if one is present.
///
/// Both keys are deleted after a successful read. A malformed payload
/// is logged and treated as absent rather than failing the bootstrap;
/// a malformed location degrades to a payload without one.
#[must_use]
pub fn take_handoff(kv: &dyn KeyValueStore) -> Option<HandoffPayload> {
    let raw_entries = kv.get(SELECTED_RESULTS_KEY)?;
    let entries: Vec<PreloadedEntry> = match serde_json::from_str(&raw_entries) {
        Ok(entries) => entries,
        Err(err) => {
            log::error!("Discarding malformed handoff payload: {err}");
            kv.delete(SELECTED_RESULTS_KEY);
            return None;
        }
    };
    kv.delete(SELECTED_RESULTS_KEY);

    let user_location = kv.get(USER_LOCATION_KEY).and_then(|raw| {
        match serde_json::from_str::<Coordinate>(&raw) {
            Ok(location) => {
                kv.delete(USER_LOCATION_KEY);
                Some(location)
            }
            Err(err) => {
                log::error!("Discarding malformed handoff location: {err}");
                kv.delete(USER_LOCATION_KEY);
                None
            }
        }
    });

    log::info!(
        "Loaded handoff payload: {} entries, location {}",
        entries.len(),
        if user_location.is_some() {
            "known"
        } else {
            "unknown"
        }
    );
    Some(HandoffPayload {
        entries,
        user_location,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        values: Mutex<HashMap<String, String>>,
    }

    impl KeyValueStore for MemoryStore {
        fn get(&self, key: &str) -> Option<String> {
            self.values.lock().unwrap().get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) {
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
        }

        fn delete(&self, key: &str) {
            self.values.lock().unwrap().remove(key);
        }
    }

    #[test]
    fn reads_and_consumes_payload() {
        let kv = MemoryStore::default();
        kv.set(
            SELECTED_RESULTS_KEY,
            r#"[{"placeId": "p1", "name": "Giulia", "latitude": 42.37, "longitude": -71.11}]"#,
        );
        kv.set(USER_LOCATION_KEY, r#"{"lat": 42.3601, "lng": -71.0589}"#);

        let payload = take_handoff(&kv).unwrap();
        assert_eq!(payload.entries.len(), 1);
        assert_eq!(payload.entries[0].place_id, "p1");
        assert!(payload.user_location.is_some());

        // One-shot: a second read finds nothing.
        assert!(take_handoff(&kv).is_none());
    }

    #[test]
    fn absent_payload_is_none() {
        let kv = MemoryStore::default();
        assert!(take_handoff(&kv).is_none());
    }

    #[test]
    fn malformed_entries_are_discarded() {
        let kv = MemoryStore::default();
        kv.set(SELECTED_RESULTS_KEY, "{ not json");
        assert!(take_handoff(&kv).is_none());
        assert!(kv.get(SELECTED_RESULTS_KEY).is_none());
    }

    #[test]
    fn malformed_location_degrades_to_no_location() {
        let kv = MemoryStore::default();
        kv.set(SELECTED_RESULTS_KEY, r#"[{"placeId": "p1", "name": "Giulia"}]"#);
        kv.set(USER_LOCATION_KEY, "not json");

        let payload = take_handoff(&kv).unwrap();
        assert!(payload.user_location.is_none());
    }
}

//! Marker reconciliation against the viewport-visible subset.

use std::collections::HashMap;
use std::sync::Arc;

use dine_map_models::{MarkerLabel, MarkerStyle, ResultEntry};

use crate::providers::{MarkerFactory, MarkerHandle, SelectCallback};

/// Counts from one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncOutcome {
    /// Markers created this pass.
    pub created: usize,
    /// Markers destroyed this pass.
    pub destroyed: usize,
    /// Entries skipped because marker creation failed.
    pub skipped: usize,
}

/// Owns the id→marker mapping and keeps it equal to the visible
/// subset.
///
/// Every entry leaving the visible subset has its handle destroyed;
/// every entry joining it gets a marker styled by the rating rule with
/// a truncated name label and a click handler that forwards the entry
/// to the registered selection callback. No business state lives here
/// beyond the handle map itself.
pub struct MarkerLifecycleManager {
    factory: Arc<dyn MarkerFactory>,
    on_select: SelectCallback,
    handles: HashMap<String, Box<dyn MarkerHandle>>,
}

impl MarkerLifecycleManager {
    /// Creates a manager with no live markers.
    #[must_use]
    pub fn new(factory: Arc<dyn MarkerFactory>, on_select: SelectCallback) -> Self {
        Self {
            factory,
            on_select,
            handles: HashMap::new(),
        }
    }

    /// Reconciles live markers against `visible`: stale handles are
    /// destroyed first, then missing markers are created. A single
    /// entry whose marker creation fails is skipped with a warning and
    /// never aborts the pass.
    pub fn sync(&mut self, visible: &[ResultEntry]) -> SyncOutcome {
        let mut outcome = self.destroy_stale(visible);
        for entry in visible {
            if self.handles.contains_key(&entry.id) {
                continue;
            }
            self.create(
                entry,
                MarkerStyle::for_entry(entry),
                MarkerLabel::name(&entry.name),
                &mut outcome,
            );
        }
        log::debug!(
            "Marker sync: {} created, {} destroyed, {} skipped, {} live",
            outcome.created,
            outcome.destroyed,
            outcome.skipped,
            self.handles.len()
        );
        outcome
    }

    /// Reconciles ranked markers: every entry with coordinates gets a
    /// rank-numbered marker with the entrance animation cue. Rank is
    /// the 1-based position in `entries`, so re-running the pass after
    /// a coordinate backfill creates only the newly resolved members.
    pub fn sync_ranked(&mut self, entries: &[ResultEntry]) -> SyncOutcome {
        let mut outcome = self.destroy_stale(entries);
        for (index, entry) in entries.iter().enumerate() {
            if entry.coordinates.is_none() || self.handles.contains_key(&entry.id) {
                continue;
            }
            #[allow(clippy::cast_possible_truncation)]
            let rank = (index + 1) as u32;
            self.create(
                entry,
                MarkerStyle::ranked(),
                MarkerLabel::Rank(rank),
                &mut outcome,
            );
        }
        outcome
    }

    /// Destroys every live marker (wholesale result-set teardown).
    pub fn clear(&mut self) {
        let count = self.handles.len();
        for (_, handle) in self.handles.drain() {
            self.factory.destroy(handle);
        }
        if count > 0 {
            log::debug!("Cleared {count} markers");
        }
    }

    /// Number of live markers.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` if a marker is live for `id`.
    #[must_use]
    pub fn has_marker(&self, id: &str) -> bool {
        self.handles.contains_key(id)
    }

    fn destroy_stale(&mut self, wanted: &[ResultEntry]) -> SyncOutcome {
        let stale: Vec<String> = self
            .handles
            .keys()
            .filter(|id| !wanted.iter().any(|e| &&e.id == id))
            .cloned()
            .collect();
        let mut outcome = SyncOutcome::default();
        for id in stale {
            if let Some(handle) = self.handles.remove(&id) {
                self.factory.destroy(handle);
                outcome.destroyed += 1;
            }
        }
        outcome
    }

    fn create(
        &mut self,
        entry: &ResultEntry,
        style: MarkerStyle,
        label: MarkerLabel,
        outcome: &mut SyncOutcome,
    ) {
        let Some(coordinate) = entry.coordinates else {
            return;
        };
        let on_select = Arc::clone(&self.on_select);
        let clicked = entry.clone();
        let on_click = Box::new(move || (*on_select)(clicked.clone()));
        match self.factory.create_marker(coordinate, style, label, on_click) {
            Ok(handle) => {
                self.handles.insert(entry.id.clone(), handle);
                outcome.created += 1;
            }
            Err(err) => {
                log::warn!("Skipping marker for {}: {err}", entry.id);
                outcome.skipped += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineError;
    use crate::providers::ClickHandler;
    use dine_map_models::Coordinate;
    use std::sync::Mutex;

    /// Records create/destroy events; rejects labels listed in `reject`.
    struct RecordingFactory {
        events: Arc<Mutex<Vec<String>>>,
        reject: Vec<String>,
    }

    /// Logs its own destruction, so destroy ordering is observable.
    struct TestHandle {
        label: String,
        events: Arc<Mutex<Vec<String>>>,
    }

    impl MarkerHandle for TestHandle {}

    impl Drop for TestHandle {
        fn drop(&mut self) {
            self.events
                .lock()
                .unwrap()
                .push(format!("destroy {}", self.label));
        }
    }

    impl RecordingFactory {
        fn new(reject: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                events: Arc::new(Mutex::new(Vec::new())),
                reject: reject.iter().map(ToString::to_string).collect(),
            })
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl MarkerFactory for RecordingFactory {
        fn create_marker(
            &self,
            _coordinate: Coordinate,
            _style: MarkerStyle,
            label: MarkerLabel,
            _on_click: ClickHandler,
        ) -> Result<Box<dyn MarkerHandle>, EngineError> {
            let text = label.text();
            if self.reject.iter().any(|r| text.starts_with(r.as_str())) {
                return Err(EngineError::unavailable("bad coordinates"));
            }
            self.events.lock().unwrap().push(format!("create {text}"));
            Ok(Box::new(TestHandle {
                label: text,
                events: Arc::clone(&self.events),
            }))
        }

        fn destroy(&self, handle: Box<dyn MarkerHandle>) {
            drop(handle);
        }
    }

    fn entry(id: &str, name: &str) -> ResultEntry {
        let mut entry = ResultEntry::new(id, name);
        entry.coordinates = Some(Coordinate::new(42.36, -71.06));
        entry
    }

    fn manager(factory: &Arc<RecordingFactory>) -> MarkerLifecycleManager {
        MarkerLifecycleManager::new(Arc::clone(factory) as Arc<dyn MarkerFactory>, Arc::new(|_| {}))
    }

    #[test]
    fn sync_matches_visible_set_exactly() {
        let factory = RecordingFactory::new(&[]);
        let mut manager = manager(&factory);

        manager.sync(&[entry("a", "A"), entry("b", "B")]);
        assert_eq!(manager.live_count(), 2);

        let outcome = manager.sync(&[entry("b", "B"), entry("c", "C")]);
        assert_eq!(outcome.created, 1);
        assert_eq!(outcome.destroyed, 1);
        assert!(manager.has_marker("b"));
        assert!(manager.has_marker("c"));
        assert!(!manager.has_marker("a"));
    }

    #[test]
    fn sync_is_idempotent() {
        let factory = RecordingFactory::new(&[]);
        let mut manager = manager(&factory);
        let visible = [entry("a", "A")];

        manager.sync(&visible);
        let outcome = manager.sync(&visible);
        assert_eq!(outcome, SyncOutcome::default());
    }

    #[test]
    fn creation_failure_skips_entry_and_continues() {
        let factory = RecordingFactory::new(&["Bad"]);
        let mut manager = manager(&factory);

        let outcome = manager.sync(&[entry("bad", "Bad Place"), entry("ok", "Fine Place")]);
        assert_eq!(outcome.created, 1);
        assert_eq!(outcome.skipped, 1);
        assert!(manager.has_marker("ok"));
        assert!(!manager.has_marker("bad"));
    }

    #[test]
    fn stale_markers_destroyed_before_new_ones_created() {
        let factory = RecordingFactory::new(&[]);
        let mut manager = manager(&factory);

        manager.sync(&[entry("a", "A")]);
        manager.sync(&[entry("b", "B")]);

        assert_eq!(factory.events(), vec!["create A", "destroy A", "create B"]);
    }

    #[test]
    fn ranked_sync_numbers_by_position_and_skips_unresolved() {
        let factory = RecordingFactory::new(&[]);
        let mut manager = manager(&factory);

        let mut pending = ResultEntry::new("pending", "Pending");
        pending.coordinates = None;
        let outcome = manager.sync_ranked(&[entry("a", "A"), pending.clone(), entry("c", "C")]);
        assert_eq!(outcome.created, 2);
        assert_eq!(factory.events(), vec!["create 1", "create 3"]);

        // Backfill resolves the middle entry; only rank 2 is added.
        let resolved = entry("pending", "Pending");
        manager.sync_ranked(&[entry("a", "A"), resolved, entry("c", "C")]);
        assert_eq!(
            factory.events(),
            vec!["create 1", "create 3", "create 2"]
        );
    }

    #[test]
    fn clear_destroys_everything() {
        let factory = RecordingFactory::new(&[]);
        let mut manager = manager(&factory);
        manager.sync(&[entry("a", "A"), entry("b", "B")]);

        manager.clear();
        assert_eq!(manager.live_count(), 0);
        let destroys = factory
            .events()
            .iter()
            .filter(|e| e.starts_with("destroy"))
            .count();
        assert_eq!(destroys, 2);
    }
}

//! The result collection and its viewport-visible subset.

use dine_map_models::{Coordinate, LatLngBounds, ResultEntry};

/// Holds the full result collection, the user location, and the
/// viewport-visible subset that drives marker rendering and the side
/// panel.
///
/// The collection is replaced wholesale on every new search or preload
/// and never diffed incrementally. Viewport recomputes always read the
/// live collection, so a visible subset can never be derived from a
/// stale snapshot. Ranked sets (recommendation handoffs) bypass the
/// viewport filter entirely and are always visible in full, in rank
/// order.
#[derive(Default)]
pub struct ResultStore {
    entries: Vec<ResultEntry>,
    visible: Vec<ResultEntry>,
    viewport: Option<LatLngBounds>,
    user_location: Option<Coordinate>,
    ranked: bool,
    generation: u64,
}

impl ResultStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the full collection unconditionally with a live-search
    /// result set.
    pub fn set_results(&mut self, entries: Vec<ResultEntry>) {
        self.replace(entries, false);
    }

    /// Replaces the full collection with a ranked set; rank is the
    /// 1-based list position.
    pub fn set_ranked_results(&mut self, entries: Vec<ResultEntry>) {
        self.replace(entries, true);
    }

    fn replace(&mut self, entries: Vec<ResultEntry>, ranked: bool) {
        self.generation += 1;
        self.entries = entries;
        self.ranked = ranked;
        self.recompute();
    }

    /// Folds later data for one place into the collection by id; an
    /// unknown id is appended. Recomputes visibility, since a merge can
    /// backfill the coordinates that gate it.
    pub fn merge_entry(&mut self, incoming: &ResultEntry) {
        match self.entries.iter_mut().find(|e| e.id == incoming.id) {
            Some(existing) => existing.merge(incoming),
            None => self.entries.push(incoming.clone()),
        }
        self.recompute();
    }

    /// Records the current viewport and recomputes the visible subset
    /// from the live collection.
    pub fn set_viewport(&mut self, bounds: LatLngBounds) {
        self.viewport = Some(bounds);
        self.recompute();
    }

    /// Records the user location.
    pub fn set_user_location(&mut self, location: Coordinate) {
        self.user_location = Some(location);
    }

    fn recompute(&mut self) {
        self.visible = match (self.ranked, self.viewport) {
            // Ranked sets are always shown in full.
            (true, _) | (false, None) => self
                .entries
                .iter()
                .filter(|e| e.coordinates.is_some())
                .cloned()
                .collect(),
            (false, Some(bounds)) => self
                .entries
                .iter()
                .filter(|e| e.coordinates.is_some_and(|c| bounds.contains(c)))
                .cloned()
                .collect(),
        };
    }

    /// The viewport-visible subset — the single source of truth for
    /// marker rendering and the side-panel list.
    #[must_use]
    pub fn visible(&self) -> &[ResultEntry] {
        &self.visible
    }

    /// The full collection, in provider (or rank) order.
    #[must_use]
    pub fn entries(&self) -> &[ResultEntry] {
        &self.entries
    }

    /// The user location, when known.
    #[must_use]
    pub const fn user_location(&self) -> Option<Coordinate> {
        self.user_location
    }

    /// Whether the current set is a ranked handoff set.
    #[must_use]
    pub const fn is_ranked(&self) -> bool {
        self.ranked
    }

    /// Monotonic counter bumped on every wholesale replacement. Late
    /// async work captures it to detect that its result set is stale.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Every coordinate known to the collection, plus the user
    /// location when present (the fit-bounds point set for ranked
    /// sets).
    #[must_use]
    pub fn fit_points(&self) -> Vec<Coordinate> {
        let mut points: Vec<Coordinate> =
            self.entries.iter().filter_map(|e| e.coordinates).collect();
        if let Some(location) = self.user_location {
            points.push(location);
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dine_map_models::Coordinate;

    fn entry(id: &str, coords: Option<(f64, f64)>) -> ResultEntry {
        let mut entry = ResultEntry::new(id, id.to_uppercase());
        entry.coordinates = coords.map(|(lat, lng)| Coordinate::new(lat, lng));
        entry
    }

    fn downtown_bounds() -> LatLngBounds {
        LatLngBounds::new(
            Coordinate::new(42.35, -71.07),
            Coordinate::new(42.37, -71.05),
        )
    }

    #[test]
    fn viewport_filters_to_bounds() {
        let mut store = ResultStore::new();
        store.set_results(vec![
            entry("inside", Some((42.3601, -71.0589))),
            entry("outside", Some((42.50, -71.0589))),
            entry("unresolved", None),
        ]);
        store.set_viewport(downtown_bounds());

        let ids: Vec<&str> = store.visible().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["inside"]);
    }

    #[test]
    fn viewport_recompute_reads_live_entries() {
        let mut store = ResultStore::new();
        store.set_results(vec![entry("old", Some((42.3601, -71.0589)))]);
        store.set_viewport(downtown_bounds());
        assert_eq!(store.visible().len(), 1);

        // A wholesale replacement recomputes against the same viewport
        // without needing a new viewport event.
        store.set_results(vec![entry("new", Some((42.3601, -71.06)))]);
        let ids: Vec<&str> = store.visible().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["new"]);
    }

    #[test]
    fn ranked_sets_bypass_viewport() {
        let mut store = ResultStore::new();
        store.set_viewport(downtown_bounds());
        store.set_ranked_results(vec![
            entry("first", Some((42.3601, -71.0589))),
            entry("far-away", Some((40.7128, -74.0060))),
            entry("pending", None),
        ]);

        let ids: Vec<&str> = store.visible().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "far-away"]);
    }

    #[test]
    fn merge_backfills_coordinates_into_visibility() {
        let mut store = ResultStore::new();
        store.set_viewport(downtown_bounds());
        store.set_ranked_results(vec![entry("pending", None)]);
        assert!(store.visible().is_empty());

        store.merge_entry(&entry("pending", Some((42.3601, -71.0589))));
        assert_eq!(store.visible().len(), 1);
    }

    #[test]
    fn replacement_bumps_generation_and_clears_ranked() {
        let mut store = ResultStore::new();
        store.set_ranked_results(vec![entry("a", Some((42.36, -71.06)))]);
        let ranked_generation = store.generation();
        assert!(store.is_ranked());

        store.set_results(vec![]);
        assert!(!store.is_ranked());
        assert!(store.generation() > ranked_generation);
        assert!(store.visible().is_empty());
    }

    #[test]
    fn fit_points_include_user_location() {
        let mut store = ResultStore::new();
        store.set_user_location(Coordinate::new(42.3601, -71.0589));
        store.set_ranked_results(vec![entry("a", Some((42.37, -71.12))), entry("b", None)]);
        assert_eq!(store.fit_points().len(), 2);
    }
}

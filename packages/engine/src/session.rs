//! Search session orchestration.
//!
//! Wires the store, marker manager, resolver, and distance aggregator
//! to the provider capabilities: query submission (with optional
//! natural-language location extraction), preloaded-result bootstraps,
//! viewport changes, selection, map-type preference, and the
//! user-location pulse.

use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use dine_map_models::{
    Coordinate, DistanceSummary, MapType, PreloadedEntry, ResultEntry, SelectionState,
};
use regex::Regex;

use crate::EngineError;
use crate::details::DetailResolver;
use crate::distance::DistanceAggregator;
use crate::handoff::take_handoff;
use crate::markers::MarkerLifecycleManager;
use crate::providers::{
    DistanceService, GeocodingService, KeyValueStore, MapSurface, MarkerFactory,
    PlaceSearchService, SelectCallback,
};
use crate::pulse::{PulseSink, UserLocationPulse};
use crate::store::ResultStore;

/// Preference key for the persisted base-map type.
pub const MAP_TYPE_PREF_KEY: &str = "preferredMapType";

/// Camera tilt applied in 3D mode, in degrees.
const TILT_3D: f64 = 67.5;

/// Minimum zoom enforced when entering 3D mode.
const ZOOM_FLOOR_3D: f64 = 16.0;

/// Matches "near X" / "on X" location references in a query.
static LOCATION_HINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:near|on)\s+(.+)$").expect("valid regex"));

/// The provider capabilities a session runs against.
#[derive(Clone)]
pub struct SessionProviders {
    /// The host map widget.
    pub map: Arc<dyn MapSurface>,
    /// Text search and detail lookup.
    pub search: Arc<dyn PlaceSearchService>,
    /// Forward geocoding.
    pub geocoder: Arc<dyn GeocodingService>,
    /// Batched distance queries.
    pub distance: Arc<dyn DistanceService>,
    /// Marker creation/destruction.
    pub markers: Arc<dyn MarkerFactory>,
    /// Preference and handoff storage.
    pub kv: Arc<dyn KeyValueStore>,
}

/// Tunable session parameters.
#[derive(Clone)]
pub struct SessionConfig {
    /// Anchor used when no location reference geocodes.
    pub default_anchor: Coordinate,
    /// Region appended to extracted location hints before geocoding
    /// (e.g. "Boston, MA").
    pub region_suffix: String,
    /// Text search radius in meters.
    pub search_radius_meters: u32,
    /// Zoom applied after re-centering on a geocoded location.
    pub recenter_zoom: f64,
    /// Edge padding for ranked-set fit-to-bounds, in pixels.
    pub fit_padding: f64,
    /// Receiver for user-location pulse ticks; no pulse runs when
    /// absent.
    pub pulse_sink: Option<PulseSink>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_anchor: Coordinate::new(42.3601, -71.0589),
            region_suffix: "Boston, MA".to_string(),
            search_radius_meters: 5000,
            recenter_zoom: 16.0,
            fit_padding: 50.0,
            pulse_sink: None,
        }
    }
}

/// Mutable session state, guarded by one mutex so the visible subset
/// and marker set can never be derived from two different result sets.
struct SessionState {
    store: ResultStore,
    markers: MarkerLifecycleManager,
    selection: SelectionState,
    distance_summary: Option<DistanceSummary>,
    pulse: Option<UserLocationPulse>,
}

/// Orchestrates one map screen's search lifecycle.
///
/// Dropping the session drops the marker map and stops the
/// user-location pulse.
pub struct SearchSession {
    map: Arc<dyn MapSurface>,
    search: Arc<dyn PlaceSearchService>,
    geocoder: Arc<dyn GeocodingService>,
    kv: Arc<dyn KeyValueStore>,
    resolver: Arc<DetailResolver>,
    distances: DistanceAggregator,
    state: Arc<Mutex<SessionState>>,
    config: SessionConfig,
}

impl SearchSession {
    /// Creates a session over the given providers. `on_select` is
    /// invoked whenever a marker is clicked.
    #[must_use]
    pub fn new(
        providers: SessionProviders,
        config: SessionConfig,
        on_select: SelectCallback,
    ) -> Self {
        let resolver = Arc::new(DetailResolver::new(Arc::clone(&providers.search)));
        let state = SessionState {
            store: ResultStore::new(),
            markers: MarkerLifecycleManager::new(providers.markers, on_select),
            selection: SelectionState::None,
            distance_summary: None,
            pulse: None,
        };
        Self {
            map: providers.map,
            search: providers.search,
            geocoder: providers.geocoder,
            kv: providers.kv,
            resolver,
            distances: DistanceAggregator::new(providers.distance),
            state: Arc::new(Mutex::new(state)),
            config,
        }
    }

    /// Submits a free-text search query.
    ///
    /// A "near X"/"on X" location reference is geocoded first
    /// (best-effort; the default anchor is used on failure) and the map
    /// re-centered there. The result set then replaces the store
    /// wholesale, filtered by the current viewport.
    ///
    /// Returns the number of viewport-visible results.
    ///
    /// # Errors
    ///
    /// Returns the provider error when the whole search fails; the
    /// session is left in the empty result state first. An empty query
    /// returns [`EngineError::PreconditionUnmet`].
    pub async fn submit(&self, query: &str) -> Result<usize, EngineError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(EngineError::PreconditionUnmet {
                what: "non-empty query".to_string(),
            });
        }

        let anchor = self.resolve_anchor(query).await;
        match self
            .search
            .text_search(query, anchor, self.config.search_radius_meters)
            .await
        {
            Ok(entries) => {
                log::info!("Search \"{query}\" returned {} results", entries.len());
                self.resolver.invalidate_all();
                let visible_count = {
                    let mut state = self.state();
                    state.markers.clear();
                    state.selection = SelectionState::None;
                    state.store.set_results(entries);
                    if let Some(bounds) = self.map.visible_bounds() {
                        state.store.set_viewport(bounds);
                    }
                    let visible = state.store.visible().to_vec();
                    state.markers.sync(&visible);
                    visible.len()
                };
                if let Some(location) = self.user_location() {
                    self.refresh_distances(location).await;
                }
                Ok(visible_count)
            }
            Err(err) => {
                log::warn!("Search \"{query}\" failed: {err}");
                self.resolver.invalidate_all();
                let mut state = self.state();
                state.markers.clear();
                state.selection = SelectionState::None;
                state.store.set_results(Vec::new());
                state.distance_summary = None;
                Err(err)
            }
        }
    }

    /// Bootstraps the session from a result set handed off by another
    /// screen.
    ///
    /// Entries carrying coordinates render immediately as ranked
    /// markers; the rest are backfilled concurrently through the
    /// detail resolver and fold in as they resolve, without blocking
    /// each other or the initial render. Returns the number of markers
    /// rendered immediately.
    pub async fn load_preloaded(
        &self,
        preloaded: Vec<PreloadedEntry>,
        user_location: Option<Coordinate>,
    ) -> usize {
        let entries: Vec<ResultEntry> = preloaded
            .into_iter()
            .map(PreloadedEntry::into_entry)
            .collect();
        let missing: Vec<String> = entries
            .iter()
            .filter(|e| e.coordinates.is_none())
            .map(|e| e.id.clone())
            .collect();
        log::info!(
            "Bootstrapping {} preloaded results ({} needing coordinate backfill)",
            entries.len(),
            missing.len()
        );

        if let Some(location) = user_location {
            self.set_user_location(location);
        }
        self.resolver.invalidate_all();
        let (generation, rendered) = {
            let mut state = self.state();
            let state = &mut *state;
            state.markers.clear();
            state.selection = SelectionState::None;
            state.distance_summary = None;
            state.store.set_ranked_results(entries);
            let outcome = state.markers.sync_ranked(state.store.entries());
            let points = state.store.fit_points();
            if !points.is_empty() {
                self.map.fit_to_bounds(&points, self.config.fit_padding);
            }
            (state.store.generation(), outcome.created)
        };

        for id in missing {
            self.spawn_backfill(id, generation);
        }

        if let Some(location) = user_location {
            self.refresh_distances(location).await;
        }
        rendered
    }

    /// Reads a handoff payload from external storage, if present, and
    /// bootstraps from it. Returns the immediate marker count, or
    /// `None` when no handoff was pending.
    pub async fn bootstrap_from_handoff(&self) -> Option<usize> {
        let payload = take_handoff(self.kv.as_ref())?;
        Some(
            self.load_preloaded(payload.entries, payload.user_location)
                .await,
        )
    }

    /// Recomputes the visible subset against the map's current bounds
    /// and reconciles markers. The map-idle trigger.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PreconditionUnmet`] before the map
    /// surface has laid out.
    pub fn viewport_changed(&self) -> Result<usize, EngineError> {
        let bounds = self
            .map
            .visible_bounds()
            .ok_or_else(|| EngineError::PreconditionUnmet {
                what: "map surface bounds".to_string(),
            })?;
        let mut state = self.state();
        state.store.set_viewport(bounds);
        if state.store.is_ranked() {
            // Ranked sets ignore the viewport; keep the full set live.
            let entries = state.store.entries().to_vec();
            state.markers.sync_ranked(&entries);
        } else {
            let visible = state.store.visible().to_vec();
            state.markers.sync(&visible);
        }
        Ok(state.store.visible().len())
    }

    /// Selects an entry and resolves its full detail.
    ///
    /// While resolving, the selection presents the entry's lightweight
    /// fields. A newer selection supersedes this one: if the user
    /// selects something else before the fetch completes, the stale
    /// completion is ignored.
    ///
    /// # Errors
    ///
    /// Returns the resolver error; the caller keeps the degraded
    /// lightweight view of this one entry.
    pub async fn select(&self, entry: &ResultEntry) -> Result<(), EngineError> {
        {
            let mut state = self.state();
            state.selection = SelectionState::Resolving(entry.id.clone());
        }
        match self.resolver.resolve(&entry.id).await {
            Ok(detail) => {
                let mut state = self.state();
                if state.selection.is_resolving(&entry.id) {
                    state.selection = SelectionState::Resolved(detail);
                } else {
                    log::debug!("Ignoring superseded detail resolution for {}", entry.id);
                }
                Ok(())
            }
            Err(err) => {
                log::warn!("Detail resolution for {} failed: {err}", entry.id);
                let mut state = self.state();
                if state.selection.is_resolving(&entry.id) {
                    state.selection = SelectionState::None;
                }
                Err(err)
            }
        }
    }

    /// Clears the current selection.
    pub fn clear_selection(&self) {
        self.state().selection = SelectionState::None;
    }

    /// Empties the result set and destroys every marker.
    pub fn clear_results(&self) {
        self.resolver.invalidate_all();
        let mut state = self.state();
        state.markers.clear();
        state.selection = SelectionState::None;
        state.store.set_results(Vec::new());
        state.distance_summary = None;
    }

    /// Records the user location and starts the pulse indicator when a
    /// sink is configured.
    pub fn set_user_location(&self, location: Coordinate) {
        let mut state = self.state();
        state.store.set_user_location(location);
        if state.pulse.is_none()
            && let Some(sink) = &self.config.pulse_sink
        {
            state.pulse = Some(UserLocationPulse::start(Arc::clone(sink)));
        }
    }

    /// Applies a base-map type and persists it as the preference.
    pub fn set_map_type(&self, map_type: MapType) {
        match map_type {
            MapType::ThreeD => {
                self.map.set_map_type(MapType::Satellite);
                self.map.set_tilt(TILT_3D);
                let zoom = self.map.zoom().unwrap_or(ZOOM_FLOOR_3D);
                self.map.set_zoom(zoom.max(ZOOM_FLOOR_3D));
            }
            other => {
                self.map.set_map_type(other);
                self.map.set_tilt(0.0);
            }
        }
        self.kv.set(MAP_TYPE_PREF_KEY, map_type.as_str());
    }

    /// Re-applies the persisted map-type preference, if any.
    pub fn restore_map_type(&self) -> Option<MapType> {
        let stored = self.kv.get(MAP_TYPE_PREF_KEY)?;
        let map_type = MapType::parse(&stored)?;
        self.set_map_type(map_type);
        Some(map_type)
    }

    /// The current selection.
    #[must_use]
    pub fn selection(&self) -> SelectionState {
        self.state().selection.clone()
    }

    /// The viewport-visible subset (side-panel list contents).
    #[must_use]
    pub fn visible(&self) -> Vec<ResultEntry> {
        self.state().store.visible().to_vec()
    }

    /// The current distance summary, when one has been computed.
    #[must_use]
    pub fn distance_summary(&self) -> Option<DistanceSummary> {
        self.state().distance_summary
    }

    /// The user location, when known.
    #[must_use]
    pub fn user_location(&self) -> Option<Coordinate> {
        self.state().store.user_location()
    }

    /// Number of live markers on the map.
    #[must_use]
    pub fn live_marker_count(&self) -> usize {
        self.state().markers.live_count()
    }

    /// Geocodes a "near X"/"on X" hint, re-centering on success;
    /// otherwise the default anchor.
    async fn resolve_anchor(&self, query: &str) -> Coordinate {
        let Some(hint) = location_hint(query) else {
            return self.config.default_anchor;
        };
        let address = format!("{hint}, {}", self.config.region_suffix);
        match self.geocoder.geocode(&address).await {
            Ok(coordinate) => {
                log::debug!("Geocoded \"{address}\"; re-centering map");
                self.map.set_center(coordinate);
                self.map.set_zoom(self.config.recenter_zoom);
                coordinate
            }
            Err(err) => {
                log::warn!("Geocoding \"{address}\" failed, using default anchor: {err}");
                self.config.default_anchor
            }
        }
    }

    /// Runs the distance chain against the current collection and
    /// records the summary unless the result set changed underneath.
    async fn refresh_distances(&self, location: Coordinate) {
        let (entries, generation) = {
            let state = self.state();
            (state.store.entries().to_vec(), state.store.generation())
        };
        let summary = self.distances.summarize(&entries, location).await;
        let mut state = self.state();
        if state.store.generation() == generation {
            state.distance_summary = summary;
        }
    }

    /// Spawns a fire-and-forget coordinate backfill for one ranked
    /// entry. The stored generation detects a result set replaced
    /// while the fetch was in flight.
    fn spawn_backfill(&self, id: String, generation: u64) {
        let resolver = Arc::clone(&self.resolver);
        let state = Arc::clone(&self.state);
        let map = Arc::clone(&self.map);
        let padding = self.config.fit_padding;
        tokio::spawn(async move {
            match resolver.resolve(&id).await {
                Ok(detail) => {
                    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                    if state.store.generation() != generation {
                        log::debug!("Dropping stale coordinate backfill for {id}");
                        return;
                    }
                    state.store.merge_entry(&detail.entry);
                    let entries = state.store.entries().to_vec();
                    state.markers.sync_ranked(&entries);
                    let points = state.store.fit_points();
                    if !points.is_empty() {
                        map.fit_to_bounds(&points, padding);
                    }
                }
                Err(err) => {
                    // Degrades this entry only; its siblings render.
                    log::warn!("Coordinate backfill for {id} failed: {err}");
                }
            }
        });
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Extracts the location hint from a "near X"/"on X" query.
fn location_hint(query: &str) -> Option<&str> {
    LOCATION_HINT
        .captures(query)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

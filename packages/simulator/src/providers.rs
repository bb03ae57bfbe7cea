//! In-memory provider implementations backed by the fixture table.
//!
//! These stand in for a real map SDK: the map is a mutable camera
//! record, text search is substring matching over the fixtures within
//! the requested radius, geocoding knows a handful of Boston landmarks,
//! and distances are straight-line haversine values.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use dine_map_engine::EngineError;
use dine_map_engine::providers::{
    ClickHandler, DistanceService, GeocodingService, KeyValueStore, MapSurface, MarkerFactory,
    MarkerHandle, PlaceSearchService,
};
use dine_map_geo::{haversine_miles, meters_to_miles, miles_to_meters};
use dine_map_models::{
    Coordinate, DetailedResult, DistanceLeg, LatLngBounds, MapType, MarkerLabel, MarkerStyle,
    ResultEntry, TravelMode,
};

use crate::fixtures;

/// Half-width of the simulated viewport, in degrees.
const VIEWPORT_HALF_SPAN: f64 = 0.02;

#[derive(Clone, Copy)]
struct Camera {
    center: Coordinate,
    zoom: f64,
    tilt: f64,
    map_type: MapType,
}

/// A map surface that tracks camera state and derives a rectangular
/// viewport around the center.
pub struct SimulatedMap {
    camera: Mutex<Camera>,
}

impl SimulatedMap {
    #[must_use]
    pub fn new(center: Coordinate) -> Arc<Self> {
        Arc::new(Self {
            camera: Mutex::new(Camera {
                center,
                zoom: 13.0,
                tilt: 0.0,
                map_type: MapType::Roadmap,
            }),
        })
    }

    fn camera(&self) -> std::sync::MutexGuard<'_, Camera> {
        self.camera.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MapSurface for SimulatedMap {
    fn set_center(&self, center: Coordinate) {
        log::debug!("map: center -> {:.4}, {:.4}", center.lat, center.lng);
        self.camera().center = center;
    }

    fn set_zoom(&self, zoom: f64) {
        log::debug!("map: zoom -> {zoom}");
        self.camera().zoom = zoom;
    }

    fn zoom(&self) -> Option<f64> {
        Some(self.camera().zoom)
    }

    fn set_tilt(&self, degrees: f64) {
        log::debug!("map: tilt -> {degrees}");
        self.camera().tilt = degrees;
    }

    fn set_map_type(&self, map_type: MapType) {
        log::debug!("map: type -> {}", map_type.as_str());
        self.camera().map_type = map_type;
    }

    fn fit_to_bounds(&self, points: &[Coordinate], _padding: f64) {
        if let Some(bounds) = LatLngBounds::from_points(points) {
            let center = Coordinate::new(
                f64::midpoint(bounds.south_west.lat, bounds.north_east.lat),
                f64::midpoint(bounds.south_west.lng, bounds.north_east.lng),
            );
            log::debug!("map: fit {} point(s)", points.len());
            self.camera().center = center;
        }
    }

    fn visible_bounds(&self) -> Option<LatLngBounds> {
        let center = self.camera().center;
        Some(LatLngBounds::new(
            Coordinate::new(
                center.lat - VIEWPORT_HALF_SPAN,
                center.lng - VIEWPORT_HALF_SPAN,
            ),
            Coordinate::new(
                center.lat + VIEWPORT_HALF_SPAN,
                center.lng + VIEWPORT_HALF_SPAN,
            ),
        ))
    }
}

/// Text search and detail lookup over the fixture table.
pub struct FixturePlaces;

#[async_trait]
impl PlaceSearchService for FixturePlaces {
    async fn text_search(
        &self,
        query: &str,
        anchor: Coordinate,
        radius_meters: u32,
    ) -> Result<Vec<ResultEntry>, EngineError> {
        let radius_miles = meters_to_miles(f64::from(radius_meters));
        let needle = query.to_lowercase();
        let tokens: Vec<&str> = needle.split_whitespace().collect();
        let matches: Vec<ResultEntry> = fixtures::ALL
            .iter()
            .filter(|fixture| {
                let haystack = format!("{} {}", fixture.name, fixture.tags.join(" "));
                let haystack = haystack.to_lowercase();
                tokens.iter().any(|token| haystack.contains(token))
            })
            .filter(|fixture| haversine_miles(anchor, fixture.coordinate()) <= radius_miles)
            .map(fixtures::Fixture::entry)
            .collect();
        log::debug!("places: \"{query}\" matched {} fixture(s)", matches.len());
        Ok(matches)
    }

    async fn get_details(&self, id: &str) -> Result<DetailedResult, EngineError> {
        fixtures::by_id(id)
            .map(fixtures::Fixture::detail)
            .ok_or(EngineError::NotFound)
    }
}

/// Forward geocoding over a short list of Boston landmarks.
pub struct LandmarkGeocoder;

const LANDMARKS: &[(&str, Coordinate)] = &[
    ("harvard square", Coordinate::new(42.3736, -71.1190)),
    ("north end", Coordinate::new(42.3647, -71.0542)),
    ("newbury street", Coordinate::new(42.3505, -71.0810)),
    ("south end", Coordinate::new(42.3388, -71.0765)),
    ("seaport", Coordinate::new(42.3519, -71.0453)),
];

#[async_trait]
impl GeocodingService for LandmarkGeocoder {
    async fn geocode(&self, address_text: &str) -> Result<Coordinate, EngineError> {
        let needle = address_text.to_lowercase();
        LANDMARKS
            .iter()
            .find(|(landmark, _)| needle.contains(landmark))
            .map(|(_, coordinate)| *coordinate)
            .ok_or(EngineError::NotFound)
    }
}

/// Straight-line distances; walking and driving share the same path.
pub struct StraightLineDistances;

#[async_trait]
impl DistanceService for StraightLineDistances {
    async fn batch_distance(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
        mode: TravelMode,
    ) -> Result<Vec<DistanceLeg>, EngineError> {
        log::debug!(
            "distance: {} leg(s) ({})",
            destinations.len(),
            mode.as_str()
        );
        Ok(destinations
            .iter()
            .map(|destination| {
                DistanceLeg::ok(miles_to_meters(haversine_miles(origin, *destination)))
            })
            .collect())
    }
}

struct ConsoleMarker {
    label: String,
}

impl MarkerHandle for ConsoleMarker {}

impl Drop for ConsoleMarker {
    fn drop(&mut self) {
        log::info!("marker removed: {}", self.label);
    }
}

/// A marker factory that narrates marker lifecycle to the log.
pub struct ConsoleMarkers;

impl MarkerFactory for ConsoleMarkers {
    fn create_marker(
        &self,
        coordinate: Coordinate,
        style: MarkerStyle,
        label: MarkerLabel,
        _on_click: ClickHandler,
    ) -> Result<Box<dyn MarkerHandle>, EngineError> {
        let label = label.text();
        log::info!(
            "marker placed: {label} at {:.4}, {:.4} ({})",
            coordinate.lat,
            coordinate.lng,
            style.fill_color,
        );
        Ok(Box::new(ConsoleMarker { label }))
    }

    fn destroy(&self, handle: Box<dyn MarkerHandle>) {
        drop(handle);
    }
}

/// Session storage, preferences, and handoff payloads.
#[derive(Default)]
pub struct MemoryKv {
    values: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn delete(&self, key: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

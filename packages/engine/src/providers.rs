//! Capability traits the engine consumes.
//!
//! These model the shapes of the external map, places, geocoding,
//! distance, and marker providers without committing to any vendor's
//! wire format. A host binds them to a real SDK; tests and the
//! simulator bind them to scripted in-memory implementations.

use std::sync::Arc;

use async_trait::async_trait;
use dine_map_models::{
    Coordinate, DetailedResult, DistanceLeg, LatLngBounds, MapType, MarkerLabel, MarkerStyle,
    ResultEntry, TravelMode,
};

use crate::EngineError;

/// Callback invoked when a marker (or list row) is clicked.
pub type SelectCallback = Arc<dyn Fn(ResultEntry) + Send + Sync>;

/// Callback a marker fires when clicked on the map surface.
pub type ClickHandler = Box<dyn Fn() + Send + Sync>;

/// The host map widget.
///
/// All mutations are synchronous with respect to the map surface;
/// `visible_bounds` returns `None` until the surface has laid out.
pub trait MapSurface: Send + Sync {
    /// Re-centers the map on `center`.
    fn set_center(&self, center: Coordinate);

    /// Sets the zoom level.
    fn set_zoom(&self, zoom: f64);

    /// Returns the current zoom level, if the surface is laid out.
    fn zoom(&self) -> Option<f64>;

    /// Sets the camera tilt in degrees.
    fn set_tilt(&self, degrees: f64);

    /// Switches the base layer (roadmap or satellite imagery).
    fn set_map_type(&self, map_type: MapType);

    /// Fits the viewport to contain every point, with edge padding in
    /// pixels.
    fn fit_to_bounds(&self, points: &[Coordinate], padding: f64);

    /// Current viewport bounds, or `None` before first layout.
    fn visible_bounds(&self) -> Option<LatLngBounds>;
}

/// Text search and per-place detail lookup.
#[async_trait]
pub trait PlaceSearchService: Send + Sync {
    /// Runs a text search anchored at `anchor` within `radius_meters`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ProviderUnavailable`] if the backend is
    /// unreachable or rejects the request.
    async fn text_search(
        &self,
        query: &str,
        anchor: Coordinate,
        radius_meters: u32,
    ) -> Result<Vec<ResultEntry>, EngineError>;

    /// Fetches the full detail record for a place id.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the id matches nothing,
    /// or [`EngineError::ProviderUnavailable`] on backend failure.
    async fn get_details(&self, id: &str) -> Result<DetailedResult, EngineError>;
}

/// Forward geocoding of free-form address text.
#[async_trait]
pub trait GeocodingService: Send + Sync {
    /// Resolves address text to a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when nothing matches, or
    /// [`EngineError::ProviderUnavailable`] on backend failure.
    async fn geocode(&self, address_text: &str) -> Result<Coordinate, EngineError>;
}

/// Batched origin→destinations distance queries.
#[async_trait]
pub trait DistanceService: Send + Sync {
    /// Computes one leg per destination for the given travel mode.
    ///
    /// The returned vector is positionally aligned with `destinations`;
    /// an unroutable destination yields a failed leg, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ProviderUnavailable`] when the whole
    /// batch call fails.
    async fn batch_distance(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
        mode: TravelMode,
    ) -> Result<Vec<DistanceLeg>, EngineError>;
}

/// Opaque ownership token for one rendered marker/label pair.
///
/// Exclusively owned by the marker lifecycle manager; handing the
/// token back to [`MarkerFactory::destroy`] removes the marker from
/// the map and detaches its listeners.
pub trait MarkerHandle: Send {}

/// Creates and destroys map markers.
pub trait MarkerFactory: Send + Sync {
    /// Creates a marker with a label overlay and a click handler.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ProviderUnavailable`] if the surface
    /// rejects the marker (e.g. bad coordinates).
    fn create_marker(
        &self,
        coordinate: Coordinate,
        style: MarkerStyle,
        label: MarkerLabel,
        on_click: ClickHandler,
    ) -> Result<Box<dyn MarkerHandle>, EngineError>;

    /// Removes a marker from the map and detaches its listeners.
    fn destroy(&self, handle: Box<dyn MarkerHandle>);
}

/// Simple external key-value storage (preferences, handoff payloads).
pub trait KeyValueStore: Send + Sync {
    /// Reads a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Writes a value.
    fn set(&self, key: &str, value: &str);

    /// Deletes a value.
    fn delete(&self, key: &str);
}

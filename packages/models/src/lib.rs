#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for the dine-map result engine.
//!
//! This crate contains the data model passed between the result store,
//! marker lifecycle manager, detail resolver, distance aggregator, and
//! the provider capability traits: coordinates and map bounds, search
//! result entries and their detailed counterparts, distance legs and
//! summaries, and marker styling rules.

pub mod distance;
pub mod entry;
pub mod marker;

use geo::{Contains, Point, Rect, coord};
use serde::{Deserialize, Serialize};

pub use distance::{DistanceLeg, DistanceSummary, LegStatus, TravelMode};
pub use entry::{DetailedResult, PreloadedEntry, ResultEntry, Review, SelectionState};
pub use marker::{MarkerLabel, MarkerStyle};

/// A WGS84 latitude/longitude pair, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lng: f64,
}

impl Coordinate {
    /// Creates a coordinate from latitude and longitude degrees.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// An axis-aligned lat/lng rectangle, as reported by the map surface
/// for its current viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    /// South-west corner.
    pub south_west: Coordinate,
    /// North-east corner.
    pub north_east: Coordinate,
}

impl LatLngBounds {
    /// Creates bounds from two opposite corners.
    #[must_use]
    pub const fn new(south_west: Coordinate, north_east: Coordinate) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Returns `true` if `point` falls inside these bounds.
    #[must_use]
    pub fn contains(&self, point: Coordinate) -> bool {
        let rect = Rect::new(
            coord! { x: self.south_west.lng, y: self.south_west.lat },
            coord! { x: self.north_east.lng, y: self.north_east.lat },
        );
        rect.contains(&Point::new(point.lng, point.lat))
    }

    /// Grows the bounds to include `point`.
    pub fn extend(&mut self, point: Coordinate) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    /// Builds the smallest bounds containing every point, or `None` for
    /// an empty set.
    #[must_use]
    pub fn from_points(points: &[Coordinate]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self::new(*first, *first);
        for point in rest {
            bounds.extend(*point);
        }
        Some(bounds)
    }
}

/// Base map rendering mode, persisted as a user preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapType {
    /// Standard road map, no tilt.
    Roadmap,
    /// Satellite imagery, no tilt.
    Satellite,
    /// Satellite imagery tilted 67.5 degrees with a zoom floor.
    ThreeD,
}

impl MapType {
    /// Returns the preference-key string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Roadmap => "roadmap",
            Self::Satellite => "satellite",
            Self::ThreeD => "3d",
        }
    }

    /// Parses the representation produced by [`Self::as_str`].
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "roadmap" => Some(Self::Roadmap),
            "satellite" => Some(Self::Satellite),
            "3d" => Some(Self::ThreeD),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_contain_interior_point() {
        let bounds = LatLngBounds::new(
            Coordinate::new(42.30, -71.12),
            Coordinate::new(42.40, -71.00),
        );
        assert!(bounds.contains(Coordinate::new(42.3601, -71.0589)));
        assert!(!bounds.contains(Coordinate::new(42.50, -71.0589)));
        assert!(!bounds.contains(Coordinate::new(42.3601, -70.90)));
    }

    #[test]
    fn extend_grows_in_all_directions() {
        let mut bounds = LatLngBounds::new(
            Coordinate::new(42.36, -71.06),
            Coordinate::new(42.36, -71.06),
        );
        bounds.extend(Coordinate::new(42.40, -71.12));
        bounds.extend(Coordinate::new(42.30, -71.00));
        assert!((bounds.south_west.lat - 42.30).abs() < 1e-9);
        assert!((bounds.south_west.lng - -71.12).abs() < 1e-9);
        assert!((bounds.north_east.lat - 42.40).abs() < 1e-9);
        assert!((bounds.north_east.lng - -71.00).abs() < 1e-9);
    }

    #[test]
    fn from_points_empty_is_none() {
        assert!(LatLngBounds::from_points(&[]).is_none());
    }

    #[test]
    fn map_type_round_trips() {
        for map_type in [MapType::Roadmap, MapType::Satellite, MapType::ThreeD] {
            assert_eq!(MapType::parse(map_type.as_str()), Some(map_type));
        }
        assert_eq!(MapType::parse("terrain"), None);
    }
}

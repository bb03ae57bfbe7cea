#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pure distance and travel-time estimation helpers.
//!
//! Great-circle distance between coordinates, meter/mile conversion for
//! distance-service results, and the coarse walk-or-drive travel-time
//! estimate shown next to each result in the side panel. No provider
//! dependency; everything here is a pure function.

use std::fmt;

use dine_map_models::{Coordinate, TravelMode};

/// Earth radius in miles, for haversine distance.
const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Meters-to-miles conversion factor.
const MILES_PER_METER: f64 = 0.000_621_371;

/// Distances under this threshold are estimated as a walk.
const WALK_THRESHOLD_MILES: f64 = 0.5;

/// Assumed walking speed in miles per hour.
const WALKING_MPH: f64 = 3.0;

/// Assumed driving speed in miles per hour.
const DRIVING_MPH: f64 = 20.0;

/// Great-circle (haversine) distance between two coordinates, in miles.
#[must_use]
pub fn haversine_miles(from: Coordinate, to: Coordinate) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    EARTH_RADIUS_MILES * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Converts a distance-service meter value to miles.
#[must_use]
pub fn meters_to_miles(meters: f64) -> f64 {
    meters * MILES_PER_METER
}

/// Converts miles to the meter values distance services report.
#[must_use]
pub fn miles_to_meters(miles: f64) -> f64 {
    miles / MILES_PER_METER
}

/// Rounds a mile value to one decimal for display.
#[must_use]
pub fn display_miles(miles: f64) -> f64 {
    (miles * 10.0).round() / 10.0
}

/// A coarse walk-or-drive travel-time estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TravelEstimate {
    /// Estimated travel time in whole minutes.
    pub minutes: u32,
    /// Whether the estimate assumes walking or driving.
    pub mode: TravelMode,
}

impl fmt::Display for TravelEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            TravelMode::Walking => write!(f, "{} min walk", self.minutes),
            TravelMode::Driving => write!(f, "{} min drive", self.minutes),
        }
    }
}

/// Estimates travel time for a distance: short distances walk at
/// 3 mph, everything else drives at 20 mph.
#[must_use]
pub fn estimate_travel_time(distance_miles: f64) -> TravelEstimate {
    if distance_miles < WALK_THRESHOLD_MILES {
        TravelEstimate {
            minutes: to_minutes(distance_miles, WALKING_MPH),
            mode: TravelMode::Walking,
        }
    } else {
        TravelEstimate {
            minutes: to_minutes(distance_miles, DRIVING_MPH),
            mode: TravelMode::Driving,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_minutes(distance_miles: f64, mph: f64) -> u32 {
    (distance_miles / mph * 60.0).round() as u32
}

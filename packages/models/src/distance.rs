//! Distance query legs and the derived walking/driving summary.

use serde::{Deserialize, Serialize};

/// Travel mode for a batched distance query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    /// On foot.
    Walking,
    /// By car.
    Driving,
}

impl TravelMode {
    /// Returns the `snake_case` string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Walking => "walking",
            Self::Driving => "driving",
        }
    }
}

/// Per-destination outcome of a batched distance query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegStatus {
    /// A route was found and measured.
    Ok,
    /// No route could be computed for this destination.
    Failed,
}

/// One origin→destination leg from a batched distance query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceLeg {
    /// Whether this leg's computation succeeded.
    pub status: LegStatus,
    /// Route distance in meters; meaningless when `status` is `Failed`.
    pub meters: f64,
}

impl DistanceLeg {
    /// A successfully measured leg.
    #[must_use]
    pub const fn ok(meters: f64) -> Self {
        Self {
            status: LegStatus::Ok,
            meters,
        }
    }

    /// A leg for which no route was found.
    #[must_use]
    pub const fn failed() -> Self {
        Self {
            status: LegStatus::Failed,
            meters: 0.0,
        }
    }
}

/// Average distance from the user location to a result set, in display
/// units (miles). Derived and never persisted; either phase may be
/// absent when its query yielded no valid legs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DistanceSummary {
    /// Average walking distance in miles.
    pub walking_miles: Option<f64>,
    /// Average driving distance in miles.
    pub driving_miles: Option<f64>,
}

impl DistanceSummary {
    /// Returns `true` when neither phase produced an average.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.walking_miles.is_none() && self.driving_miles.is_none()
    }
}

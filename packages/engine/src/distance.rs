//! Two-phase walking/driving average distance aggregation.

use std::sync::Arc;

use dine_map_geo::{display_miles, meters_to_miles};
use dine_map_models::{
    Coordinate, DistanceLeg, DistanceSummary, LegStatus, ResultEntry, TravelMode,
};

use crate::EngineError;
use crate::providers::DistanceService;

/// Reduces batched distance queries to average walking and driving
/// distance from the user location to a result set.
///
/// The walking query runs first; the driving query fires only after
/// the walking call itself succeeded. The two calls share a
/// per-session request quota upstream, so they are strictly chained,
/// never parallel, and a dead backend costs one request instead of
/// two.
pub struct DistanceAggregator {
    service: Arc<dyn DistanceService>,
}

impl DistanceAggregator {
    /// Creates an aggregator over a distance capability.
    #[must_use]
    pub fn new(service: Arc<dyn DistanceService>) -> Self {
        Self { service }
    }

    /// Computes the average walking/driving distance summary, or
    /// `None` when no destination has coordinates, the walking call
    /// failed outright, or neither phase produced a valid average.
    ///
    /// Legs whose computation failed (no route) are discarded; a phase
    /// averages over its valid legs only and omits its field when none
    /// remain.
    pub async fn summarize(
        &self,
        entries: &[ResultEntry],
        user_location: Coordinate,
    ) -> Option<DistanceSummary> {
        let destinations: Vec<Coordinate> =
            entries.iter().filter_map(|e| e.coordinates).collect();
        if destinations.is_empty() {
            return None;
        }

        let walking_miles = match self
            .service
            .batch_distance(user_location, &destinations, TravelMode::Walking)
            .await
        {
            Ok(legs) => phase_average(TravelMode::Walking, &legs),
            Err(err) => {
                // Without a successful walking call the driving query
                // must not fire.
                log::warn!("Walking distance query failed: {err}");
                return None;
            }
        };

        let driving_miles = match self
            .service
            .batch_distance(user_location, &destinations, TravelMode::Driving)
            .await
        {
            Ok(legs) => phase_average(TravelMode::Driving, &legs),
            Err(err) => {
                log::warn!("Driving distance query failed: {err}");
                None
            }
        };

        let summary = DistanceSummary {
            walking_miles,
            driving_miles,
        };
        if summary.is_empty() {
            None
        } else {
            Some(summary)
        }
    }
}

/// Averages the valid legs of one phase into display miles.
#[allow(clippy::cast_precision_loss)]
fn phase_average(mode: TravelMode, legs: &[DistanceLeg]) -> Option<f64> {
    let valid: Vec<f64> = legs
        .iter()
        .filter(|leg| leg.status == LegStatus::Ok)
        .map(|leg| leg.meters)
        .collect();
    if valid.is_empty() {
        let err = EngineError::PartialData {
            ok: 0,
            failed: legs.len(),
        };
        log::debug!("{} phase yielded no valid legs: {err}", mode.as_str());
        return None;
    }
    if valid.len() < legs.len() {
        log::debug!(
            "{} phase dropped {} failed legs",
            mode.as_str(),
            legs.len() - valid.len()
        );
    }
    let mean_meters = valid.iter().sum::<f64>() / valid.len() as f64;
    Some(display_miles(meters_to_miles(mean_meters)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted distance backend recording the modes it was called
    /// with.
    struct ScriptedDistances {
        walking: Result<Vec<DistanceLeg>, EngineError>,
        driving: Result<Vec<DistanceLeg>, EngineError>,
        calls: Mutex<Vec<TravelMode>>,
    }

    impl ScriptedDistances {
        fn new(
            walking: Result<Vec<DistanceLeg>, EngineError>,
            driving: Result<Vec<DistanceLeg>, EngineError>,
        ) -> Arc<Self> {
            Arc::new(Self {
                walking,
                driving,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<TravelMode> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DistanceService for ScriptedDistances {
        async fn batch_distance(
            &self,
            _origin: Coordinate,
            _destinations: &[Coordinate],
            mode: TravelMode,
        ) -> Result<Vec<DistanceLeg>, EngineError> {
            self.calls.lock().unwrap().push(mode);
            match mode {
                TravelMode::Walking => self.walking.clone(),
                TravelMode::Driving => self.driving.clone(),
            }
        }
    }

    fn entries_with_coords(count: usize) -> Vec<ResultEntry> {
        (0..count)
            .map(|i| {
                let mut entry = ResultEntry::new(format!("p{i}"), format!("Place {i}"));
                entry.coordinates = Some(Coordinate::new(42.36, -71.06));
                entry
            })
            .collect()
    }

    fn origin() -> Coordinate {
        Coordinate::new(42.3601, -71.0589)
    }

    #[tokio::test]
    async fn averages_valid_legs_per_phase() {
        let service = ScriptedDistances::new(
            Ok(vec![
                DistanceLeg::ok(800.0),
                DistanceLeg::ok(1200.0),
                DistanceLeg::failed(),
            ]),
            Ok(vec![
                DistanceLeg::ok(1500.0),
                DistanceLeg::ok(2000.0),
                DistanceLeg::ok(2500.0),
            ]),
        );
        let aggregator =
            DistanceAggregator::new(Arc::clone(&service) as Arc<dyn DistanceService>);

        let summary = aggregator
            .summarize(&entries_with_coords(3), origin())
            .await
            .unwrap();

        // Walking averages the two valid legs: 1000 m -> 0.6 mi.
        assert_eq!(summary.walking_miles, Some(0.6));
        // Driving averages all three legs: 2000 m -> 1.2 mi.
        assert_eq!(summary.driving_miles, Some(1.2));
    }

    #[tokio::test]
    async fn driving_never_fires_after_failed_walking_call() {
        let service = ScriptedDistances::new(
            Err(EngineError::unavailable("quota exhausted")),
            Ok(vec![DistanceLeg::ok(1500.0)]),
        );
        let aggregator =
            DistanceAggregator::new(Arc::clone(&service) as Arc<dyn DistanceService>);

        let summary = aggregator.summarize(&entries_with_coords(1), origin()).await;
        assert!(summary.is_none());
        assert_eq!(service.calls(), vec![TravelMode::Walking]);
    }

    #[tokio::test]
    async fn driving_fires_after_walking_with_zero_valid_legs() {
        let service = ScriptedDistances::new(
            Ok(vec![DistanceLeg::failed(), DistanceLeg::failed()]),
            Ok(vec![DistanceLeg::ok(3218.7), DistanceLeg::ok(3218.7)]),
        );
        let aggregator =
            DistanceAggregator::new(Arc::clone(&service) as Arc<dyn DistanceService>);

        let summary = aggregator
            .summarize(&entries_with_coords(2), origin())
            .await
            .unwrap();
        assert_eq!(service.calls(), vec![TravelMode::Walking, TravelMode::Driving]);
        assert!(summary.walking_miles.is_none());
        assert_eq!(summary.driving_miles, Some(2.0));
    }

    #[tokio::test]
    async fn no_coordinates_is_absent_not_error() {
        let service = ScriptedDistances::new(Ok(vec![]), Ok(vec![]));
        let aggregator =
            DistanceAggregator::new(Arc::clone(&service) as Arc<dyn DistanceService>);

        let entries = vec![ResultEntry::new("p0", "No Coords")];
        assert!(aggregator.summarize(&entries, origin()).await.is_none());
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_driving_call_leaves_walking_only() {
        let service = ScriptedDistances::new(
            Ok(vec![DistanceLeg::ok(1000.0)]),
            Err(EngineError::unavailable("backend down")),
        );
        let aggregator =
            DistanceAggregator::new(Arc::clone(&service) as Arc<dyn DistanceService>);

        let summary = aggregator
            .summarize(&entries_with_coords(1), origin())
            .await
            .unwrap();
        assert_eq!(summary.walking_miles, Some(0.6));
        assert!(summary.driving_miles.is_none());
    }
}

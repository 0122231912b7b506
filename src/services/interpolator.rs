//! Route interpolation with proportional time splitting
//!
//! For each observed transition with an entry in the insertion map, the
//! inferred waypoints are spliced in and the leg's elapsed time is split
//! evenly over the resulting sub-legs.

use crate::domain::trip::{RefinedTrip, Trip};
use crate::services::route_index::InsertionMap;
use serde::Deserialize;
use tracing::debug;

/// What happens to the observed waypoint when a transition is interpolated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertionPolicy {
    /// Append the observed waypoint after the inferred ones. Keeps
    /// `durations.len() == route.len() - 1`.
    #[default]
    RetainObserved,
    /// Append only the inferred waypoints. The observed waypoint is lost and
    /// each interpolated transition leaves one more duration than waypoints.
    /// Matches the legacy tool's output.
    DropObserved,
}

impl InsertionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsertionPolicy::RetainObserved => "retain_observed",
            InsertionPolicy::DropObserved => "drop_observed",
        }
    }
}

/// Rewrites trips using a prebuilt insertion map
#[derive(Debug, Clone, Copy)]
pub struct RouteInterpolator<'a> {
    insertions: &'a InsertionMap,
    policy: InsertionPolicy,
}

impl<'a> RouteInterpolator<'a> {
    pub fn new(insertions: &'a InsertionMap) -> Self {
        Self { insertions, policy: InsertionPolicy::default() }
    }

    pub fn with_policy(mut self, policy: InsertionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Refine one trip; returns the refined trip and the number of
    /// transitions that received insertions
    pub fn refine(&self, trip: Trip) -> (RefinedTrip, usize) {
        if trip.route.len() < 2 || self.insertions.is_empty() {
            return (trip.into(), 0);
        }

        let mut route = Vec::with_capacity(trip.route.len());
        let mut durations = Vec::with_capacity(trip.durations.len());
        let mut interpolated = 0;
        route.push(trip.route[0].clone());

        for (i, pair) in trip.route.windows(2).enumerate() {
            let (prev, cur) = (&pair[0], &pair[1]);
            let dt = match trip.durations.get(i) {
                Some(dt) => *dt,
                None => {
                    debug!(plate = %trip.plate, index = %i, "duration_index_underflow");
                    0.0
                }
            };

            match self.insertions.get(prev, cur) {
                Some(between) => {
                    let share = dt / (between.len() + 1) as f64;
                    route.extend(between.iter().cloned());
                    durations.extend(std::iter::repeat(share).take(between.len() + 1));
                    if self.policy == InsertionPolicy::RetainObserved {
                        route.push(cur.clone());
                    }
                    interpolated += 1;
                }
                None => {
                    route.push(cur.clone());
                    durations.push(dt);
                }
            }
        }

        let refined = RefinedTrip {
            plate: trip.plate,
            route,
            durations,
            entry: trip.entry,
            exit: trip.exit,
            directions: trip.directions,
        };
        (refined, interpolated)
    }

    /// Refine every trip; returns the refined trips and total interpolated transitions
    pub fn refine_all(&self, trips: Vec<Trip>) -> (Vec<RefinedTrip>, usize) {
        let mut total = 0;
        let refined = trips
            .into_iter()
            .map(|trip| {
                let (refined, n) = self.refine(trip);
                total += n;
                refined
            })
            .collect();
        (refined, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{parse_timestamp, CameraId, ScanEvent};

    fn ids(names: &[&str]) -> Vec<CameraId> {
        names.iter().map(|n| CameraId::from(*n)).collect()
    }

    fn trip(route: &[&str], durations: &[f64]) -> Trip {
        let ts = parse_timestamp("2024-03-01 00:00:00").unwrap();
        let mut trip = Trip::open(&ScanEvent::new("ABC123", route[0], ts, "N"));
        trip.route = ids(route);
        trip.durations = durations.to_vec();
        trip.directions = vec!["N".to_string(); route.len()];
        trip
    }

    #[test]
    fn test_retain_observed_scenario() {
        let map = InsertionMap::from_canonical(&ids(&["A", "B", "C"]));
        let interpolator = RouteInterpolator::new(&map);

        let (refined, n) = interpolator.refine(trip(&["A", "C"], &[30.0]));

        assert_eq!(refined.route, ids(&["A", "B", "C"]));
        assert_eq!(refined.durations, vec![15.0, 15.0]);
        assert_eq!(n, 1);
    }

    #[test]
    fn test_drop_observed_parity() {
        let map = InsertionMap::from_canonical(&ids(&["A", "B", "C"]));
        let interpolator = RouteInterpolator::new(&map).with_policy(InsertionPolicy::DropObserved);

        let (refined, _) = interpolator.refine(trip(&["A", "C"], &[30.0]));

        assert_eq!(refined.route, ids(&["A", "B"]));
        assert_eq!(refined.durations, vec![15.0, 15.0]);
        assert_eq!(refined.durations.len(), refined.route.len());
    }

    #[test]
    fn test_single_waypoint_unchanged() {
        let map = InsertionMap::from_canonical(&ids(&["A", "B", "C"]));
        let original = trip(&["A"], &[]);

        let (refined, n) = RouteInterpolator::new(&map).refine(original.clone());

        assert_eq!(refined, RefinedTrip::from(original));
        assert_eq!(n, 0);
    }

    #[test]
    fn test_mixed_transitions() {
        let map = InsertionMap::from_canonical(&ids(&["1", "2", "3", "4", "5"]));
        let interpolator = RouteInterpolator::new(&map);

        let (refined, n) = interpolator.refine(trip(&["1", "2", "5", "9"], &[4.0, 12.0, 7.0]));

        assert_eq!(refined.route, ids(&["1", "2", "3", "4", "5", "9"]));
        assert_eq!(refined.durations, vec![4.0, 4.0, 4.0, 4.0, 7.0]);
        assert_eq!(refined.total_minutes(), 23.0);
        assert_eq!(n, 1);
        assert_eq!(refined.directions.len(), 4);
    }

    #[test]
    fn test_reverse_transition() {
        let map = InsertionMap::from_canonical(&ids(&["1", "2", "3", "4"]));

        let (refined, _) = RouteInterpolator::new(&map).refine(trip(&["4", "1"], &[9.0]));

        assert_eq!(refined.route, ids(&["4", "3", "2", "1"]));
        assert_eq!(refined.durations, vec![3.0, 3.0, 3.0]);
    }

    #[test]
    fn test_missing_duration_defaults_to_zero() {
        let map = InsertionMap::from_canonical(&ids(&["A", "B", "C"]));

        let (refined, _) = RouteInterpolator::new(&map).refine(trip(&["A", "C", "D"], &[6.0]));

        assert_eq!(refined.route, ids(&["A", "B", "C", "D"]));
        assert_eq!(refined.durations, vec![3.0, 3.0, 0.0]);
    }

    #[test]
    fn test_passthrough_fields() {
        let map = InsertionMap::from_canonical(&ids(&["A", "B", "C"]));
        let original = trip(&["A", "C"], &[30.0]);

        let (refined, _) = RouteInterpolator::new(&map).refine(original.clone());

        assert_eq!(refined.plate, original.plate);
        assert_eq!(refined.entry, original.entry);
        assert_eq!(refined.exit, original.exit);
        assert_eq!(refined.directions, original.directions);
    }

    #[test]
    fn test_refine_all_invariants() {
        let map = InsertionMap::from_canonical(&ids(&["1", "2", "3", "4", "5"]));
        let trips = vec![
            trip(&["1", "3"], &[2.0]),
            trip(&["5", "1", "2"], &[8.0, 1.0]),
            trip(&["7"], &[]),
        ];

        let (refined, total) = RouteInterpolator::new(&map).refine_all(trips);

        assert_eq!(total, 2);
        for t in &refined {
            assert_eq!(t.durations.len(), t.route.len() - 1);
            assert!(t.entry <= t.exit);
        }
    }
}

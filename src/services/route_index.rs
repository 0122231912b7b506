//! Lookup of inferred waypoints between canonical route positions
//!
//! Built once per run from the operator's reference path and shared by every
//! trip. For positions i < j the intermediates are the canonical entries
//! strictly between them in forward order; for i > j, in reverse order.
//! Pairs are visited i-then-j ascending, so when a waypoint repeats in the
//! canonical route the last pair written for a key wins.

use crate::domain::types::CameraId;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::{debug, info, warn};

/// Inferred intermediate waypoints for one ordered pair
pub type Intermediates = SmallVec<[CameraId; 4]>;

/// Immutable map from (from, to) waypoint pair to the waypoints between them
///
/// Keyed by origin, then destination, so lookups borrow both ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertionMap {
    entries: FxHashMap<CameraId, FxHashMap<CameraId, Intermediates>>,
    pairs: usize,
}

impl InsertionMap {
    /// Build the map from a canonical route.
    ///
    /// A route with fewer than two distinct waypoints yields an empty map.
    ///
    /// # Example
    ///
    /// ```
    /// use alpr_trips::domain::types::CameraId;
    /// use alpr_trips::services::route_index::InsertionMap;
    ///
    /// let route: Vec<CameraId> = ["A", "B", "C"].into_iter().map(CameraId::from).collect();
    /// let map = InsertionMap::from_canonical(&route);
    /// let between = map.get(&CameraId::from("C"), &CameraId::from("A")).unwrap();
    /// assert_eq!(between, &[CameraId::from("B")]);
    /// assert!(map.get(&CameraId::from("A"), &CameraId::from("B")).is_none());
    /// ```
    pub fn from_canonical(route: &[CameraId]) -> Self {
        let distinct: FxHashSet<&CameraId> = route.iter().collect();
        if distinct.len() < 2 {
            warn!(
                waypoints = %route.len(),
                distinct = %distinct.len(),
                "malformed_canonical_route"
            );
            return Self::default();
        }

        let mut entries: FxHashMap<CameraId, FxHashMap<CameraId, Intermediates>> =
            FxHashMap::default();
        let mut pairs = 0usize;
        let mut overwritten = 0usize;

        for (i, from) in route.iter().enumerate() {
            for (j, to) in route.iter().enumerate() {
                let between: Intermediates = if i < j {
                    route[i + 1..j].iter().cloned().collect()
                } else if i > j {
                    route[j + 1..i].iter().rev().cloned().collect()
                } else {
                    continue;
                };
                if between.is_empty() {
                    continue;
                }
                let targets = entries.entry(from.clone()).or_default();
                if targets.insert(to.clone(), between).is_some() {
                    overwritten += 1;
                } else {
                    pairs += 1;
                }
            }
        }

        if overwritten > 0 {
            debug!(overwritten = %overwritten, "canonical_route_repeated_waypoints");
        }
        info!(waypoints = %route.len(), pairs = %pairs, "insertion_map_built");

        Self { entries, pairs }
    }

    /// Intermediates for the ordered pair, if any
    pub fn get(&self, from: &CameraId, to: &CameraId) -> Option<&[CameraId]> {
        self.entries.get(from)?.get(to).map(|v| v.as_slice())
    }

    /// Number of (from, to) pairs with intermediates
    pub fn len(&self) -> usize {
        self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs == 0
    }
}

/// Parse an operator-typed route such as `"1, 2 ,3"`; blank entries are dropped
pub fn parse_route(input: &str) -> Vec<CameraId> {
    input.split(',').map(str::trim).filter(|s| !s.is_empty()).map(CameraId::from).collect()
}

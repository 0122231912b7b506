//! Gap-based segmentation of a vehicle's scans into trips
//!
//! Each plate group is folded through a two-state machine:
//!
//! ```text
//! NoTripOpen --first scan--> TripOpen
//! TripOpen --gap <= max--> TripOpen (extend)
//! TripOpen --gap > max--> emit, TripOpen (reseeded)
//! TripOpen --end of group--> emit
//! ```
//!
//! Input must be grouped by plate and time-ordered within each group;
//! violations are reported as `TrajectoryError` before any trip is built.

use crate::domain::error::TrajectoryError;
use crate::domain::trip::Trip;
use crate::domain::types::{minutes_between, ScanEvent};
use rustc_hash::FxHashSet;
use tracing::{debug, info};

/// Segmentation state for one plate group
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentState {
    NoTripOpen,
    TripOpen(Trip),
}

impl SegmentState {
    /// Feed one scan; returns the next state and a trip closed by this scan, if any
    pub fn step(self, event: &ScanEvent, max_gap_minutes: f64) -> (SegmentState, Option<Trip>) {
        match self {
            SegmentState::NoTripOpen => (SegmentState::TripOpen(Trip::open(event)), None),
            SegmentState::TripOpen(mut trip) => {
                let gap = minutes_between(trip.exit, event.timestamp);
                if gap > max_gap_minutes {
                    debug!(
                        plate = %trip.plate,
                        gap_minutes = %gap,
                        scans = %trip.len(),
                        "trip_split"
                    );
                    (SegmentState::TripOpen(Trip::open(event)), Some(trip))
                } else {
                    trip.extend(event, gap);
                    (SegmentState::TripOpen(trip), None)
                }
            }
        }
    }

    /// Close the group; returns the open trip, if any
    pub fn finish(self) -> Option<Trip> {
        match self {
            SegmentState::NoTripOpen => None,
            SegmentState::TripOpen(trip) => Some(trip),
        }
    }
}

/// Splits scan tables into trips
#[derive(Debug, Clone, Copy)]
pub struct TripSegmenter {
    max_gap_minutes: f64,
}

impl TripSegmenter {
    pub fn new(max_gap_minutes: f64) -> Self {
        Self { max_gap_minutes }
    }

    pub fn max_gap_minutes(&self) -> f64 {
        self.max_gap_minutes
    }

    /// Check that the table is grouped by plate and time-ordered per group
    pub fn validate(events: &[ScanEvent]) -> Result<(), TrajectoryError> {
        let mut finished: FxHashSet<&str> = FxHashSet::default();

        for (index, pair) in events.windows(2).enumerate() {
            let (prev, curr) = (&pair[0], &pair[1]);
            if prev.plate != curr.plate {
                finished.insert(prev.plate.as_str());
                if finished.contains(curr.plate.as_str()) {
                    return Err(TrajectoryError::UngroupedPlate {
                        plate: curr.plate.clone(),
                        index: index + 1,
                    });
                }
                continue;
            }
            if curr.timestamp < prev.timestamp {
                return Err(TrajectoryError::InputOrderingViolation {
                    plate: curr.plate.clone(),
                    index: index + 1,
                    previous: prev.timestamp,
                    current: curr.timestamp,
                });
            }
        }

        Ok(())
    }

    /// Segment one plate group (all scans share a plate, time-ordered)
    pub fn segment_group(&self, group: &[ScanEvent]) -> Vec<Trip> {
        let mut trips = Vec::new();
        let mut state = SegmentState::NoTripOpen;

        for event in group {
            let (next, closed) = state.step(event, self.max_gap_minutes);
            trips.extend(closed);
            state = next;
        }
        trips.extend(state.finish());

        trips
    }

    /// Segment a whole table grouped by plate
    pub fn segment(&self, events: &[ScanEvent]) -> Result<Vec<Trip>, TrajectoryError> {
        Self::validate(events)?;

        let mut trips = Vec::new();
        let mut groups = 0usize;
        for group in events.chunk_by(|a, b| a.plate == b.plate) {
            groups += 1;
            trips.extend(self.segment_group(group));
        }

        info!(
            scans = %events.len(),
            plates = %groups,
            trips = %trips.len(),
            max_gap_minutes = %self.max_gap_minutes,
            "segmentation_complete"
        );

        Ok(trips)
    }
}

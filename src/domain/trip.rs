//! Trip data model for vehicle paths through the camera network

use crate::domain::types::{serialize_timestamp, CameraId, ScanEvent};
use chrono::NaiveDateTime;
use serde::Serialize;

/// A maximal run of one vehicle's scans with no inter-scan gap above the
/// configured threshold.
///
/// `durations[i]` is the time in minutes from `route[i]` to `route[i + 1]`,
/// so `durations.len() == route.len() - 1` and `directions.len() == route.len()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    pub plate: String,
    pub route: Vec<CameraId>,
    pub durations: Vec<f64>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub entry: NaiveDateTime,
    #[serde(serialize_with = "serialize_timestamp")]
    pub exit: NaiveDateTime,
    pub directions: Vec<String>,
}

impl Trip {
    /// Open a trip seeded with its first scan.
    ///
    /// # Example
    ///
    /// ```
    /// use alpr_trips::domain::trip::Trip;
    /// use alpr_trips::domain::types::{parse_timestamp, ScanEvent};
    ///
    /// let ts = parse_timestamp("2024-03-01 08:00:00").unwrap();
    /// let trip = Trip::open(&ScanEvent::new("ABC123", "1", ts, "N"));
    /// assert_eq!(trip.route.len(), 1);
    /// assert!(trip.durations.is_empty());
    /// assert_eq!(trip.entry, trip.exit);
    /// ```
    pub fn open(event: &ScanEvent) -> Self {
        Self {
            plate: event.plate.clone(),
            route: vec![event.camera.clone()],
            durations: Vec::new(),
            entry: event.timestamp,
            exit: event.timestamp,
            directions: vec![event.direction.clone()],
        }
    }

    /// Append a scan reached `gap_minutes` after the previous one
    pub fn extend(&mut self, event: &ScanEvent, gap_minutes: f64) {
        self.durations.push(gap_minutes);
        self.route.push(event.camera.clone());
        self.directions.push(event.direction.clone());
        self.exit = event.timestamp;
    }

    /// Number of observed scans
    pub fn len(&self) -> usize {
        self.route.len()
    }

    pub fn is_empty(&self) -> bool {
        self.route.is_empty()
    }

    /// Total elapsed minutes across all legs
    pub fn total_minutes(&self) -> f64 {
        self.durations.iter().sum()
    }
}

/// A trip whose route and durations have been rewritten with inferred
/// intermediate waypoints. Plate, timestamps and directions are carried over
/// from the observed trip; `directions` stays aligned with the observed scans.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefinedTrip {
    pub plate: String,
    pub route: Vec<CameraId>,
    pub durations: Vec<f64>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub entry: NaiveDateTime,
    #[serde(serialize_with = "serialize_timestamp")]
    pub exit: NaiveDateTime,
    pub directions: Vec<String>,
}

impl RefinedTrip {
    /// Total elapsed minutes across all legs
    pub fn total_minutes(&self) -> f64 {
        self.durations.iter().sum()
    }
}

impl From<Trip> for RefinedTrip {
    fn from(trip: Trip) -> Self {
        Self {
            plate: trip.plate,
            route: trip.route,
            durations: trip.durations,
            entry: trip.entry,
            exit: trip.exit,
            directions: trip.directions,
        }
    }
}

/// A refined trip numbered within its plate by entry time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitRecord {
    pub visit_index: u32,
    #[serde(flatten)]
    pub trip: RefinedTrip,
}

impl VisitRecord {
    /// Convert to a single-line JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

//! Post-reconciliation plate filter
//!
//! Drops scans whose plate is still unreadable after reconciliation, the
//! "unknown" sentinel, and reads too short to identify a vehicle. The
//! surviving table is restored to plate-then-time order because rewriting
//! plates breaks the grouping of the input.

use crate::domain::types::ScanEvent;
use tracing::{debug, info};

/// Why a scan was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Unreadable,
    Sentinel,
    TooShort,
}

/// Counts from one filter pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterSummary {
    pub kept: usize,
    pub unreadable: usize,
    pub sentinel: usize,
    pub too_short: usize,
}

impl FilterSummary {
    pub fn dropped(&self) -> usize {
        self.unreadable + self.sentinel + self.too_short
    }
}

/// Filters invalid plates out of a reconciled scan table
#[derive(Debug, Clone)]
pub struct PlateFilter {
    unknown_sentinel: String,
    min_plate_len: usize,
}

impl Default for PlateFilter {
    fn default() -> Self {
        Self { unknown_sentinel: "unknown".to_string(), min_plate_len: 4 }
    }
}

impl PlateFilter {
    pub fn new(unknown_sentinel: &str, min_plate_len: usize) -> Self {
        Self { unknown_sentinel: unknown_sentinel.to_string(), min_plate_len }
    }

    /// Classify a plate; `None` means it is kept
    pub fn check(&self, plate: &str) -> Option<Rejection> {
        if plate.to_lowercase().chars().any(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit())) {
            return Some(Rejection::Unreadable);
        }
        if plate == self.unknown_sentinel {
            return Some(Rejection::Sentinel);
        }
        if plate.chars().count() < self.min_plate_len {
            return Some(Rejection::TooShort);
        }
        None
    }

    /// Keep valid scans, then stable-sort by plate then timestamp
    pub fn apply(&self, events: Vec<ScanEvent>) -> (Vec<ScanEvent>, FilterSummary) {
        let mut summary = FilterSummary::default();

        let mut kept: Vec<ScanEvent> = events
            .into_iter()
            .filter(|event| match self.check(&event.plate) {
                None => true,
                Some(reason) => {
                    debug!(plate = %event.plate, reason = ?reason, "scan_filtered");
                    match reason {
                        Rejection::Unreadable => summary.unreadable += 1,
                        Rejection::Sentinel => summary.sentinel += 1,
                        Rejection::TooShort => summary.too_short += 1,
                    }
                    false
                }
            })
            .collect();

        sort_scans(&mut kept);
        summary.kept = kept.len();

        info!(
            kept = %summary.kept,
            unreadable = %summary.unreadable,
            sentinel = %summary.sentinel,
            too_short = %summary.too_short,
            "plate_filter_complete"
        );

        (kept, summary)
    }
}

/// Stable sort by plate, then timestamp
pub fn sort_scans(events: &mut [ScanEvent]) {
    events.sort_by(|a, b| a.plate.cmp(&b.plate).then(a.timestamp.cmp(&b.timestamp)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::parse_timestamp;

    fn scan(plate: &str, camera: &str, ts: &str) -> ScanEvent {
        ScanEvent::new(plate, camera, parse_timestamp(ts).unwrap(), "N")
    }

    #[test]
    fn test_check_rules() {
        let filter = PlateFilter::default();

        assert_eq!(filter.check("AB1123"), None);
        assert_eq!(filter.check("AB#123"), Some(Rejection::Unreadable));
        assert_eq!(filter.check("AB 123"), Some(Rejection::Unreadable));
        assert_eq!(filter.check("unknown"), Some(Rejection::Sentinel));
        assert_eq!(filter.check("ABC"), Some(Rejection::TooShort));
        assert_eq!(filter.check("ABCD"), None);
    }

    #[test]
    fn test_sentinel_is_case_sensitive() {
        let filter = PlateFilter::default();
        assert_eq!(filter.check("UNKNOWN"), None);
    }

    #[test]
    fn test_apply_restores_plate_time_order() {
        let filter = PlateFilter::default();
        // A reconciled plate lands after its target's group
        let events = vec![
            scan("AB1123", "1", "2024-03-01 09:00:00"),
            scan("AB1123", "2", "2024-03-01 11:00:00"),
            scan("XY9999", "3", "2024-03-01 08:00:00"),
            scan("AB1123", "4", "2024-03-01 10:00:00"),
            scan("Q#Q", "5", "2024-03-01 10:00:00"),
        ];

        let (kept, summary) = filter.apply(events);

        let cameras: Vec<&str> = kept.iter().map(|e| e.camera.as_str()).collect();
        assert_eq!(cameras, vec!["1", "4", "2", "3"]);
        assert_eq!(summary.kept, 4);
        assert_eq!(summary.unreadable, 1);
        assert_eq!(summary.dropped(), 1);
    }
}

//! Run statistics for one pipeline pass
//!
//! Plain counters owned by the run that produced them; nothing is shared
//! between runs, so a pipeline can execute on any thread.

use crate::services::plate_filter::FilterSummary;
use crate::services::reconciler::ReconcileSummary;
use std::time::Duration;
use tracing::info;

/// Counters collected across the pipeline stages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineStats {
    pub events_in: usize,
    pub distinct_plates: usize,
    pub uncertain_plates: usize,
    pub resolved_plates: usize,
    pub unresolved_plates: usize,
    pub events_rewritten: usize,
    pub events_filtered: usize,
    pub events_segmented: usize,
    pub trips: usize,
    pub single_scan_trips: usize,
    /// Observed transitions that received inferred waypoints
    pub insertions_applied: usize,
    pub insertion_pairs: usize,
    pub elapsed: Duration,
}

impl PipelineStats {
    pub fn record_reconciliation(&mut self, summary: &ReconcileSummary) {
        self.distinct_plates = summary.distinct_plates;
        self.uncertain_plates = summary.uncertain_plates;
        self.resolved_plates = summary.resolved_plates;
        self.unresolved_plates = summary.unresolved_plates;
        self.events_rewritten = summary.events_rewritten;
    }

    pub fn record_filter(&mut self, summary: &FilterSummary) {
        self.events_filtered = summary.dropped();
        self.events_segmented = summary.kept;
    }

    /// Share of uncertain plates that were resolved (0.0 when there were none)
    pub fn resolution_rate(&self) -> f64 {
        if self.uncertain_plates == 0 {
            return 0.0;
        }
        self.resolved_plates as f64 / self.uncertain_plates as f64
    }

    /// Log the summary as a single structured line
    pub fn log(&self) {
        info!(
            events_in = %self.events_in,
            plates = %self.distinct_plates,
            uncertain = %self.uncertain_plates,
            resolved = %self.resolved_plates,
            resolution_rate = format!("{:.2}", self.resolution_rate()),
            filtered = %self.events_filtered,
            trips = %self.trips,
            single_scan_trips = %self.single_scan_trips,
            insertions = %self.insertions_applied,
            elapsed_ms = %self.elapsed.as_millis(),
            "pipeline_stats"
        );
    }
}

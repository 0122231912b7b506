//! Batch pipeline: raw scan log to numbered, refined trips
//!
//! validate -> reconcile -> filter -> segment -> interpolate -> number visits.
//! The caller's ordering precondition is checked on the raw table; the
//! regrouping needed after plates are rewritten is done by the filter.
//! The insertion map is built once per pipeline and reused for every trip.

use crate::domain::error::TrajectoryError;
use crate::domain::trip::VisitRecord;
use crate::domain::types::ScanEvent;
use crate::infra::config::Config;
use crate::infra::metrics::PipelineStats;
use crate::services::interpolator::RouteInterpolator;
use crate::services::reconciler::ReconciliationMap;
use crate::services::route_index::InsertionMap;
use crate::services::segmenter::TripSegmenter;
use crate::services::visits::number_visits;
use std::time::Instant;
use tracing::info;

/// Output of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub records: Vec<VisitRecord>,
    pub reconciliation: ReconciliationMap,
    pub stats: PipelineStats,
}

/// Owns the configuration and the precomputed insertion map
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
    insertions: InsertionMap,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        let insertions = InsertionMap::from_canonical(config.canonical_route());
        Self { config, insertions }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn insertions(&self) -> &InsertionMap {
        &self.insertions
    }

    /// Run the full pipeline over a plate-then-time sorted scan table
    pub fn run(&self, events: &[ScanEvent]) -> Result<PipelineOutput, TrajectoryError> {
        let started = Instant::now();
        let mut stats = PipelineStats { events_in: events.len(), ..PipelineStats::default() };

        TripSegmenter::validate(events)?;

        let reconciliation = self.config.reconciler().reconcile(events);
        stats.record_reconciliation(&reconciliation.summary);

        let (filtered, filter_summary) = self.config.plate_filter().apply(reconciliation.events);
        stats.record_filter(&filter_summary);

        let trips = self.config.segmenter().segment(&filtered)?;
        stats.trips = trips.len();
        stats.single_scan_trips = trips.iter().filter(|t| t.len() == 1).count();

        let interpolator =
            RouteInterpolator::new(&self.insertions).with_policy(self.config.insertion_policy());
        let (refined, insertions_applied) = interpolator.refine_all(trips);
        stats.insertions_applied = insertions_applied;
        stats.insertion_pairs = self.insertions.len();

        let records = number_visits(refined);
        stats.elapsed = started.elapsed();

        info!(
            records = %records.len(),
            policy = %self.config.insertion_policy().as_str(),
            elapsed_ms = %stats.elapsed.as_millis(),
            "pipeline_complete"
        );

        Ok(PipelineOutput { records, reconciliation: reconciliation.map, stats })
    }
}

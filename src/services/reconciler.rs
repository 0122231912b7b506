//! Plate identity reconciliation for partially unreadable reads
//!
//! A plate read containing uncertain-marker characters is resolved to the
//! nearest confident read when the edit distance between them does not exceed
//! the number of markers in the uncertain read. Resolved pairs are collected
//! into a `ReconciliationMap` and applied to the scan table in one pass.

use crate::domain::types::ScanEvent;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Edit distance used to compare plate strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    Levenshtein,
    /// Optimal string alignment: adjacent transpositions cost 1
    DamerauLevenshtein,
}

impl DistanceMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Levenshtein => "levenshtein",
            DistanceMetric::DamerauLevenshtein => "damerau_levenshtein",
        }
    }

    /// Edit distance between `a` and `b`, counted in characters
    pub fn distance(&self, a: &str, b: &str) -> usize {
        match self {
            DistanceMetric::Levenshtein => strsim::levenshtein(a, b),
            DistanceMetric::DamerauLevenshtein => strsim::osa_distance(a, b),
        }
    }
}

/// Which characters mark a low-confidence position in a plate read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerConvention {
    /// Any character outside `[A-Za-z0-9]`
    #[default]
    NonAlphanumeric,
    /// A single placeholder symbol, e.g. `#`
    Placeholder(char),
}

impl MarkerConvention {
    #[inline]
    pub fn is_marker(&self, c: char) -> bool {
        match self {
            MarkerConvention::NonAlphanumeric => !c.is_ascii_alphanumeric(),
            MarkerConvention::Placeholder(p) => c == *p,
        }
    }

    pub fn count(&self, plate: &str) -> usize {
        plate.chars().filter(|c| self.is_marker(*c)).count()
    }

    pub fn is_uncertain(&self, plate: &str) -> bool {
        plate.chars().any(|c| self.is_marker(c))
    }
}

/// Strip everything outside `[A-Za-z0-9]` and lowercase
pub fn normalize_plate(plate: &str) -> String {
    plate.chars().filter(|c| c.is_ascii_alphanumeric()).map(|c| c.to_ascii_lowercase()).collect()
}

/// Outcome of resolving one uncertain plate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Nearest certain plate is within the marker budget
    Matched { plate: String, distance: usize },
    /// Nearest certain plate exceeds the marker budget
    AboveThreshold { nearest: String, distance: usize, allowed: usize },
    /// There are no certain plates to compare against
    NoCandidateAvailable,
}

/// Mapping from original uncertain plate to resolved plate, in resolution order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationMap {
    entries: Vec<(String, String)>,
    index: FxHashMap<String, usize>,
}

impl ReconciliationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolution; a repeated key keeps its first position but takes the new target
    pub fn insert(&mut self, from: &str, to: &str) {
        match self.index.get(from) {
            Some(&i) => self.entries[i].1 = to.to_string(),
            None => {
                self.index.insert(from.to_string(), self.entries.len());
                self.entries.push((from.to_string(), to.to_string()));
            }
        }
    }

    pub fn get(&self, from: &str) -> Option<&str> {
        self.index.get(from).map(|&i| self.entries[i].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Counts from one reconciliation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub distinct_plates: usize,
    pub uncertain_plates: usize,
    pub certain_plates: usize,
    pub resolved_plates: usize,
    pub unresolved_plates: usize,
    pub events_rewritten: usize,
}

/// Result of reconciling a scan table
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub events: Vec<ScanEvent>,
    pub map: ReconciliationMap,
    pub summary: ReconcileSummary,
}

/// Precomputed comparison form of a certain plate
struct Candidate<'a> {
    original: &'a str,
    compare: String,
}

/// Resolves uncertain plate reads to the nearest confident read
#[derive(Debug, Clone, Copy)]
pub struct PlateReconciler {
    metric: DistanceMetric,
    normalize: bool,
    marker: MarkerConvention,
}

impl PlateReconciler {
    pub fn new(metric: DistanceMetric) -> Self {
        Self { metric, normalize: false, marker: MarkerConvention::default() }
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_marker(mut self, marker: MarkerConvention) -> Self {
        self.marker = marker;
        self
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Distinct plates split into (uncertain, certain), each in first-seen order
    pub fn partition<'a>(&self, events: &'a [ScanEvent]) -> (Vec<&'a str>, Vec<&'a str>) {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut uncertain = Vec::new();
        let mut certain = Vec::new();

        for event in events {
            let plate = event.plate.as_str();
            if !seen.insert(plate) {
                continue;
            }
            if self.marker.is_uncertain(plate) {
                uncertain.push(plate);
            } else {
                certain.push(plate);
            }
        }

        (uncertain, certain)
    }

    fn comparable(&self, plate: &str) -> String {
        if self.normalize {
            normalize_plate(plate)
        } else {
            plate.to_string()
        }
    }

    /// Resolve one uncertain plate against the certain plates.
    ///
    /// Ties keep the earliest candidate in `certain`. The acceptance budget is
    /// the marker count of the original, non-normalized plate.
    pub fn resolve(&self, uncertain: &str, certain: &[&str]) -> Resolution {
        let candidates: Vec<Candidate<'_>> =
            certain.iter().map(|c| Candidate { original: *c, compare: self.comparable(c) }).collect();
        self.resolve_among(uncertain, &candidates)
    }

    fn resolve_among(&self, uncertain: &str, candidates: &[Candidate<'_>]) -> Resolution {
        let probe = self.comparable(uncertain);

        let mut best: Option<(&str, usize)> = None;
        for candidate in candidates {
            let distance = self.metric.distance(&probe, &candidate.compare);
            match best {
                Some((_, min)) if distance >= min => {}
                _ => best = Some((candidate.original, distance)),
            }
        }

        let Some((nearest, distance)) = best else {
            return Resolution::NoCandidateAvailable;
        };

        let allowed = self.marker.count(uncertain);
        if distance <= allowed {
            Resolution::Matched { plate: nearest.to_string(), distance }
        } else {
            Resolution::AboveThreshold { nearest: nearest.to_string(), distance, allowed }
        }
    }

    /// Build the reconciliation map for a scan table
    pub fn build_map(&self, events: &[ScanEvent]) -> (ReconciliationMap, ReconcileSummary) {
        let (uncertain, certain) = self.partition(events);
        let mut map = ReconciliationMap::new();
        let mut summary = ReconcileSummary {
            distinct_plates: uncertain.len() + certain.len(),
            uncertain_plates: uncertain.len(),
            certain_plates: certain.len(),
            ..ReconcileSummary::default()
        };

        if uncertain.is_empty() {
            debug!(certain = %certain.len(), "reconcile_no_uncertain_plates");
            return (map, summary);
        }
        if certain.is_empty() {
            warn!(uncertain = %uncertain.len(), "reconcile_no_candidate_available");
            summary.unresolved_plates = uncertain.len();
            return (map, summary);
        }

        let candidates: Vec<Candidate<'_>> = certain
            .iter()
            .map(|c| Candidate { original: *c, compare: self.comparable(c) })
            .collect();

        for plate in &uncertain {
            match self.resolve_among(plate, &candidates) {
                Resolution::Matched { plate: resolved, distance } => {
                    debug!(plate = %plate, resolved = %resolved, distance = %distance, "plate_resolved");
                    map.insert(plate, &resolved);
                    summary.resolved_plates += 1;
                }
                Resolution::AboveThreshold { nearest, distance, allowed } => {
                    debug!(
                        plate = %plate,
                        nearest = %nearest,
                        distance = %distance,
                        allowed = %allowed,
                        "plate_unresolved"
                    );
                    summary.unresolved_plates += 1;
                }
                Resolution::NoCandidateAvailable => {
                    warn!(plate = %plate, "plate_no_candidate_available");
                    summary.unresolved_plates += 1;
                }
            }
        }

        (map, summary)
    }

    /// Reconcile a scan table: build the map, then rewrite in one pass
    pub fn reconcile(&self, events: &[ScanEvent]) -> Reconciliation {
        let (map, mut summary) = self.build_map(events);
        let (events, rewritten) = apply_map(events, &map);
        summary.events_rewritten = rewritten;

        info!(
            metric = %self.metric.as_str(),
            normalize = %self.normalize,
            uncertain = %summary.uncertain_plates,
            certain = %summary.certain_plates,
            resolved = %summary.resolved_plates,
            unresolved = %summary.unresolved_plates,
            events_rewritten = %summary.events_rewritten,
            "reconciliation_complete"
        );

        Reconciliation { events, map, summary }
    }
}

/// Rewrite every event whose plate is a map key; returns the new table and
/// the number of rewritten events
pub fn apply_map(events: &[ScanEvent], map: &ReconciliationMap) -> (Vec<ScanEvent>, usize) {
    if map.is_empty() {
        return (events.to_vec(), 0);
    }

    let mut rewritten = 0;
    let out = events
        .iter()
        .map(|event| match map.get(&event.plate) {
            Some(resolved) => {
                rewritten += 1;
                event.with_plate(resolved)
            }
            None => event.clone(),
        })
        .collect();

    (out, rewritten)
}

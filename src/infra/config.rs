//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. CONFIG_FILE environment variable
//! 3. Default: config/dev.toml

use crate::domain::types::CameraId;
use crate::services::interpolator::InsertionPolicy;
use crate::services::plate_filter::PlateFilter;
use crate::services::reconciler::{DistanceMetric, MarkerConvention, PlateReconciler};
use crate::services::segmenter::TripSegmenter;
use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    NonAlphanumeric,
    Placeholder,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReconciliationConfig {
    #[serde(default = "default_metric")]
    pub metric: DistanceMetric,
    #[serde(default)]
    pub normalize: bool,
    #[serde(default = "default_marker")]
    pub marker: MarkerKind,
    /// Placeholder symbol, used when `marker = "placeholder"`
    #[serde(default = "default_placeholder")]
    pub placeholder: char,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            metric: default_metric(),
            normalize: false,
            marker: default_marker(),
            placeholder: default_placeholder(),
        }
    }
}

fn default_metric() -> DistanceMetric {
    DistanceMetric::DamerauLevenshtein
}

fn default_marker() -> MarkerKind {
    MarkerKind::NonAlphanumeric
}

fn default_placeholder() -> char {
    '#'
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_unknown_sentinel")]
    pub unknown_sentinel: String,
    /// Plates shorter than this are dropped
    #[serde(default = "default_min_plate_len")]
    pub min_plate_len: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { unknown_sentinel: default_unknown_sentinel(), min_plate_len: default_min_plate_len() }
    }
}

fn default_unknown_sentinel() -> String {
    "unknown".to_string()
}

fn default_min_plate_len() -> usize {
    4
}

#[derive(Debug, Clone, Deserialize)]
pub struct SegmentationConfig {
    #[serde(default = "default_max_gap_minutes")]
    pub max_gap_minutes: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self { max_gap_minutes: default_max_gap_minutes() }
    }
}

fn default_max_gap_minutes() -> f64 {
    1440.0 // one day
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RouteConfig {
    /// Operator-declared reference path, in travel order
    #[serde(default)]
    pub canonical: Vec<CameraId>,
    #[serde(default)]
    pub insertion_policy: InsertionPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// File path for trip egress (JSONL format)
    #[serde(default = "default_trips_file")]
    pub trips_file: String,
    /// Optional tabular export with bracketed list columns
    #[serde(default)]
    pub table_file: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { trips_file: default_trips_file(), table_file: None }
    }
}

fn default_trips_file() -> String {
    "trips.jsonl".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub segmentation: SegmentationConfig,
    #[serde(default)]
    pub route: RouteConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    metric: DistanceMetric,
    normalize: bool,
    marker: MarkerConvention,
    unknown_sentinel: String,
    min_plate_len: usize,
    max_gap_minutes: f64,
    canonical_route: Vec<CameraId>,
    insertion_policy: InsertionPolicy,
    trips_file: String,
    table_file: Option<String>,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), "default")
    }
}

impl Config {
    fn from_toml(toml_config: TomlConfig, config_file: &str) -> Self {
        let reconciliation = toml_config.reconciliation;
        let marker = match reconciliation.marker {
            MarkerKind::NonAlphanumeric => MarkerConvention::NonAlphanumeric,
            MarkerKind::Placeholder => MarkerConvention::Placeholder(reconciliation.placeholder),
        };

        Self {
            metric: reconciliation.metric,
            normalize: reconciliation.normalize,
            marker,
            unknown_sentinel: toml_config.filter.unknown_sentinel,
            min_plate_len: toml_config.filter.min_plate_len,
            max_gap_minutes: toml_config.segmentation.max_gap_minutes,
            canonical_route: toml_config.route.canonical,
            insertion_policy: toml_config.route.insertion_policy,
            trips_file: toml_config.output.trips_file,
            table_file: toml_config.output.table_file,
            config_file: config_file.to_string(),
        }
    }

    /// Determine config file path: CLI argument, then `CONFIG_FILE`, then default
    pub fn resolve_config_path(cli_path: Option<&str>) -> String {
        if let Some(path) = cli_path {
            return path.to_string();
        }

        if let Ok(path) = env::var("CONFIG_FILE") {
            return path;
        }

        "config/dev.toml".to_string()
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self::from_toml(toml_config, &path.display().to_string()))
    }

    /// Load configuration from a path, falling back to defaults
    pub fn load_from_path(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %format!("{:#}", e), "config_load_failed_using_defaults");
                Self::default()
            }
        }
    }

    /// Reconciler configured with metric, normalization and marker convention
    pub fn reconciler(&self) -> PlateReconciler {
        PlateReconciler::new(self.metric).with_normalize(self.normalize).with_marker(self.marker)
    }

    pub fn plate_filter(&self) -> PlateFilter {
        PlateFilter::new(&self.unknown_sentinel, self.min_plate_len)
    }

    pub fn segmenter(&self) -> TripSegmenter {
        TripSegmenter::new(self.max_gap_minutes)
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn normalize(&self) -> bool {
        self.normalize
    }

    pub fn marker(&self) -> MarkerConvention {
        self.marker
    }

    pub fn unknown_sentinel(&self) -> &str {
        &self.unknown_sentinel
    }

    pub fn min_plate_len(&self) -> usize {
        self.min_plate_len
    }

    pub fn max_gap_minutes(&self) -> f64 {
        self.max_gap_minutes
    }

    pub fn canonical_route(&self) -> &[CameraId] {
        &self.canonical_route
    }

    pub fn insertion_policy(&self) -> InsertionPolicy {
        self.insertion_policy
    }

    pub fn trips_file(&self) -> &str {
        &self.trips_file
    }

    pub fn table_file(&self) -> Option<&str> {
        self.table_file.as_deref()
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Override the canonical route (CLI `--route`)
    pub fn with_canonical_route(mut self, route: Vec<CameraId>) -> Self {
        self.canonical_route = route;
        self
    }

    /// Override the maximum in-trip gap (CLI `--max-gap`)
    pub fn with_max_gap_minutes(mut self, minutes: f64) -> Self {
        self.max_gap_minutes = minutes;
        self
    }

    pub fn with_insertion_policy(mut self, policy: InsertionPolicy) -> Self {
        self.insertion_policy = policy;
        self
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_trips_file(mut self, path: &str) -> Self {
        self.trips_file = path.to_string();
        self
    }

    pub fn with_table_file(mut self, path: &str) -> Self {
        self.table_file = Some(path.to_string());
        self
    }
}

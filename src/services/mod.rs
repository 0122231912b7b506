//! Services - trip reconstruction stages
//!
//! This module contains the core business logic services:
//! - `reconciler` - Resolves uncertain plate reads to confident ones
//! - `plate_filter` - Drops unusable plates and regroups the scan table
//! - `segmenter` - Splits a vehicle's scans into trips by time gap
//! - `route_index` - Insertion map built from the canonical route
//! - `interpolator` - Splices inferred waypoints into trips
//! - `visits` - Per-plate visit numbering
//! - `pipeline` - Runs all stages over a scan table

pub mod interpolator;
pub mod pipeline;
pub mod plate_filter;
pub mod reconciler;
pub mod route_index;
pub mod segmenter;
pub mod visits;

// Re-export commonly used types
pub use interpolator::{InsertionPolicy, RouteInterpolator};
pub use pipeline::{Pipeline, PipelineOutput};
pub use plate_filter::PlateFilter;
pub use reconciler::{DistanceMetric, MarkerConvention, PlateReconciler, ReconciliationMap};
pub use route_index::InsertionMap;
pub use segmenter::TripSegmenter;

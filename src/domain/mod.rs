//! Domain models - core scan and trip types
//!
//! This module contains the canonical data types used throughout the system:
//! - `ScanEvent` - a single camera detection of a plate
//! - `CameraId` - waypoint identifier shared by scans and canonical routes
//! - `Trip` / `RefinedTrip` - segmented and interpolated vehicle paths
//! - `TrajectoryError` - fatal ordering violations

pub mod error;
pub mod trip;
pub mod types;

// Re-export commonly used types at module level
pub use error::TrajectoryError;
pub use trip::{RefinedTrip, Trip, VisitRecord};
pub use types::{CameraId, ScanEvent};

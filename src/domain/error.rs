//! Fatal errors raised by the trip pipeline
//!
//! Only ordering preconditions fail loudly. Recoverable conditions (no
//! candidate plate, malformed canonical route, missing duration) are handled
//! where they occur and reported through logs.

use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrajectoryError {
    /// A plate group's timestamps go backwards
    #[error(
        "input ordering violation for plate {plate}: scan {index} at {current} precedes previous scan at {previous}"
    )]
    InputOrderingViolation {
        plate: String,
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    /// A plate group resumes after scans of another plate
    #[error("input ordering violation: scans for plate {plate} resume at index {index} after another plate")]
    UngroupedPlate { plate: String, index: usize },
}

//! IO modules - external system interfaces
//!
//! This module contains all file IO operations:
//! - `scan_log` - Scan log ingestion (JSONL format)
//! - `egress` - Trip output to file (JSONL format)
//! - `trip_table` - Tabular trip export with bracketed list columns
//! - `graph` - Per-plate node/link JSON for visualization

pub mod egress;
pub mod graph;
pub mod scan_log;
pub mod trip_table;

// Re-export commonly used types
pub use egress::Egress;
pub use scan_log::{load_scans, ScanLog};

//! Trip egress - writes numbered trips to file
//!
//! Trips are written in JSONL format (one JSON object per line)
//! to the file specified in config.

use crate::domain::trip::VisitRecord;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Egress writer for trips
pub struct Egress {
    file_path: String,
}

impl Egress {
    pub fn new(file_path: &str) -> Self {
        info!(file_path = %file_path, "egress_initialized");
        Self { file_path: file_path.to_string() }
    }

    /// Write all trips in one append; returns the number written
    pub fn write_trips(&self, records: &[VisitRecord]) -> std::io::Result<usize> {
        let written = self.append_lines(records.iter().map(VisitRecord::to_json))?;
        info!(file = %self.file_path, trips = %written, "trips_egressed");
        Ok(written)
    }

    /// Append lines to the egress file
    fn append_lines<I: IntoIterator<Item = String>>(&self, lines: I) -> std::io::Result<usize> {
        let path = Path::new(&self.file_path);

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = BufWriter::new(file);

        let mut count = 0;
        for line in lines {
            writeln!(writer, "{}", line)?;
            count += 1;
        }
        writer.flush()?;

        Ok(count)
    }
}

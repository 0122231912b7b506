//! Scan log ingestion (JSONL format)
//!
//! One scan event per line. Blank lines are skipped; lines that fail to parse
//! are logged and counted, not fatal. The loaded table is sorted by plate then
//! timestamp before it is handed to the pipeline.

use crate::domain::types::ScanEvent;
use crate::services::plate_filter::sort_scans;
use anyhow::Context;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{info, warn};

/// Result of loading a scan log
#[derive(Debug, Clone, Default)]
pub struct ScanLog {
    pub events: Vec<ScanEvent>,
    pub skipped_lines: usize,
}

/// Parse scan events from any reader
pub fn read_scans<R: Read>(reader: R) -> anyhow::Result<ScanLog> {
    let mut log = ScanLog::default();

    for (i, line) in BufReader::new(reader).lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read scan log line {}", i + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<ScanEvent>(trimmed) {
            Ok(event) => log.events.push(event),
            Err(e) => {
                warn!(line = %(i + 1), error = %e, "scan_line_skipped");
                log.skipped_lines += 1;
            }
        }
    }

    sort_scans(&mut log.events);
    Ok(log)
}

/// Load and sort a scan log file
pub fn load_scans<P: AsRef<Path>>(path: P) -> anyhow::Result<ScanLog> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open scan log {}", path.display()))?;
    let log = read_scans(file)?;

    info!(
        file = %path.display(),
        events = %log.events.len(),
        skipped = %log.skipped_lines,
        "scan_log_loaded"
    );

    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_scans_sorts_and_skips() {
        let input = r#"
{"plate":"XY9999","camera":1,"timestamp":"2024-03-01 08:00:00","direction":"N"}
{"plate":"AB1123","camera":"2","timestamp":"2024-03-01 09:00:00","direction":"S"}
not json
{"plate":"AB1123","camera":"1","timestamp":"2024-03-01 07:00:00","direction":"S"}

"#;

        let log = read_scans(input.as_bytes()).unwrap();

        assert_eq!(log.skipped_lines, 1);
        let order: Vec<(&str, &str)> =
            log.events.iter().map(|e| (e.plate.as_str(), e.camera.as_str())).collect();
        assert_eq!(order, vec![("AB1123", "1"), ("AB1123", "2"), ("XY9999", "1")]);
    }

    #[test]
    fn test_null_direction_keeps_scan() {
        let input = r#"{"plate":"AB1123","camera":1,"timestamp":"2024-03-01 00:00:00","direction":null}"#;

        let log = read_scans(input.as_bytes()).unwrap();

        assert_eq!(log.skipped_lines, 0);
        assert_eq!(log.events.len(), 1);
        assert_eq!(log.events[0].direction, "");
    }

    #[test]
    fn test_load_scans_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"plate":"AB1123","camera":3,"timestamp":"2024-03-01T10:00:00"}}"#)
            .unwrap();
        file.flush().unwrap();

        let log = load_scans(file.path()).unwrap();

        assert_eq!(log.events.len(), 1);
        assert_eq!(log.events[0].camera.as_str(), "3");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_scans("/nonexistent/scans.jsonl").unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to open scan log"));
    }
}

//! Tabular trip export with bracketed list columns
//!
//! Columns: `plate,visit_index,route,durations,directions,entry_date,exit_date`.
//! Sequence columns use the bracketed form `[a, b, c]` that the graph export
//! and downstream spreadsheets expect, quoted whenever they hold a comma.

use crate::domain::trip::VisitRecord;
use crate::domain::types::TIMESTAMP_FORMAT;
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

pub const HEADER: &str = "plate,visit_index,route,durations,directions,entry_date,exit_date";

/// Format items as `[a, b, c]`
pub fn format_list<T: std::fmt::Display>(items: &[T]) -> String {
    let inner: Vec<String> = items.iter().map(|item| item.to_string()).collect();
    format!("[{}]", inner.join(", "))
}

/// Format minutes keeping a decimal point, e.g. `10.0`
pub fn format_minutes(minutes: &[f64]) -> String {
    let inner: Vec<String> = minutes.iter().map(|m| format!("{:?}", m)).collect();
    format!("[{}]", inner.join(", "))
}

/// Parse `[a, b, c]` back into its items; `[]` and blank input give no items
pub fn parse_list(field: &str) -> Vec<String> {
    let inner = field.trim().trim_start_matches('[').trim_end_matches(']').trim();
    if inner.is_empty() {
        return Vec::new();
    }
    inner.split(',').map(|s| s.trim().trim_matches('\'').to_string()).collect()
}

/// Quote a field when it contains a delimiter, quote or newline
fn escape(field: &str) -> String {
    if field.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render one record as a table row (no trailing newline)
pub fn format_row(record: &VisitRecord) -> String {
    let trip = &record.trip;
    [
        escape(&trip.plate),
        record.visit_index.to_string(),
        escape(&format_list(&trip.route)),
        escape(&format_minutes(&trip.durations)),
        escape(&format_list(&trip.directions)),
        trip.entry.format(TIMESTAMP_FORMAT).to_string(),
        trip.exit.format(TIMESTAMP_FORMAT).to_string(),
    ]
    .join(",")
}

/// Write the header and all rows to `writer`
pub fn write_table<W: Write>(mut writer: W, records: &[VisitRecord]) -> std::io::Result<()> {
    writeln!(writer, "{}", HEADER)?;
    for record in records {
        writeln!(writer, "{}", format_row(record))?;
    }
    writer.flush()
}

/// Write the table to a file, replacing any previous content
pub fn write_table_file<P: AsRef<Path>>(path: P, records: &[VisitRecord]) -> anyhow::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create trip table {}", path.display()))?;
    write_table(BufWriter::new(file), records)
        .with_context(|| format!("Failed to write trip table {}", path.display()))?;

    info!(file = %path.display(), rows = %records.len(), "trip_table_written");
    Ok(())
}

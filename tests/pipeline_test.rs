//! Integration tests for the scan-log-to-trips pipeline

use alpr_trips::domain::types::{parse_timestamp, CameraId, ScanEvent};
use alpr_trips::domain::TrajectoryError;
use alpr_trips::infra::Config;
use alpr_trips::io::graph::plate_graphs;
use alpr_trips::io::scan_log::read_scans;
use alpr_trips::io::trip_table::{parse_list, write_table};
use alpr_trips::io::Egress;
use alpr_trips::services::route_index::parse_route;
use alpr_trips::services::{DistanceMetric, InsertionPolicy, Pipeline};
use std::fs;
use tempfile::tempdir;

const SCAN_LOG: &str = r#"
{"plate":"ABC123","camera":1,"timestamp":"2024-03-01 00:00:00","direction":"N"}
{"plate":"ABC123","camera":2,"timestamp":"2024-03-01 00:10:00","direction":"N"}
{"plate":"ABC123","camera":3,"timestamp":"2024-03-01 02:00:00","direction":"S"}
{"plate":"AB#123","camera":5,"timestamp":"2024-03-01 02:20:00","direction":"S"}
{"plate":"XY9999","camera":1,"timestamp":"2024-03-01 06:00:00","direction":"E"}
{"plate":"XY9999","camera":4,"timestamp":"2024-03-01 06:40:00","direction":"E"}
{"plate":"unknown","camera":1,"timestamp":"2024-03-01 06:00:00","direction":"E"}
{"plate":"Q#","camera":1,"timestamp":"2024-03-01 06:00:00","direction":"E"}
"#;

fn ts(s: &str) -> chrono::NaiveDateTime {
    parse_timestamp(s).unwrap()
}

fn ids(names: &[&str]) -> Vec<CameraId> {
    names.iter().map(|n| CameraId::from(*n)).collect()
}

fn pipeline(policy: InsertionPolicy) -> Pipeline {
    let config = Config::default()
        .with_max_gap_minutes(60.0)
        .with_metric(DistanceMetric::Levenshtein)
        .with_canonical_route(parse_route("1, 2, 3, 4, 5"))
        .with_insertion_policy(policy);
    Pipeline::new(config)
}

#[test]
fn test_scan_log_to_trips() {
    let log = read_scans(SCAN_LOG.as_bytes()).unwrap();
    let output = pipeline(InsertionPolicy::RetainObserved).run(&log.events).unwrap();

    assert_eq!(output.reconciliation.get("AB#123"), Some("ABC123"));

    let summary: Vec<(&str, u32, Vec<CameraId>)> = output
        .records
        .iter()
        .map(|r| (r.trip.plate.as_str(), r.visit_index, r.trip.route.clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("ABC123", 1, ids(&["1", "2"])),
            ("ABC123", 2, ids(&["3", "4", "5"])),
            ("XY9999", 1, ids(&["1", "2", "3", "4"])),
        ]
    );

    let second = &output.records[1].trip;
    assert_eq!(second.durations, vec![10.0, 10.0]);
    assert_eq!(second.entry, ts("2024-03-01 02:00:00"));
    assert_eq!(second.exit, ts("2024-03-01 02:20:00"));
    assert_eq!(second.directions, vec!["S".to_string(), "S".to_string()]);

    let third = &output.records[2].trip;
    let third_total: f64 = third.durations.iter().sum();
    assert!((third_total - 40.0).abs() < 1e-9);

    for record in &output.records {
        assert_eq!(record.trip.durations.len(), record.trip.route.len() - 1);
        assert!(record.trip.entry <= record.trip.exit);
    }

    assert_eq!(output.stats.events_in, 8);
    assert_eq!(output.stats.events_filtered, 2);
    assert_eq!(output.stats.trips, 3);
    assert_eq!(output.stats.insertions_applied, 2);
}

#[test]
fn test_drop_observed_policy_output() {
    let log = read_scans(SCAN_LOG.as_bytes()).unwrap();
    let output = pipeline(InsertionPolicy::DropObserved).run(&log.events).unwrap();

    let xy = &output.records[2].trip;
    assert_eq!(xy.route, ids(&["1", "2", "3"]));
    assert_eq!(xy.durations.len(), 3);
}

#[test]
fn test_segmentation_scenario() {
    let events = vec![
        ScanEvent::new("ABC123", "1", ts("2024-03-01 00:00:00"), "N"),
        ScanEvent::new("ABC123", "2", ts("2024-03-01 00:10:00"), "N"),
        ScanEvent::new("ABC123", "3", ts("2024-03-01 02:00:00"), "N"),
    ];
    let pipeline = Pipeline::new(Config::default().with_max_gap_minutes(60.0));

    let output = pipeline.run(&events).unwrap();

    assert_eq!(output.records.len(), 2);
    assert_eq!(output.records[0].trip.route, ids(&["1", "2"]));
    assert_eq!(output.records[0].trip.durations, vec![10.0]);
    assert_eq!(output.records[1].trip.route, ids(&["3"]));
    assert!(output.records[1].trip.durations.is_empty());
    assert_eq!(output.records[1].trip.entry, output.records[1].trip.exit);
}

#[test]
fn test_ordering_violation_surfaces() {
    let events = vec![
        ScanEvent::new("ABC123", "1", ts("2024-03-01 01:00:00"), "N"),
        ScanEvent::new("ABC123", "2", ts("2024-03-01 00:00:00"), "N"),
    ];

    let err = Pipeline::new(Config::default()).run(&events).unwrap_err();

    assert!(matches!(err, TrajectoryError::InputOrderingViolation { .. }));
}

#[test]
fn test_pipeline_runs_on_background_thread() {
    let log = read_scans(SCAN_LOG.as_bytes()).unwrap();
    let pipeline = pipeline(InsertionPolicy::RetainObserved);

    let handle = std::thread::spawn(move || pipeline.run(&log.events).map(|o| o.records.len()));

    assert_eq!(handle.join().unwrap().unwrap(), 3);
}

#[test]
fn test_exports() {
    let log = read_scans(SCAN_LOG.as_bytes()).unwrap();
    let output = pipeline(InsertionPolicy::RetainObserved).run(&log.events).unwrap();
    let dir = tempdir().unwrap();

    let trips_path = dir.path().join("out").join("trips.jsonl");
    let written = Egress::new(trips_path.to_str().unwrap()).write_trips(&output.records).unwrap();
    assert_eq!(written, 3);
    let content = fs::read_to_string(&trips_path).unwrap();
    let first: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
    assert_eq!(first["plate"], "ABC123");
    assert_eq!(first["route"], serde_json::json!(["1", "2"]));

    let mut table = Vec::new();
    write_table(&mut table, &output.records).unwrap();
    let table = String::from_utf8(table).unwrap();
    let row = table.lines().nth(3).unwrap();
    assert!(row.starts_with("XY9999,1,\"[1, 2, 3, 4]\","));
    assert_eq!(parse_list("[1, 2, 3, 4]"), vec!["1", "2", "3", "4"]);

    let graphs = plate_graphs(&output.records, "ABC123");
    assert_eq!(graphs.len(), 2);
    assert_eq!(graphs[1].links.len(), 2);
    assert_eq!(graphs[1].links[0].time, 10.0);
}

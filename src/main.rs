//! alpr-trips - reconstruct vehicle trips from ALPR scan logs
//!
//! Module structure:
//! - `domain/` - Core types (ScanEvent, Trip, errors)
//! - `services/` - Reconciliation, segmentation, interpolation, pipeline
//! - `io/` - Scan log ingestion and trip export
//! - `infra/` - Config and run statistics

use alpr_trips::infra::Config;
use alpr_trips::io::{graph, load_scans, trip_table, Egress};
use alpr_trips::services::route_index::parse_route;
use alpr_trips::services::Pipeline;
use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Reconstruct vehicle trips from an ALPR scan log
#[derive(Parser, Debug)]
#[command(name = "alpr-trips", version, about)]
struct Args {
    /// Path to TOML configuration file [default: $CONFIG_FILE or config/dev.toml]
    #[arg(short, long)]
    config: Option<String>,

    /// Scan log to process (JSONL, one scan per line)
    #[arg(short, long)]
    input: String,

    /// Trip output file (JSONL); overrides output.trips_file
    #[arg(short, long)]
    output: Option<String>,

    /// Tabular trip export; overrides output.table_file
    #[arg(long)]
    table: Option<String>,

    /// Canonical route as comma-separated camera ids; overrides route.canonical
    #[arg(long)]
    route: Option<String>,

    /// Maximum gap in minutes between scans of one trip
    #[arg(long)]
    max_gap: Option<f64>,

    /// Plate to export as node/link graphs
    #[arg(long, requires = "graph_file")]
    graph_plate: Option<String>,

    /// Destination for the plate graphs (JSON)
    #[arg(long, requires = "graph_plate")]
    graph_file: Option<String>,
}

fn main() -> anyhow::Result<()> {
    // Initialize structured logging with configurable level via RUST_LOG env var
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    let args = Args::parse();

    let config_path = Config::resolve_config_path(args.config.as_deref());
    let mut config = Config::load_from_path(&config_path);
    if let Some(route) = &args.route {
        config = config.with_canonical_route(parse_route(route));
    }
    if let Some(minutes) = args.max_gap {
        config = config.with_max_gap_minutes(minutes);
    }
    if let Some(output) = &args.output {
        config = config.with_trips_file(output);
    }
    if let Some(table) = &args.table {
        config = config.with_table_file(table);
    }

    info!(
        config_file = %config.config_file(),
        metric = %config.metric().as_str(),
        normalize = %config.normalize(),
        marker = ?config.marker(),
        max_gap_minutes = %config.max_gap_minutes(),
        canonical_route = ?config.canonical_route(),
        insertion_policy = %config.insertion_policy().as_str(),
        "config_loaded"
    );

    let log = load_scans(&args.input)?;
    let pipeline = Pipeline::new(config);
    let output = pipeline.run(&log.events).context("Trip reconstruction failed")?;

    let config = pipeline.config();
    Egress::new(config.trips_file())
        .write_trips(&output.records)
        .with_context(|| format!("Failed to write trips to {}", config.trips_file()))?;

    if let Some(table) = config.table_file() {
        trip_table::write_table_file(table, &output.records)?;
    }

    if let (Some(plate), Some(file)) = (&args.graph_plate, &args.graph_file) {
        graph::write_plate_graphs(file, &output.records, plate)?;
    }

    output.stats.log();
    info!("alpr-trips complete");
    Ok(())
}

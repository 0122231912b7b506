//! Per-plate node/link graphs for the visualization front end

use crate::domain::trip::{RefinedTrip, VisitRecord};
use anyhow::Context;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    pub time: f64,
}

/// One trip as a graph: unique waypoints and one link per consecutive pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl TripGraph {
    pub fn from_trip(trip: &RefinedTrip) -> Self {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let nodes = trip
            .route
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .map(|id| GraphNode { id: id.to_string() })
            .collect();

        let links = trip
            .route
            .windows(2)
            .enumerate()
            .map(|(i, pair)| GraphLink {
                source: pair[0].to_string(),
                target: pair[1].to_string(),
                time: trip.durations.get(i).copied().unwrap_or(0.0),
            })
            .collect();

        Self { nodes, links }
    }
}

/// Graphs for every trip of one plate, in record order
pub fn plate_graphs(records: &[VisitRecord], plate: &str) -> Vec<TripGraph> {
    records
        .iter()
        .filter(|r| r.trip.plate == plate)
        .map(|r| TripGraph::from_trip(&r.trip))
        .collect()
}

/// Write one plate's graphs as a pretty JSON array; returns the graph count
pub fn write_plate_graphs<P: AsRef<Path>>(
    path: P,
    records: &[VisitRecord],
    plate: &str,
) -> anyhow::Result<usize> {
    let path = path.as_ref();
    let graphs = plate_graphs(records, plate);
    let json = serde_json::to_string_pretty(&graphs).context("Failed to serialize graphs")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write graph file {}", path.display()))?;

    info!(plate = %plate, graphs = %graphs.len(), file = %path.display(), "plate_graphs_written");
    Ok(graphs.len())
}

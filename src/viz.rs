// src/viz.rs
//! Client-facing JSON projection of a built artifact.

use serde::Serialize;

use crate::pipeline::BuildArtifact;

#[derive(Debug, Serialize)]
pub struct VizNode {
    pub label: String,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Serialize)]
pub struct VizLink {
    pub source: String,
    pub target: String,
    pub weight: u64,
}

#[derive(Debug, Serialize)]
pub struct VizMeta {
    pub self_edge_weight: u64,
    pub date_from: String,
    pub date_to: String,
}

/// What a visualization client consumes: area polygons, weighted links,
/// and the ingest metadata when the graph went through ingestion.
#[derive(Debug, Serialize)]
pub struct VizDocument {
    pub bounds: [[f64; 2]; 2],
    pub nodes: Vec<VizNode>,
    pub links: Vec<VizLink>,
    pub meta: Option<VizMeta>,
}

impl VizDocument {
    /// # Errors
    /// Returns the underlying serializer error, which for this
    /// derive-only tree does not occur in practice.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Projects an artifact into its visualization document.
#[must_use]
pub fn assemble(artifact: &BuildArtifact) -> VizDocument {
    let (low, high) = artifact.facility.bounds();

    let nodes = artifact
        .facility
        .areas()
        .iter()
        .map(|area| VizNode {
            label: area.label().to_string(),
            points: area.boundary().iter().map(|p| [p.x, p.y]).collect(),
        })
        .collect();

    let links = artifact
        .facility
        .edges()
        .map(|(source, target, weight)| VizLink {
            source: source.to_string(),
            target: target.to_string(),
            weight,
        })
        .collect();

    let meta = artifact.stats.as_ref().map(|s| VizMeta {
        self_edge_weight: s.self_edge_weight,
        date_from: s.date_from.clone(),
        date_to: s.date_to.clone(),
    });

    VizDocument {
        bounds: [[low.x, low.y], [high.x, high.y]],
        nodes,
        links,
        meta,
    }
}

// src/facility.rs
//! The facility graph: named area nodes plus weighted directed edges.
//!
//! This is a bare registry. It does not validate its extent, does not
//! second-guess its callers, and fails loudly on contract violations
//! (duplicate labels, unknown endpoints). The one expected failure is
//! [`FlowError::SelfEdgeNotSupported`], which callers absorb into a
//! running total instead of storing a meaningless self-referential trip.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};
use crate::geometry::{Area, Point2D};

/// Suffix addressing the routable centroid sub-node of an area.
pub const CENTROID_SUFFIX: &str = ".centroid";

/// Returns the centroid node label for an area label.
#[must_use]
pub fn centroid_label(area_label: &str) -> String {
    format!("{area_label}{CENTROID_SUFFIX}")
}

/// Strips one trailing centroid suffix, yielding the owning area label.
#[must_use]
pub fn base_label(node_label: &str) -> &str {
    node_label
        .strip_suffix(CENTROID_SUFFIX)
        .unwrap_or(node_label)
}

/// Weighted node/edge structure over the areas of one facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    bounds: (Point2D, Point2D),
    areas: Vec<Area>,
    // from -> to -> accumulated weight; sorted maps keep edge iteration
    // deterministic for a fixed insertion sequence.
    edges: BTreeMap<String, BTreeMap<String, u64>>,
}

impl Facility {
    /// Creates an empty registry scoped to a rectangular extent.
    ///
    /// The extent is stored as given; `low < high` is the caller's
    /// problem.
    #[must_use]
    pub fn new(low: Point2D, high: Point2D) -> Self {
        Self {
            bounds: (low, high),
            areas: Vec::new(),
            edges: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn bounds(&self) -> (Point2D, Point2D) {
        self.bounds
    }

    /// Registers a new area node.
    ///
    /// # Errors
    /// Returns [`FlowError::DuplicateLabel`] if an area with the same
    /// label already exists. Nothing is overwritten.
    pub fn add_area(&mut self, area: Area) -> Result<()> {
        if self.area(area.label()).is_some() {
            return Err(FlowError::DuplicateLabel(area.label().to_string()));
        }
        self.areas.push(area);
        Ok(())
    }

    /// Accumulates a transport record into the ordered-pair edge weight.
    ///
    /// Endpoints may address an area node or its `.centroid` sub-node;
    /// both resolve to the registered area. The edge entry is created at
    /// weight 0 first if absent, so repeated inserts sum.
    ///
    /// # Errors
    /// - [`FlowError::SelfEdgeNotSupported`] when `source == destination`
    ///   (exact, case-sensitive). The edge map is untouched.
    /// - [`FlowError::UnknownLabel`] when either endpoint does not
    ///   resolve to an area registered via [`Facility::add_area`].
    pub fn add_transport_record(
        &mut self,
        source: &str,
        destination: &str,
        weight: u64,
    ) -> Result<()> {
        if source == destination {
            return Err(FlowError::SelfEdgeNotSupported(source.to_string()));
        }
        if self.area(base_label(source)).is_none() {
            return Err(FlowError::UnknownLabel(source.to_string()));
        }
        if self.area(base_label(destination)).is_none() {
            return Err(FlowError::UnknownLabel(destination.to_string()));
        }

        let slot = self
            .edges
            .entry(source.to_string())
            .or_default()
            .entry(destination.to_string())
            .or_insert(0);
        *slot += weight;
        Ok(())
    }

    /// Areas in insertion order.
    #[must_use]
    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// Looks up an area by its exact label.
    #[must_use]
    pub fn area(&self, label: &str) -> Option<&Area> {
        self.areas.iter().find(|a| a.label() == label)
    }

    /// All edges as `(source, destination, weight)`, in sorted order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, u64)> {
        self.edges.iter().flat_map(|(from, tos)| {
            tos.iter()
                .map(move |(to, w)| (from.as_str(), to.as_str(), *w))
        })
    }

    /// Current weight of the ordered-pair edge, if any.
    #[must_use]
    pub fn edge_weight(&self, source: &str, destination: &str) -> Option<u64> {
        self.edges.get(source).and_then(|tos| tos.get(destination)).copied()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeMap::len).sum()
    }
}

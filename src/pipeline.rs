// src/pipeline.rs
//! The ingestion pipeline: layout → record ingestion → stats.
//!
//! Runs once per build, synchronously, on its own `Facility` instance.
//! There is no partial re-entry; a build either completes or fails.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::BuildConfig;
use crate::error::{FlowError, Result};
use crate::facility::{centroid_label, Facility};
use crate::parse::{layout, RecordParser, TransportRecord};

/// Fixed timestamp format shared by sources, boundaries and outputs.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Width of the suffix trailing every source timestamp. Rigid contract:
/// exactly this many characters are cut, nothing is trimmed.
const TIMESTAMP_SUFFIX_LEN: usize = 4;

// Inverted sentinel span; the first observed record replaces both ends.
const OPEN_RANGE_FROM: &str = "9999-01-01 00:00:00";
const OPEN_RANGE_TO: &str = "1002-01-01 00:00:00";

/// Inclusive date range filter, fixed format, no source suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateBoundaries {
    pub from: String,
    pub to: String,
}

impl DateBoundaries {
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Metadata derived while ingesting, carried alongside the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Total weight of records whose endpoints resolved to the same area.
    pub self_edge_weight: u64,
    /// Observed (or echoed) date span, fixed format.
    pub date_from: String,
    pub date_to: String,
    /// Records accumulated into the graph.
    pub inserted: usize,
    /// Records excluded by the error list or the date range.
    pub skipped: usize,
    /// Source rows the parser could not resolve.
    pub dropped_rows: usize,
}

/// A built facility graph plus its derived metadata.
///
/// `stats` is `None` for graphs that were handed in prebuilt and never
/// went through ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildArtifact {
    pub facility: Facility,
    pub stats: Option<IngestStats>,
}

/// Drives one build over a borrowed configuration.
pub struct IngestionPipeline<'a> {
    config: &'a BuildConfig,
}

impl<'a> IngestionPipeline<'a> {
    #[must_use]
    pub fn new(config: &'a BuildConfig) -> Self {
        Self { config }
    }

    /// Runs the three phases and returns the built artifact.
    ///
    /// # Errors
    /// Layout malformation, unknown labels, invalid timestamps or
    /// weights, and I/O failures are all fatal and abort the build.
    pub fn run(&self, boundaries: Option<&DateBoundaries>) -> Result<BuildArtifact> {
        let (low, high) = self.config.extent();
        let mut facility = Facility::new(low, high);
        layout::load_layout(&self.config.facility_source_path, &mut facility)?;

        let parsed = RecordParser::new(
            &self.config.masterplan_csv_path,
            &self.config.peg_csv_path,
        )
        .parse()?;

        let mut stats = IngestStats {
            dropped_rows: parsed.dropped,
            ..IngestStats::default()
        };

        let range = match boundaries {
            Some(b) => Some((parse_boundary(&b.from)?, parse_boundary(&b.to)?)),
            None => None,
        };
        let mut observed_from = parse_boundary(OPEN_RANGE_FROM)?;
        let mut observed_to = parse_boundary(OPEN_RANGE_TO)?;

        for record in parsed.records.values() {
            if self.is_error_record(record) {
                stats.skipped += 1;
                continue;
            }

            let ts = parse_timestamp(&record.timestamp)?;
            match range {
                None => {
                    if ts < observed_from {
                        observed_from = ts;
                    }
                    if ts > observed_to {
                        observed_to = ts;
                    }
                }
                Some((from, to)) => {
                    if ts < from || ts > to {
                        stats.skipped += 1;
                        continue;
                    }
                }
            }

            let weight: u64 = record
                .weight
                .parse()
                .map_err(|_| FlowError::InvalidWeight(record.weight.clone()))?;

            let src = centroid_label(&record.source);
            let dst = centroid_label(&record.destination);
            match facility.add_transport_record(&src, &dst, weight) {
                Ok(()) => stats.inserted += 1,
                Err(FlowError::SelfEdgeNotSupported(_)) => stats.self_edge_weight += weight,
                Err(e) => return Err(e),
            }
        }

        let (date_from, date_to) = match boundaries {
            Some(b) => (b.from.clone(), b.to.clone()),
            None => (
                observed_from.format(DATE_FORMAT).to_string(),
                observed_to.format(DATE_FORMAT).to_string(),
            ),
        };
        stats.date_from = date_from;
        stats.date_to = date_to;

        info!(
            inserted = stats.inserted,
            skipped = stats.skipped,
            dropped = stats.dropped_rows,
            self_edge_weight = stats.self_edge_weight,
            "ingestion finished"
        );
        debug!(edges = facility.edge_count(), areas = facility.areas().len(), "graph built");

        Ok(BuildArtifact {
            facility,
            stats: Some(stats),
        })
    }

    fn is_error_record(&self, record: &TransportRecord) -> bool {
        self.config.is_error_label(&record.source) || self.config.is_error_label(&record.destination)
    }
}

/// Parses a source timestamp: cuts the fixed-width suffix, then applies
/// the fixed format.
fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let cut = raw
        .len()
        .checked_sub(TIMESTAMP_SUFFIX_LEN)
        .and_then(|end| raw.get(..end))
        .ok_or_else(|| FlowError::InvalidTimestamp(raw.to_string()))?;
    NaiveDateTime::parse_from_str(cut, DATE_FORMAT)
        .map_err(|_| FlowError::InvalidTimestamp(raw.to_string()))
}

/// Parses a boundary timestamp, which carries no suffix.
fn parse_boundary(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| FlowError::InvalidTimestamp(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_cuts_suffix() {
        let ts = parse_timestamp("2015-05-25 18:00:00.000").unwrap();
        assert_eq!(ts.format(DATE_FORMAT).to_string(), "2015-05-25 18:00:00");
    }

    #[test]
    fn test_parse_timestamp_rejects_short_input() {
        assert!(matches!(
            parse_timestamp("abc"),
            Err(FlowError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_parse_timestamp_rejects_bad_body() {
        assert!(matches!(
            parse_timestamp("not-a-date at all.000"),
            Err(FlowError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_parse_boundary_takes_bare_format() {
        let ts = parse_boundary("2015-05-25 18:00:00").unwrap();
        assert_eq!(ts.format(DATE_FORMAT).to_string(), "2015-05-25 18:00:00");
        assert!(parse_boundary("2015-05-25 18:00:00.000").is_err());
    }
}

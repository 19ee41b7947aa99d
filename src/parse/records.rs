// src/parse/records.rs
//! Transport-record parsing: joins the masterplan source against the peg
//! lookup and yields normalized records.
//!
//! Parsing is best-effort by contract. A row that cannot be resolved
//! (join miss, short row, non-numeric weight) is dropped, counted and
//! logged; one bad row never aborts the parse. Unreadable files do.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::{FlowError, Result};

/// One normalized movement, transient between parser and pipeline.
///
/// Timestamp and weight stay raw strings as emitted by the source; the
/// caller owns coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRecord {
    pub source: String,
    pub destination: String,
    pub timestamp: String,
    pub weight: String,
}

/// Parse output: records keyed by masterplan row index, plus the number
/// of rows dropped as unresolvable.
///
/// The key is synthetic; iterating the map replays records in
/// source-row order, which keeps downstream aggregation deterministic.
#[derive(Debug, Default)]
pub struct ParsedRecords {
    pub records: BTreeMap<usize, TransportRecord>,
    pub dropped: usize,
}

struct PegRow {
    source: String,
    destination: String,
    timestamp: String,
}

/// Reads the two tabular sources and joins them on the order id.
pub struct RecordParser {
    masterplan_path: PathBuf,
    peg_path: PathBuf,
}

impl RecordParser {
    #[must_use]
    pub fn new(masterplan_path: impl Into<PathBuf>, peg_path: impl Into<PathBuf>) -> Self {
        Self {
            masterplan_path: masterplan_path.into(),
            peg_path: peg_path.into(),
        }
    }

    /// Parses both sources and returns the joined records.
    ///
    /// Masterplan columns: `order_id, from_ref, to_ref, weight`.
    /// Peg columns: `order_id, from_label, to_label, moved_at`.
    /// Each source starts with one header row. Each masterplan row joins
    /// to at most one peg row; for a repeated peg key the last row wins.
    ///
    /// # Errors
    /// Returns [`FlowError::Io`] if either file cannot be read.
    pub fn parse(&self) -> Result<ParsedRecords> {
        let peg = self.load_peg()?;
        let raw = fs::read_to_string(&self.masterplan_path)
            .map_err(|e| FlowError::io(e, &self.masterplan_path))?;

        let mut out = ParsedRecords::default();
        for (row, line) in data_rows(&raw) {
            match join_row(line, &peg) {
                Some(record) => {
                    out.records.insert(row, record);
                }
                None => {
                    warn!(row, line, "dropping unresolvable masterplan row");
                    out.dropped += 1;
                }
            }
        }

        debug!(
            records = out.records.len(),
            dropped = out.dropped,
            "transport sources parsed"
        );
        Ok(out)
    }

    fn load_peg(&self) -> Result<HashMap<String, PegRow>> {
        let raw =
            fs::read_to_string(&self.peg_path).map_err(|e| FlowError::io(e, &self.peg_path))?;

        let mut peg = HashMap::new();
        for (row, line) in data_rows(&raw) {
            let fields: Vec<&str> = split_fields(line);
            if fields.len() < 4 {
                warn!(row, line, "dropping short peg row");
                continue;
            }
            peg.insert(
                fields[0].to_string(),
                PegRow {
                    source: fields[1].to_string(),
                    destination: fields[2].to_string(),
                    timestamp: fields[3].to_string(),
                },
            );
        }
        Ok(peg)
    }
}

/// Non-empty data lines with their 0-based row index, header skipped.
fn data_rows(raw: &str) -> impl Iterator<Item = (usize, &str)> {
    raw.lines()
        .skip(1)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .enumerate()
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}

fn join_row(line: &str, peg: &HashMap<String, PegRow>) -> Option<TransportRecord> {
    let fields = split_fields(line);
    if fields.len() < 4 {
        return None;
    }
    // Weight must at least look numeric here; it stays a string.
    if fields[3].parse::<u64>().is_err() {
        return None;
    }
    let resolved = peg.get(fields[0])?;
    Some(TransportRecord {
        source: resolved.source.clone(),
        destination: resolved.destination.clone(),
        timestamp: resolved.timestamp.clone(),
        weight: fields[3].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PEG: &str = "\
order_id,from_label,to_label,moved_at
1001,press,weld,2015-05-25 18:00:00.000
1002,weld,paint,2015-05-26 09:30:00.000
1003,paint,paint,2015-05-27 10:00:00.000
";

    const MASTERPLAN: &str = "\
order_id,from_ref,to_ref,weight
1001,P1,W1,5
1002,W1,L1,3
1003,L1,L1,10
";

    fn write_sources(peg: &str, masterplan: &str) -> (TempDir, RecordParser) {
        let temp = TempDir::new().unwrap();
        let peg_path = temp.path().join("peg.csv");
        let mp_path = temp.path().join("masterplan.csv");
        fs::write(&peg_path, peg).unwrap();
        fs::write(&mp_path, masterplan).unwrap();
        let parser = RecordParser::new(&mp_path, &peg_path);
        (temp, parser)
    }

    #[test]
    fn test_joins_in_row_order() {
        let (_temp, parser) = write_sources(PEG, MASTERPLAN);
        let parsed = parser.parse().unwrap();

        assert_eq!(parsed.records.len(), 3);
        assert_eq!(parsed.dropped, 0);

        let first = &parsed.records[&0];
        assert_eq!(first.source, "press");
        assert_eq!(first.destination, "weld");
        assert_eq!(first.timestamp, "2015-05-25 18:00:00.000");
        assert_eq!(first.weight, "5");

        let keys: Vec<usize> = parsed.records.keys().copied().collect();
        assert_eq!(keys, vec![0, 1, 2]);
    }

    #[test]
    fn test_join_miss_is_dropped_and_counted() {
        let masterplan = "\
order_id,from_ref,to_ref,weight
1001,P1,W1,5
9999,P1,W1,4
";
        let (_temp, parser) = write_sources(PEG, masterplan);
        let parsed = parser.parse().unwrap();

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.dropped, 1);
    }

    #[test]
    fn test_non_numeric_weight_is_dropped() {
        let masterplan = "\
order_id,from_ref,to_ref,weight
1001,P1,W1,lots
1002,W1,L1,3
";
        let (_temp, parser) = write_sources(PEG, masterplan);
        let parsed = parser.parse().unwrap();

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.dropped, 1);
        assert_eq!(parsed.records[&1].weight, "3");
    }

    #[test]
    fn test_short_rows_are_dropped() {
        let masterplan = "\
order_id,from_ref,to_ref,weight
1001,P1
1002,W1,L1,3
";
        let (_temp, parser) = write_sources(PEG, masterplan);
        let parsed = parser.parse().unwrap();

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.dropped, 1);
    }

    #[test]
    fn test_repeated_peg_key_last_wins() {
        let peg = "\
order_id,from_label,to_label,moved_at
1001,press,weld,2015-05-25 18:00:00.000
1001,press,paint,2015-05-25 19:00:00.000
";
        let masterplan = "\
order_id,from_ref,to_ref,weight
1001,P1,W1,5
";
        let (_temp, parser) = write_sources(peg, masterplan);
        let parsed = parser.parse().unwrap();

        assert_eq!(parsed.records[&0].destination, "paint");
    }

    #[test]
    fn test_missing_source_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let peg_path = temp.path().join("peg.csv");
        fs::write(&peg_path, PEG).unwrap();

        let parser = RecordParser::new(temp.path().join("absent.csv"), &peg_path);
        let err = parser.parse().unwrap_err();
        assert!(matches!(err, FlowError::Io { .. }));
    }
}

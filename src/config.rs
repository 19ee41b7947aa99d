// src/config.rs
//! Build configuration, loaded once from a JSON file and passed by
//! reference into the pipeline and cache. There is no global state.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{FlowError, Result};
use crate::geometry::Point2D;

/// Configuration driving one build.
///
/// Field names match the configuration file keys exactly.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    /// Where the built artifact is persisted and restored from.
    pub facility_dump_path: PathBuf,
    /// Two `[x, y]` pairs defining the overall canvas extent.
    pub facility_boundaries: [[f64; 2]; 2],
    /// Layout source: the JSON document listing departments.
    pub facility_source_path: PathBuf,
    /// Primary transportation source.
    pub masterplan_csv_path: PathBuf,
    /// Secondary lookup source.
    pub peg_csv_path: PathBuf,
    /// Known-bad area labels; records touching them are skipped entirely.
    pub error_dep_list: HashSet<String>,
}

impl BuildConfig {
    /// Loads the configuration from a JSON file.
    ///
    /// # Errors
    /// Returns [`FlowError::Io`] if the file cannot be read and
    /// [`FlowError::MalformedConfig`] if it does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| FlowError::io(e, path))?;
        serde_json::from_str(&raw).map_err(|e| FlowError::MalformedConfig {
            reason: e.to_string(),
            path: path.to_path_buf(),
        })
    }

    /// The facility extent as points, low then high.
    #[must_use]
    pub fn extent(&self) -> (Point2D, Point2D) {
        let [low, high] = self.facility_boundaries;
        (Point2D::new(low[0], low[1]), Point2D::new(high[0], high[1]))
    }

    #[must_use]
    pub fn is_error_label(&self, label: &str) -> bool {
        self.error_dep_list.contains(label)
    }
}

// src/parse/layout.rs
//! Layout source parsing. Facility geometry is foundational, so this
//! loader has zero tolerance: any malformation aborts the build.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{FlowError, Result};
use crate::facility::Facility;
use crate::geometry::{Area, Point2D};

#[derive(Debug, Deserialize)]
struct LayoutDoc {
    departments: Vec<DepartmentSrc>,
}

#[derive(Debug, Deserialize)]
struct DepartmentSrc {
    label: String,
    points: Vec<[f64; 2]>,
}

/// Parses the layout document and registers every department as an area.
///
/// # Errors
/// Returns [`FlowError::Io`] if the file cannot be read,
/// [`FlowError::MalformedLayout`] for any structural problem (bad JSON,
/// missing keys, fewer than 3 boundary points), and
/// [`FlowError::DuplicateLabel`] if the document repeats a label.
pub fn load_layout(path: &Path, facility: &mut Facility) -> Result<()> {
    let raw = fs::read_to_string(path).map_err(|e| FlowError::io(e, path))?;
    let doc: LayoutDoc = serde_json::from_str(&raw).map_err(|e| FlowError::MalformedLayout {
        reason: e.to_string(),
        path: path.to_path_buf(),
    })?;

    for dep in doc.departments {
        if dep.points.len() < 3 {
            return Err(FlowError::MalformedLayout {
                reason: format!(
                    "department {:?} has {} boundary points, need at least 3",
                    dep.label,
                    dep.points.len()
                ),
                path: path.to_path_buf(),
            });
        }
        let boundary: Vec<Point2D> = dep
            .points
            .iter()
            .map(|[x, y]| Point2D::new(*x, *y))
            .collect();
        facility.add_area(Area::new(dep.label, boundary))?;
    }

    debug!(areas = facility.areas().len(), "layout loaded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point2D;
    use tempfile::TempDir;

    fn empty_facility() -> Facility {
        Facility::new(Point2D::new(0.0, 0.0), Point2D::new(10.0, 10.0))
    }

    fn write_layout(dir: &TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("layout.json");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_loads_departments_in_document_order() {
        let temp = TempDir::new().unwrap();
        let path = write_layout(
            &temp,
            r#"{ "departments": [
                { "label": "press", "points": [[0,0],[1,0],[1,1]] },
                { "label": "weld",  "points": [[2,2],[3,2],[3,3],[2,3]] }
            ] }"#,
        );

        let mut facility = empty_facility();
        load_layout(&path, &mut facility).unwrap();

        let labels: Vec<&str> = facility.areas().iter().map(|a| a.label()).collect();
        assert_eq!(labels, vec!["press", "weld"]);
        assert_eq!(facility.area("weld").unwrap().boundary().len(), 4);
    }

    #[test]
    fn test_missing_departments_key_is_fatal() {
        let temp = TempDir::new().unwrap();
        let path = write_layout(&temp, r#"{ "rooms": [] }"#);

        let err = load_layout(&path, &mut empty_facility()).unwrap_err();
        assert!(matches!(err, FlowError::MalformedLayout { .. }));
    }

    #[test]
    fn test_too_few_points_is_fatal() {
        let temp = TempDir::new().unwrap();
        let path = write_layout(
            &temp,
            r#"{ "departments": [ { "label": "press", "points": [[0,0],[1,0]] } ] }"#,
        );

        let err = load_layout(&path, &mut empty_facility()).unwrap_err();
        assert!(matches!(err, FlowError::MalformedLayout { .. }));
    }

    #[test]
    fn test_duplicate_label_propagates() {
        let temp = TempDir::new().unwrap();
        let path = write_layout(
            &temp,
            r#"{ "departments": [
                { "label": "press", "points": [[0,0],[1,0],[1,1]] },
                { "label": "press", "points": [[0,0],[1,0],[1,1]] }
            ] }"#,
        );

        let err = load_layout(&path, &mut empty_facility()).unwrap_err();
        assert!(matches!(err, FlowError::DuplicateLabel(_)));
    }
}

// src/geometry.rs
//! Value types for facility geometry: 2D points and polygonal areas.

use serde::{Deserialize, Serialize};

/// A point on the facility canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A named polygonal region of the facility.
///
/// The boundary is expected to hold at least 3 vertices of a simple
/// polygon; the layout loader enforces this, the type itself does not.
/// Equality is by label only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    label: String,
    boundary: Vec<Point2D>,
}

impl Area {
    #[must_use]
    pub fn new(label: impl Into<String>, boundary: Vec<Point2D>) -> Self {
        Self {
            label: label.into(),
            boundary,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn boundary(&self) -> &[Point2D] {
        &self.boundary
    }
}

impl PartialEq for Area {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
    }
}

impl Eq for Area {}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_area_equality_is_by_label() {
        let a = Area::new("assembly", triangle());
        let b = Area::new("assembly", Vec::new());
        let c = Area::new("paint", triangle());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_point_roundtrip() {
        let p = Point2D::new(2.5, -7.0);
        let json = serde_json::to_string(&p).unwrap();
        let back: Point2D = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}

//! Screen geometry in window-server coordinates (origin top-left, y grows down).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// True when all four edges are within `tolerance` points of `other`.
    pub fn edges_within(&self, other: &Rect, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.max_x() - other.max_x()).abs() <= tolerance
            && (self.max_y() - other.max_y()).abs() <= tolerance
    }

    /// Sum of the absolute edge offsets between two rects.
    ///
    /// Used to rank candidate owners of a window by how closely their recorded
    /// frame matches the window's live frame.
    pub fn edge_distance(&self, other: &Rect) -> f64 {
        (self.x - other.x).abs()
            + (self.y - other.y).abs()
            + (self.max_x() - other.max_x()).abs()
            + (self.max_y() - other.max_y()).abs()
    }

    pub fn with_origin(mut self, origin: Point) -> Self {
        self.x = origin.x;
        self.y = origin.y;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_within_tolerance() {
        let a = Rect::new(0.0, 30.0, 800.0, 770.0);
        let b = Rect::new(2.0, 31.0, 799.0, 770.0);
        assert!(a.edges_within(&b, 3.0));
        assert!(!a.edges_within(&b, 1.0));
    }

    #[test]
    fn test_edge_distance_is_zero_for_identical_rects() {
        let a = Rect::new(10.0, 20.0, 300.0, 400.0);
        assert_eq!(a.edge_distance(&a), 0.0);
        let moved = a.with_origin(Point::new(15.0, 20.0));
        // Left and right edges both shift by 5
        assert_eq!(a.edge_distance(&moved), 10.0);
    }
}

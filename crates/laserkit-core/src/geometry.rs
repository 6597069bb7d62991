//! Minimal 2D geometry shared by the grouping and tour-building stages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D point in machine coordinates (same units as the toolpath, usually mm).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X-axis position
    pub x: f64,
    /// Y-axis position
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// Squared Euclidean distance between two points.
///
/// Nearest-neighbor selection only ever compares distances, so the square
/// root is skipped throughout.
pub fn distance_sqr(a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_sqr() {
        assert_eq!(distance_sqr(Point::new(0.0, 0.0), Point::new(3.0, 4.0)), 25.0);
        assert_eq!(distance_sqr(Point::new(1.0, 1.0), Point::new(5.0, 5.0)), 32.0);
        assert_eq!(distance_sqr(Point::new(2.0, -3.0), Point::new(2.0, -3.0)), 0.0);
    }
}

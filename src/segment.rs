//! A single contour crossing: an undirected edge tagged with its level.

use crate::point::Point;

/// One line segment produced by the extractor. Stored with a fixed
/// orientation (`p1` -> `p2`) but treated as undirected by the assembler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub p1: Point,
    pub p2: Point,
    pub level: f64,
}

impl Segment {
    pub fn new(p1: Point, p2: Point, level: f64) -> Self {
        Self { p1, p2, level }
    }

    /// Axis-aligned bounding box as (min, max).
    pub fn aabb(&self) -> (Point, Point) {
        (
            Point::new(self.p1.x.min(self.p2.x), self.p1.y.min(self.p2.y)),
            Point::new(self.p1.x.max(self.p2.x), self.p1.y.max(self.p2.y)),
        )
    }
}

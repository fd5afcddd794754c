//! Uniform grid hash: an approximate spatial index for endpoint matching.
//!
//! A segment/point is bucketed by `(floor(x/G), floor(y/G))`. Queries scan
//! the 3x3 neighborhood of buckets around a point, which is why the bucket
//! size `G` must exceed the endpoint-joining tolerance ε (otherwise two
//! points within ε of each other could land more than one bucket apart).
//!
//! The index is a *candidate filter*: `find_neighbors` may return false
//! positives (anything within 3G of the query point) but never a false
//! negative for items genuinely within ε. Callers confirm candidates with
//! an exact distance check.
//!
//! Bucket keys are an integer pair, not a string — this codebase reaches
//! for `rustc-hash`'s `FxHashMap` whenever a hot-path key is a small
//! integer-ish value (originally to avoid SipHash overhead on hashes used
//! during CCH contraction); the same trade-off applies here since buckets
//! are looked up on every segment insertion and every endpoint query.

use crate::point::Point;
use rustc_hash::FxHashMap;

/// Capability set an assembler/builder needs from a spatial index. Kept as
/// a trait (rather than hard-coding `GridHashIndex`) so the assembler can
/// be generic over the index implementation.
pub trait SpatialIndex<T> {
    fn clear(&mut self);
    fn insert_point(&mut self, p: Point, item: T);
    fn insert_segment(&mut self, p1: Point, p2: Point, item: T);
    fn remove_point(&mut self, p: Point, item: T);
    /// Candidates within 3x3 buckets of `p`. May contain false positives;
    /// never a false negative for anything truly within ε of `p` (given
    /// `cell_size > epsilon`).
    fn find_neighbors(&self, p: Point) -> Vec<T>;
}

/// Concrete uniform-grid-hash implementation of [`SpatialIndex`].
pub struct GridHashIndex<T> {
    cell_size: f64,
    buckets: FxHashMap<(i32, i32), Vec<T>>,
}

impl<T> GridHashIndex<T> {
    pub fn new(cell_size: f64) -> Self {
        assert!(cell_size > 0.0, "cell_size must be positive");
        Self {
            cell_size,
            buckets: FxHashMap::default(),
        }
    }

    #[inline]
    fn bucket_of(&self, p: Point) -> (i32, i32) {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
        )
    }

    fn bucket_range(&self, p1: Point, p2: Point) -> ((i32, i32), (i32, i32)) {
        let min = Point::new(p1.x.min(p2.x), p1.y.min(p2.y));
        let max = Point::new(p1.x.max(p2.x), p1.y.max(p2.y));
        (self.bucket_of(min), self.bucket_of(max))
    }
}

impl<T: Copy + PartialEq> SpatialIndex<T> for GridHashIndex<T> {
    fn clear(&mut self) {
        self.buckets.clear();
    }

    fn insert_point(&mut self, p: Point, item: T) {
        let key = self.bucket_of(p);
        self.buckets.entry(key).or_default().push(item);
    }

    fn insert_segment(&mut self, p1: Point, p2: Point, item: T) {
        let ((bx0, by0), (bx1, by1)) = self.bucket_range(p1, p2);
        for by in by0..=by1 {
            for bx in bx0..=bx1 {
                self.buckets.entry((bx, by)).or_default().push(item);
            }
        }
    }

    fn remove_point(&mut self, p: Point, item: T) {
        let key = self.bucket_of(p);
        if let Some(bucket) = self.buckets.get_mut(&key) {
            if let Some(pos) = bucket.iter().position(|&x| x == item) {
                bucket.swap_remove(pos);
            }
        }
    }

    fn find_neighbors(&self, p: Point) -> Vec<T> {
        let (bx, by) = self.bucket_of(p);
        let mut out = Vec::new();
        for dy in -1..=1 {
            for dx in -1..=1 {
                if let Some(bucket) = self.buckets.get(&(bx + dx, by + dy)) {
                    out.extend_from_slice(bucket);
                }
            }
        }
        out
    }
}

/// Exact ε-distance confirmation for a candidate returned by
/// [`SpatialIndex::find_neighbors`].
#[inline]
pub fn is_near_point(a: Point, b: Point, epsilon: f64) -> bool {
    a.is_near(&b, epsilon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_point_in_same_bucket() {
        let mut idx: GridHashIndex<u32> = GridHashIndex::new(10.0);
        idx.insert_point(Point::new(1.0, 1.0), 42);
        let found = idx.find_neighbors(Point::new(1.5, 1.5));
        assert_eq!(found, vec![42]);
    }

    #[test]
    fn finds_point_across_bucket_boundary() {
        let mut idx: GridHashIndex<u32> = GridHashIndex::new(10.0);
        // Just inside the neighboring bucket.
        idx.insert_point(Point::new(9.99, 0.0), 7);
        let found = idx.find_neighbors(Point::new(10.01, 0.0));
        assert_eq!(found, vec![7]);
    }

    #[test]
    fn remove_point_drops_exact_match() {
        let mut idx: GridHashIndex<u32> = GridHashIndex::new(10.0);
        idx.insert_point(Point::new(1.0, 1.0), 1);
        idx.insert_point(Point::new(1.0, 1.0), 2);
        idx.remove_point(Point::new(1.0, 1.0), 1);
        let mut found = idx.find_neighbors(Point::new(1.0, 1.0));
        found.sort();
        assert_eq!(found, vec![2]);
    }

    #[test]
    fn insert_segment_spans_multiple_buckets() {
        let mut idx: GridHashIndex<u32> = GridHashIndex::new(10.0);
        idx.insert_segment(Point::new(0.0, 0.0), Point::new(25.0, 0.0), 1);
        assert!(idx.find_neighbors(Point::new(0.0, 0.0)).contains(&1));
        assert!(idx.find_neighbors(Point::new(25.0, 0.0)).contains(&1));
    }

    #[test]
    fn clear_empties_all_buckets() {
        let mut idx: GridHashIndex<u32> = GridHashIndex::new(10.0);
        idx.insert_point(Point::new(0.0, 0.0), 1);
        idx.clear();
        assert!(idx.find_neighbors(Point::new(0.0, 0.0)).is_empty());
    }
}

//! Incremental, tile-by-tile isoline construction with seam stitching.
//!
//! Tiles may arrive in any order and each tile may be delivered more than
//! once; the builder's job is to produce the same final polyline set
//! regardless (spec §4.4's merge-order commutativity and redelivery
//! idempotence invariants). It reuses the endpoint-matching idiom from
//! [`crate::assembler`] but applies it incrementally, one segment at a
//! time, against a running per-level store instead of a one-shot pass
//! over a fixed segment list.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::IsolineConfig;
use crate::error::{Error, Result};
use crate::extractor::compute_segments_with_coords;
use crate::point::Point;
use crate::polyline::Polyline;
use crate::spatial_index::{is_near_point, GridHashIndex, SpatialIndex};
use crate::tile::{TileGrid, TileOffset};

/// Per-level running state: the polylines built so far, plus a spatial
/// index over their *open* endpoints (closed polylines have nothing left
/// to extend, so their endpoints are dropped from the index).
struct LevelStore {
    polylines: Vec<Option<Polyline>>,
    endpoint_index: GridHashIndex<(usize, bool)>,
}

impl LevelStore {
    fn new(cell_size: f64) -> Self {
        Self {
            polylines: Vec::new(),
            endpoint_index: GridHashIndex::new(cell_size),
        }
    }

    fn alloc(&mut self, polyline: Polyline) -> usize {
        let id = self.polylines.len();
        self.polylines.push(Some(polyline));
        id
    }

    fn index_endpoints_if_open(&mut self, id: usize, epsilon: f64) {
        let poly = self.polylines[id].as_ref().unwrap();
        if poly.is_closed(epsilon) {
            return;
        }
        let head = poly.head();
        let tail = poly.tail();
        self.endpoint_index.insert_point(head, (id, true));
        self.endpoint_index.insert_point(tail, (id, false));
    }

    /// Finds the best open-endpoint match for `p`: smallest distance,
    /// ties broken by smallest polyline id (spec's deterministic
    /// tie-break for ambiguous multi-candidate joins, reused from
    /// `assembler::best_candidate`).
    fn best_match(&self, p: Point, epsilon: f64) -> Option<(usize, bool, f64)> {
        let mut best: Option<(usize, bool, f64)> = None;
        for (id, is_head) in self.endpoint_index.find_neighbors(p) {
            let Some(poly) = &self.polylines[id] else {
                continue;
            };
            let endpoint = if is_head { poly.head() } else { poly.tail() };
            if !is_near_point(p, endpoint, epsilon) {
                continue;
            }
            let d = p.distance(&endpoint);
            let better = match &best {
                None => true,
                Some((bid, _, bd)) => d < *bd || (d == *bd && id < *bid),
            };
            if better {
                best = Some((id, is_head, d));
            }
        }
        best
    }

    fn incorporate(&mut self, p1: Point, p2: Point, level: f64, epsilon: f64) {
        let m1 = self.best_match(p1, epsilon);
        let m2 = self.best_match(p2, epsilon);

        match (m1, m2) {
            (None, None) => {
                let id = self.alloc(Polyline::new(vec![p1, p2], level));
                self.index_endpoints_if_open(id, epsilon);
            }
            (Some((id, is_head, _)), None) => self.extend(id, is_head, p2, epsilon),
            (None, Some((id, is_head, _))) => self.extend(id, is_head, p1, epsilon),
            (Some((id_a, head_a, _)), Some((id_b, head_b, _))) => {
                if id_a == id_b {
                    self.close(id_a);
                } else {
                    self.merge(id_a, head_a, id_b, head_b, epsilon);
                }
            }
        }
    }

    /// Extends the polyline matched at `is_head` by appending `new_point`
    /// beyond that end, then checks whether the extension just closed the
    /// ring.
    fn extend(&mut self, id: usize, is_head: bool, new_point: Point, epsilon: f64) {
        let poly = self.polylines[id].as_mut().unwrap();
        let old_endpoint = if is_head { poly.head() } else { poly.tail() };
        self.endpoint_index.remove_point(old_endpoint, (id, is_head));

        if is_head {
            poly.points.insert(0, new_point);
        } else {
            poly.points.push(new_point);
        }

        let poly = self.polylines[id].as_ref().unwrap();
        if poly.points.len() >= 3 && poly.head().is_near(&poly.tail(), epsilon) {
            // This extension closed the ring; the other end is still in
            // the index and must come out too.
            let other_endpoint = if is_head { poly.tail() } else { poly.head() };
            self.endpoint_index.remove_point(other_endpoint, (id, !is_head));
        } else {
            self.endpoint_index.insert_point(new_point, (id, is_head));
        }
    }

    /// Closes a polyline whose two open ends were just bridged by a
    /// segment that matched both of them (the new segment IS the closing
    /// edge). Appends the head's coordinates to the tail to make the ring
    /// explicit, mirroring `assembler::extend_forward`'s close-detection.
    fn close(&mut self, id: usize) {
        let poly = self.polylines[id].as_ref().unwrap();
        let head = poly.head();
        let tail = poly.tail();
        self.endpoint_index.remove_point(head, (id, true));
        self.endpoint_index.remove_point(tail, (id, false));
        let poly = self.polylines[id].as_mut().unwrap();
        poly.points.push(head);
    }

    /// Joins two distinct polylines into one via the new segment, oriented
    /// so the matched ends become interior points.
    fn merge(&mut self, id_a: usize, head_a: bool, id_b: usize, head_b: bool, epsilon: f64) {
        let poly_a = self.polylines[id_a].take().unwrap();
        let poly_b = self.polylines[id_b].take().unwrap();

        let a_matched = if head_a { poly_a.head() } else { poly_a.tail() };
        let b_matched = if head_b { poly_b.head() } else { poly_b.tail() };
        self.endpoint_index.remove_point(a_matched, (id_a, head_a));
        self.endpoint_index.remove_point(b_matched, (id_b, head_b));

        let mut points = poly_a.points;
        if head_a {
            points.reverse();
        }
        let mut b_points = poly_b.points;
        if !head_b {
            b_points.reverse();
        }
        points.extend(b_points);

        let merged = Polyline::new(points, poly_a.level);
        let merged_id = self.alloc(merged);
        self.index_endpoints_if_open(merged_id, epsilon);
    }

    fn current(&self) -> Vec<Polyline> {
        self.polylines.iter().flatten().cloned().collect()
    }
}

/// Stateful builder that incorporates tiles one at a time into a running
/// set of per-level polylines, for the fixed set of `levels` given at
/// construction.
pub struct TiledBuilder {
    config: IsolineConfig,
    levels: Vec<f64>,
    processed: FxHashSet<(usize, usize)>,
    stores: FxHashMap<u64, LevelStore>,
    level_order: Vec<f64>,
}

impl TiledBuilder {
    pub fn new(levels: Vec<f64>, config: IsolineConfig) -> Self {
        Self {
            config,
            levels,
            processed: FxHashSet::default(),
            stores: FxHashMap::default(),
            level_order: Vec::new(),
        }
    }

    /// Incorporates one tile's contour segments into the running store and
    /// returns a snapshot of all polylines built so far.
    ///
    /// Tiles already delivered at `(ty, tx)` are silently skipped (the
    /// snapshot is still returned) so repeated delivery is idempotent.
    /// `tile` must be at most `tile_size + 1` in each dimension (the
    /// seam-overlap contract); a larger tile is a caller bug and returns
    /// [`Error::MalformedTile`].
    pub fn add_tile(&mut self, ty: usize, tx: usize, tile: &TileGrid) -> Result<Vec<Polyline>> {
        let max_dim = self.config.tile_size + 1;
        if tile.rows() > max_dim || tile.cols() > max_dim {
            return Err(Error::MalformedTile {
                ty,
                tx,
                reason: format!(
                    "tile is {}x{}, exceeds tile_size+1 ({max_dim})",
                    tile.rows(),
                    tile.cols()
                ),
            });
        }

        if self.processed.contains(&(ty, tx)) {
            return Ok(self.current_polylines());
        }
        self.processed.insert((ty, tx));

        let offset = TileOffset {
            ty,
            tx,
            tile_size: self.config.tile_size,
        };
        let segments = compute_segments_with_coords(&tile.as_grid(), &self.levels, &offset);

        for seg in &segments {
            let key = seg.level.to_bits();
            if !self.stores.contains_key(&key) {
                self.level_order.push(seg.level);
            }
            let cell_size = self.config.cell_size;
            let store = self
                .stores
                .entry(key)
                .or_insert_with(|| LevelStore::new(cell_size));
            store.incorporate(seg.p1, seg.p2, seg.level, self.config.epsilon);
        }

        Ok(self.current_polylines())
    }

    /// A snapshot of every polyline assembled so far, across all levels.
    pub fn current_polylines(&self) -> Vec<Polyline> {
        let mut out = Vec::new();
        for level in &self.level_order {
            if let Some(store) = self.stores.get(&level.to_bits()) {
                out.extend(store.current());
            }
        }
        out
    }
}

//! CONREC-style marching-squares segment extraction.
//!
//! Each marching-squares cell (the quad over grid points `(i,j)`, `(i+1,j)`,
//! `(i,j+1)`, `(i+1,j+1)`) is split into four triangles around the cell's
//! center-mean value. This is the CONREC trick: a saddle cell (diagonally
//! opposite corners on the same side of the level, adjacent corners split)
//! is ambiguous for a 4-corner marching-squares lookup table, but splitting
//! into 4 triangles around the mean removes the ambiguity entirely, because
//! a 3-vertex triangle can never itself be a saddle.

use crate::error::{Error, Result};
use crate::grid::{CoordMap, Grid, IdentityCoords};
use crate::point::Point;
use crate::segment::Segment;

/// Segments shorter than this (in coordinate units) are crossing-point
/// artifacts, not real contour geometry, and are dropped.
const MIN_SEGMENT_LENGTH: f64 = 1e-12;

/// Extracts all contour segments for `levels` from `grid`, using the
/// default identity lattice coordinate mapping.
///
/// Never fails: an empty or undersized grid, or an empty level list,
/// simply yields no segments (spec's "never an error" contract for the
/// extraction hot path). Use [`compute_segments_checked`] at an ingestion
/// boundary that wants eager validation instead.
pub fn compute_segments(grid: &Grid, levels: &[f64]) -> Vec<Segment> {
    compute_segments_with_coords(grid, levels, &IdentityCoords)
}

/// Like [`compute_segments`], but validates dimensions and the level list
/// up front and returns [`Error::InvalidInput`] instead of silently
/// producing an empty result.
pub fn compute_segments_checked(grid: &Grid, levels: &[f64]) -> Result<Vec<Segment>> {
    if grid.too_small() {
        return Err(Error::InvalidInput {
            reason: format!(
                "grid must be at least 2x2, got {}x{}",
                grid.rows(),
                grid.cols()
            ),
        });
    }
    if levels.is_empty() {
        return Err(Error::InvalidInput {
            reason: "levels must not be empty".to_string(),
        });
    }
    Ok(compute_segments(grid, levels))
}

/// Extracts segments using a caller-supplied per-cell coordinate mapping
/// (e.g. a geographic projection, or a tile-local-to-global translation —
/// see [`crate::tile`]).
pub fn compute_segments_with_coords(
    grid: &Grid,
    levels: &[f64],
    coords: &dyn CoordMap,
) -> Vec<Segment> {
    let mut out = Vec::new();
    if grid.too_small() || levels.is_empty() {
        return out;
    }

    for i in 0..grid.rows() - 1 {
        for j in 0..grid.cols() - 1 {
            // Corner values; any NaN means "no data" and the whole cell is
            // skipped for every level.
            let (Some(a), Some(b), Some(c), Some(d)) = (
                grid.get(i, j),
                grid.get(i + 1, j),
                grid.get(i, j + 1),
                grid.get(i + 1, j + 1),
            ) else {
                continue;
            };
            if a.is_nan() || b.is_nan() || c.is_nan() || d.is_nan() {
                continue;
            }

            let p_tl = coords.coord(i, j);
            let p_bl = coords.coord(i + 1, j);
            let p_tr = coords.coord(i, j + 1);
            let p_br = coords.coord(i + 1, j + 1);
            let center = Point::new(
                (p_tl.x + p_bl.x + p_tr.x + p_br.x) / 4.0,
                (p_tl.y + p_bl.y + p_tr.y + p_br.y) / 4.0,
            );
            let center_val = (a + b + c + d) / 4.0;

            let triangles = [
                ([p_tl, p_tr, center], [a, c, center_val]), // north
                ([p_tr, p_br, center], [c, d, center_val]), // east
                ([p_br, p_bl, center], [d, b, center_val]), // south
                ([p_bl, p_tl, center], [b, a, center_val]), // west
            ];

            for &level in levels {
                for (pts, vals) in &triangles {
                    if let Some((s, e)) = triangle_crossing(pts, vals, level) {
                        if s.distance(&e) > MIN_SEGMENT_LENGTH {
                            out.push(Segment::new(s, e, level));
                        }
                    }
                }
            }
        }
    }

    out
}

/// Classifies one triangle vertex against `level`.
#[inline]
fn sign(value: f64, level: f64) -> i8 {
    if value > level {
        1
    } else if value < level {
        -1
    } else {
        0
    }
}

/// Finds the (0, 1, or 2) crossing points of `level` through a triangle,
/// and returns the segment endpoints when there are exactly 2.
///
/// Degenerate-edge policy (an entire triangle edge sits exactly on the
/// level): the edge's own two endpoints are emitted as the segment,
/// deterministically, rather than re-deriving a crossing point.
fn triangle_crossing(pts: &[Point; 3], vals: &[f64; 3], level: f64) -> Option<(Point, Point)> {
    let s = [
        sign(vals[0], level),
        sign(vals[1], level),
        sign(vals[2], level),
    ];
    let on: Vec<usize> = (0..3).filter(|&k| s[k] == 0).collect();

    match on.len() {
        // Whole triangle sits on the level — ambiguous, no unique
        // contour direction to pick; emit nothing.
        3 => None,
        // Exactly one edge (between the two "on" vertices) lies entirely
        // on the level.
        2 => Some((pts[on[0]], pts[on[1]])),
        // One vertex on the level: only a segment if the opposite edge
        // actually crosses (the other two vertices differ in sign).
        1 => {
            let on_idx = on[0];
            let others: Vec<usize> = (0..3).filter(|&k| k != on_idx).collect();
            let (i, j) = (others[0], others[1]);
            if s[i] != s[j] {
                let t = (level - vals[i]) / (vals[j] - vals[i]);
                let q = pts[i].lerp(&pts[j], t);
                Some((pts[on_idx], q))
            } else {
                None
            }
        }
        // No vertex exactly on the level: the level crosses exactly two
        // of the triangle's three edges, or none.
        0 => {
            let edges = [(0usize, 1usize), (1, 2), (2, 0)];
            let mut crossings = Vec::with_capacity(2);
            for &(i, j) in &edges {
                if s[i] != s[j] {
                    let t = (level - vals[i]) / (vals[j] - vals[i]);
                    crossings.push(pts[i].lerp(&pts[j], t));
                }
            }
            if crossings.len() == 2 {
                Some((crossings[0], crossings[1]))
            } else {
                None
            }
        }
        _ => unreachable!("a triangle has exactly 3 vertices"),
    }
}

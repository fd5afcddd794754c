//! Chains segments sharing endpoints into maximal polylines, per level.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::config::IsolineConfig;
use crate::point::Point;
use crate::polyline::Polyline;
use crate::segment::Segment;
use crate::spatial_index::{is_near_point, GridHashIndex, SpatialIndex};

/// Assembles a stateless, full-grid set of segments into maximal
/// polylines, one spatial index per level (spec: segments are grouped by
/// level implicitly from the `level` field on each segment).
pub fn build_isolines(segments: &[Segment], config: &IsolineConfig) -> Vec<Polyline> {
    let mut order: Vec<f64> = Vec::new();
    let mut groups: FxHashMap<u64, Vec<usize>> = FxHashMap::default();
    for (i, s) in segments.iter().enumerate() {
        let key = s.level.to_bits();
        groups.entry(key).or_insert_with(|| {
            order.push(s.level);
            Vec::new()
        });
        groups.get_mut(&key).unwrap().push(i);
    }

    let mut visited = vec![false; segments.len()];
    let mut out = Vec::new();

    for level in order {
        let group = &groups[&level.to_bits()];

        let mut index: GridHashIndex<usize> = GridHashIndex::new(config.cell_size);
        for &idx in group {
            let s = &segments[idx];
            index.insert_segment(s.p1, s.p2, idx);
        }

        for &start in group {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            let s = &segments[start];
            let mut points: VecDeque<Point> = VecDeque::from([s.p1, s.p2]);
            let mut closed = false;

            extend_forward(
                &mut points,
                &mut visited,
                &index,
                segments,
                level,
                config.epsilon,
                &mut closed,
            );
            if !closed {
                extend_backward(
                    &mut points,
                    &mut visited,
                    &index,
                    segments,
                    level,
                    config.epsilon,
                    &mut closed,
                );
            }

            out.push(Polyline::new(points.into(), level));
        }
    }

    out
}

/// Finds the best unvisited, same-level candidate among `find_neighbors(p)`
/// whose near endpoint lies within `epsilon` of `p`. Ties are broken by
/// smallest original segment index (a proxy for "insertion order").
/// Returns `(segment_index, near_distance, far_endpoint)`.
fn best_candidate(
    p: Point,
    visited: &[bool],
    index: &GridHashIndex<usize>,
    segments: &[Segment],
    level: f64,
    epsilon: f64,
) -> Option<(usize, f64, Point)> {
    let mut best: Option<(usize, f64, Point)> = None;
    for c in index.find_neighbors(p) {
        if visited[c] || segments[c].level != level {
            continue;
        }
        let s = &segments[c];
        let d1 = p.distance(&s.p1);
        let d2 = p.distance(&s.p2);
        let (near, near_d, far) = if d1 <= d2 {
            (s.p1, d1, s.p2)
        } else {
            (s.p2, d2, s.p1)
        };
        if !is_near_point(p, near, epsilon) {
            continue;
        }
        let better = match &best {
            None => true,
            Some((bi, bd, _)) => near_d < *bd || (near_d == *bd && c < *bi),
        };
        if better {
            best = Some((c, near_d, far));
        }
    }
    best
}

#[allow(clippy::too_many_arguments)]
fn extend_forward(
    points: &mut VecDeque<Point>,
    visited: &mut [bool],
    index: &GridHashIndex<usize>,
    segments: &[Segment],
    level: f64,
    epsilon: f64,
    closed: &mut bool,
) {
    loop {
        let tail = *points.back().unwrap();
        let Some((c, _, far)) = best_candidate(tail, visited, index, segments, level, epsilon)
        else {
            break;
        };
        visited[c] = true;
        let head = *points.front().unwrap();
        if points.len() >= 2 && far.is_near(&head, epsilon) {
            points.push_back(head);
            *closed = true;
            break;
        }
        points.push_back(far);
    }
}

#[allow(clippy::too_many_arguments)]
fn extend_backward(
    points: &mut VecDeque<Point>,
    visited: &mut [bool],
    index: &GridHashIndex<usize>,
    segments: &[Segment],
    level: f64,
    epsilon: f64,
    closed: &mut bool,
) {
    loop {
        let head = *points.front().unwrap();
        let Some((c, _, far)) = best_candidate(head, visited, index, segments, level, epsilon)
        else {
            break;
        };
        visited[c] = true;
        let tail = *points.back().unwrap();
        if points.len() >= 2 && far.is_near(&tail, epsilon) {
            points.push_front(tail);
            *closed = true;
            break;
        }
        points.push_front(far);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::compute_segments;
    use crate::grid::Grid;

    #[test]
    fn empty_segments_yield_no_polylines() {
        let config = IsolineConfig::default();
        assert!(build_isolines(&[], &config).is_empty());
    }

    // S1: single cell, one level -> exactly one open polyline, with
    // endpoints at (0.5,0) and (0,0.5) (the north and west triangles'
    // crossings on the cell's outer edges; the chain's middle point is the
    // north/west triangles' shared crossing at the cell center edge).
    #[test]
    fn single_cell_yields_one_open_polyline() {
        let data = [0.0, 1.0, 1.0, 2.0];
        let grid = Grid::new(&data, 2, 2);
        let config = IsolineConfig::default();
        let segs = compute_segments(&grid, &[0.5]);
        let polylines = build_isolines(&segs, &config);
        assert_eq!(polylines.len(), 1);
        assert!(!polylines[0].is_closed(config.epsilon));
        let ends = [polylines[0].head(), polylines[0].tail()];
        assert!(ends.iter().any(|p| p.is_near(&Point::new(0.5, 0.0), config.epsilon)));
        assert!(ends.iter().any(|p| p.is_near(&Point::new(0.0, 0.5), config.epsilon)));
    }

    // S3: closed contour around a circular peak.
    #[test]
    fn circular_peak_yields_one_closed_polyline() {
        let mut data = vec![0.0; 25];
        for i in 0..5i32 {
            for j in 0..5i32 {
                let v = 10.0 - (i - 2).pow(2) as f64 - (j - 2).pow(2) as f64;
                data[(i * 5 + j) as usize] = v;
            }
        }
        let grid = Grid::new(&data, 5, 5);
        let config = IsolineConfig::default();
        let segs = compute_segments(&grid, &[6.0]);
        let polylines = build_isolines(&segs, &config);
        assert_eq!(polylines.len(), 1);
        assert!(polylines[0].is_closed(config.epsilon));
    }

    // S6: empty grid in, empty polylines out.
    #[test]
    fn empty_grid_yields_no_polylines() {
        let data: [f64; 0] = [];
        let grid = Grid::new(&data, 0, 0);
        let config = IsolineConfig::default();
        let segs = compute_segments(&grid, &[1.0]);
        assert!(build_isolines(&segs, &config).is_empty());
    }

    // Property 4: no two distinct polylines at the same level share an
    // endpoint within epsilon.
    #[test]
    fn no_shared_endpoints_across_polylines() {
        let mut data = vec![0.0; 25];
        for i in 0..5i32 {
            for j in 0..5i32 {
                let v = 10.0 - (i - 2).pow(2) as f64 - (j - 2).pow(2) as f64;
                data[(i * 5 + j) as usize] = v;
            }
        }
        let grid = Grid::new(&data, 5, 5);
        let config = IsolineConfig::default();
        let segs = compute_segments(&grid, &[6.0, 8.0]);
        let polylines = build_isolines(&segs, &config);
        for a in 0..polylines.len() {
            for b in (a + 1)..polylines.len() {
                if polylines[a].level != polylines[b].level {
                    continue;
                }
                assert!(!polylines[a].head().is_near(&polylines[b].head(), config.epsilon));
                assert!(!polylines[a].head().is_near(&polylines[b].tail(), config.epsilon));
                assert!(!polylines[a].tail().is_near(&polylines[b].head(), config.epsilon));
                assert!(!polylines[a].tail().is_near(&polylines[b].tail(), config.epsilon));
            }
        }
    }
}

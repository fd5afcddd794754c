//! Tile delivery order must not change the final isoline set.

use approx::assert_abs_diff_eq;
use isocontour::{Grid, IsolineConfig, TileGrid, TiledBuilder};
use itertools::Itertools;

const SIZE: usize = 17; // two 8-cell tiles sharing a one-cell seam.
const TILE_SIZE: usize = 8;

fn full_field() -> Vec<f64> {
    let mut data = vec![0.0; SIZE * SIZE];
    for row in 0..SIZE {
        for col in 0..SIZE {
            let x = (col as f64 - 8.0) / 3.0;
            let y = (row as f64 - 8.0) / 3.0;
            data[row * SIZE + col] = 10.0 * (x * x + y * y).sin();
        }
    }
    data
}

fn sub_tile(full: &[f64], ty: usize, tx: usize) -> TileGrid {
    let mut rows = Vec::with_capacity(TILE_SIZE + 1);
    for r in 0..=TILE_SIZE {
        let row_start = ty * TILE_SIZE + r;
        let mut row = Vec::with_capacity(TILE_SIZE + 1);
        for c in 0..=TILE_SIZE {
            let col = tx * TILE_SIZE + c;
            row.push(full[row_start * SIZE + col]);
        }
        rows.push(row);
    }
    TileGrid::from_rows(rows).expect("rectangular tile")
}

fn polyline_arc_length(points: &[isocontour::Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

/// Summarizes a built polyline set in an order-insensitive way: per level,
/// the polyline count and total arc length across all its polylines.
fn summarize(polylines: &[isocontour::Polyline]) -> Vec<(u64, usize, f64)> {
    use std::collections::BTreeMap;
    let mut by_level: BTreeMap<u64, (usize, f64)> = BTreeMap::new();
    for pl in polylines {
        let entry = by_level.entry(pl.level.to_bits()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += polyline_arc_length(&pl.points);
    }
    by_level
        .into_iter()
        .map(|(level, (count, length))| (level, count, length))
        .collect()
}

#[test]
fn tile_delivery_order_does_not_affect_the_result() {
    let full = full_field();
    let levels = vec![-5.0, 0.0, 5.0];
    let config = IsolineConfig {
        tile_size: TILE_SIZE,
        ..IsolineConfig::default()
    };

    let tile_coords = [(0, 0), (0, 1), (1, 0), (1, 1)];
    let tiles: Vec<TileGrid> = tile_coords
        .iter()
        .map(|&(ty, tx)| sub_tile(&full, ty, tx))
        .collect();

    let mut reference: Option<Vec<(u64, usize, f64)>> = None;

    for perm in (0..tile_coords.len()).permutations(tile_coords.len()) {
        let mut builder = TiledBuilder::new(levels.clone(), config);
        let mut last = Vec::new();
        for &i in &perm {
            let (ty, tx) = tile_coords[i];
            last = builder.add_tile(ty, tx, &tiles[i]).unwrap();
        }
        let summary = summarize(&last);

        match &reference {
            None => reference = Some(summary),
            Some(expected) => {
                assert_eq!(summary.len(), expected.len(), "permutation {perm:?}");
                for ((lvl_a, cnt_a, len_a), (lvl_b, cnt_b, len_b)) in
                    summary.iter().zip(expected.iter())
                {
                    assert_eq!(lvl_a, lvl_b, "permutation {perm:?}");
                    assert_eq!(cnt_a, cnt_b, "permutation {perm:?}");
                    assert_abs_diff_eq!(*len_a, *len_b, epsilon = 1e-6);
                }
            }
        }
    }
}

#[test]
fn redelivering_the_same_tile_twice_matches_delivering_it_once() {
    let full = full_field();
    let levels = vec![0.0];
    let config = IsolineConfig {
        tile_size: TILE_SIZE,
        ..IsolineConfig::default()
    };

    let tile = sub_tile(&full, 0, 0);

    let mut once = TiledBuilder::new(levels.clone(), config);
    let result_once = once.add_tile(0, 0, &tile).unwrap();

    let mut twice = TiledBuilder::new(levels, config);
    twice.add_tile(0, 0, &tile).unwrap();
    let result_twice = twice.add_tile(0, 0, &tile).unwrap();

    assert_eq!(summarize(&result_once), summarize(&result_twice));
}

#[test]
fn full_grid_closed_contour_is_detected_through_tiling() {
    // A radially symmetric bump sampled on a grid split into four tiles;
    // the level-6 contour should close into one ring regardless of tiling.
    let n = 9;
    let mut data = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            let v = 10.0 - (i as f64 - 4.0).powi(2) - (j as f64 - 4.0).powi(2);
            data[i * n + j] = v;
        }
    }
    let grid = Grid::new(&data, n, n);
    let config = IsolineConfig::default();
    let segs = isocontour::compute_segments(&grid, &[6.0]);
    let stateless = isocontour::build_isolines(&segs, &config);
    assert_eq!(stateless.len(), 1);
    assert!(stateless[0].is_closed(config.epsilon));
}

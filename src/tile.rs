//! Tile-local grid data and the tile-to-global coordinate translation.

use crate::grid::CoordMap;
use crate::point::Point;

/// A `tileSize × tileSize` (or smaller, at the grid's right/bottom edge)
/// sub-array of the logical grid, in row-major order.
///
/// Per the seam invariant, tile `(ty, tx)` is expected to cover grid rows
/// `[ty*S .. ty*S + S]` inclusive and columns `[tx*S .. tx*S + S]`
/// inclusive — i.e. callers include a one-cell overlap with their
/// neighbors so every marching-squares cell straddling a tile boundary is
/// contained entirely within exactly one tile.
#[derive(Debug, Clone)]
pub struct TileGrid {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl TileGrid {
    /// Builds a tile from already-flattened row-major data.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { data, rows, cols }
    }

    /// Builds a tile from row-major `Vec<Vec<f64>>`, validating that every
    /// row has the same length. Returns `Err(reason)` describing the first
    /// ragged row found; the caller (`TiledBuilder::add_tile`) wraps that
    /// into `Error::MalformedTile` with the tile coordinates attached.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, String> {
        if rows.is_empty() {
            return Ok(Self {
                data: Vec::new(),
                rows: 0,
                cols: 0,
            });
        }
        let cols = rows[0].len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(format!(
                    "row {i} has length {} but row 0 has length {cols}",
                    row.len()
                ));
            }
        }
        let n_rows = rows.len();
        let data: Vec<f64> = rows.into_iter().flatten().collect();
        Ok(Self {
            data,
            rows: n_rows,
            cols,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn as_grid(&self) -> crate::grid::Grid<'_> {
        crate::grid::Grid::new(&self.data, self.rows, self.cols)
    }
}

/// Translates tile-local lattice coordinates `(row, col)` into global grid
/// coordinates, by offsetting with `(tx * tile_size, ty * tile_size)`
/// (spec §4.4 step 2).
pub struct TileOffset {
    pub ty: usize,
    pub tx: usize,
    pub tile_size: usize,
}

impl CoordMap for TileOffset {
    fn coord(&self, row: usize, col: usize) -> Point {
        Point::new(
            (self.tx * self.tile_size + col) as f64,
            (self.ty * self.tile_size + row) as f64,
        )
    }
}

//! Random-access, bounds-checked read of a row-major 2-D scalar field.

use crate::error::{Error, Result};
use crate::point::Point;

/// Maps a grid lattice position to a coordinate. Default is the identity
/// lattice (`x = col`, `y = row`); callers of
/// [`crate::extractor::compute_segments_with_coords`] may substitute a
/// geographic projection or a tile-local-to-global translation (see
/// [`crate::tile::TileOffset`]).
pub trait CoordMap {
    fn coord(&self, row: usize, col: usize) -> Point;
}

/// The default lattice mapping: `x = col as f64`, `y = row as f64`.
pub struct IdentityCoords;

impl CoordMap for IdentityCoords {
    fn coord(&self, row: usize, col: usize) -> Point {
        Point::new(col as f64, row as f64)
    }
}

/// A read-only view over a row-major `H × W` scalar field.
///
/// `NaN` marks "no data"; callers never see an `Err` for a NaN read, only
/// the value itself — the extractor is the one place that turns a NaN into
/// "skip this cell."
#[derive(Debug, Clone, Copy)]
pub struct Grid<'a> {
    data: &'a [f64],
    rows: usize,
    cols: usize,
}

impl<'a> Grid<'a> {
    /// Builds a grid view without validating dimensions — matches
    /// spec's "empty/undersized grid -> empty output, never an error"
    /// contract for the hot extraction path.
    pub fn new(data: &'a [f64], rows: usize, cols: usize) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { data, rows, cols }
    }

    /// Builds a grid view, rejecting dimensions too small to contain a
    /// single marching-squares cell. Use at an ingestion boundary where an
    /// explicit error is preferable to a silently empty result.
    pub fn new_checked(data: &'a [f64], rows: usize, cols: usize) -> Result<Self> {
        if rows < 2 || cols < 2 {
            return Err(Error::InvalidInput {
                reason: format!("grid must be at least 2x2, got {rows}x{cols}"),
            });
        }
        if data.len() != rows * cols {
            return Err(Error::InvalidInput {
                reason: format!(
                    "grid data length {} does not match {rows}x{cols}",
                    data.len()
                ),
            });
        }
        Ok(Self { data, rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Bounds-checked read. Returns `None` for out-of-range coordinates,
    /// `Some(NaN)` for "no data" cells.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.data[row * self.cols + col])
    }

    /// True if `self` has fewer than two rows or columns — the case in
    /// which every extraction produces no segments.
    pub fn too_small(&self) -> bool {
        self.rows < 2 || self.cols < 2
    }
}

//! Incremental isoline (contour polyline) extraction from scalar grids.
//!
//! Pipeline: a [`grid::Grid`] of samples goes through
//! [`extractor::compute_segments`] (CONREC-style marching squares, one
//! level at a time) to produce unordered [`segment::Segment`]s, which
//! [`assembler::build_isolines`] chains into [`polyline::Polyline`]s by
//! endpoint proximity. [`builder::TiledBuilder`] does the same chaining
//! incrementally, tile by tile, for callers streaming a grid too large to
//! hold (and extract) all at once. [`geojson::to_geojson`] is a thin
//! boundary adapter for exporting the result.

pub mod assembler;
pub mod builder;
pub mod config;
pub mod error;
pub mod extractor;
pub mod geojson;
pub mod grid;
pub mod point;
pub mod polyline;
pub mod segment;
pub mod spatial_index;
pub mod tile;

pub use assembler::build_isolines;
pub use builder::TiledBuilder;
pub use config::IsolineConfig;
pub use error::{Error, Result};
pub use extractor::{compute_segments, compute_segments_checked, compute_segments_with_coords};
pub use geojson::to_geojson;
pub use grid::{CoordMap, Grid, IdentityCoords};
pub use point::Point;
pub use polyline::Polyline;
pub use segment::Segment;
pub use spatial_index::{GridHashIndex, SpatialIndex};
pub use tile::{TileGrid, TileOffset};

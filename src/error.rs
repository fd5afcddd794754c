//! Error types for the isocontour crate.
//!
//! Typed errors throughout: this crate has no CLI/HTTP boundary of its own,
//! so there's no layer where `anyhow`-style context chains would earn their
//! keep over a plain enum.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("malformed tile ({ty}, {tx}): {reason}")]
    MalformedTile {
        ty: usize,
        tx: usize,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

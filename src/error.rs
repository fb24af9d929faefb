//! Error taxonomy of the charge density pipeline.

use std::io;
use thiserror::Error;

/// Errors raised while reading, combining or projecting volumetric data.
#[derive(Debug, Error)]
pub enum ChgError {
    /// Malformed or truncated input: wrong token counts, non-numeric tokens, missing lines.
    #[error("Invalid volumetric data format: {msg}")]
    Format { msg: String },

    /// Two grids that should be combined have different dimensions.
    #[error("Grid not matching: {lhs:?} vs {rhs:?}")]
    ShapeMismatch { lhs: [usize; 3], rhs: [usize; 3] },

    /// Degenerate cell, the volume must be strictly positive.
    #[error("Non-positive cell volume: {volume}")]
    Geometry { volume: f64 },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ChgError {
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format { msg: msg.into() }
    }
}

pub type ChgResult<T> = std::result::Result<T, ChgError>;

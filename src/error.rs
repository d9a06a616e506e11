// SPDX-License-Identifier: AGPL-3.0-or-later

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the phase-retrieval kernels.
///
/// Configuration and input errors (`ShapeMismatch`, `Unsupported*`, `Config`)
/// indicate a caller defect and are raised before or at the start of a run.
/// `PowerInvariant` is different: it fires after the loop and signals a
/// numerical or algorithmic regression rather than bad input.
#[derive(Debug, Error)]
pub enum Error {
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("{field} power is {power:.6}, expected {expected:.6} within {tolerance:e}")]
    PowerInvariant {
        field: &'static str,
        power: f64,
        expected: f64,
        tolerance: f64,
    },

    #[error("unsupported quantization: {0}")]
    UnsupportedQuantization(String),

    #[error("unsupported error metric: {0}")]
    UnsupportedMetric(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("field has zero total power")]
    EmptyField,

    #[cfg(feature = "image")]
    #[error("image decode: {0}")]
    Image(String),
}

pub(crate) fn config(m: &str) -> Error {
    Error::Config(m.to_string())
}

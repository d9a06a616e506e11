// SPDX-License-Identifier: AGPL-3.0-or-later

//! Fourier-holography phase retrieval.
//!
//! Computes a phase-only hologram that, optically Fourier-transformed,
//! reproduces a target intensity image. The crate implements the classic
//! Gerchberg-Saxton domain-alternation loop plus the Wyrowski-Bryngdahl
//! band-limited / power-smoothed variant: fields alternate between the
//! replay (image) domain and the hologram (Fourier) domain, each domain
//! enforces its own constraint, and a per-iteration error trace records
//! convergence.
//!
//! The utilities are deliberately lightweight: plain `ndarray` fields of
//! `Complex64`, a planner-backed centered FFT, and a resumable [`Solver`]
//! stepper that callers can drive manually or run for a fixed count.
//!
//! ```no_run
//! use cgh::{ErrorMetric, Quantization, RunConfig, Solver, Target};
//! use ndarray::Array2;
//!
//! # fn main() -> cgh::Result<()> {
//! let pixels: Array2<f64> = Array2::ones((64, 64));
//! let target = Target::from_grayscale(&pixels, Quantization::Levels(256))?;
//! let report = Solver::new(
//!     &target,
//!     RunConfig {
//!         iterations: 100,
//!         quantization: Quantization::Levels(256),
//!         metric: ErrorMetric::Psnr,
//!         ..RunConfig::default()
//!     },
//! )?
//! .run()?;
//! let phase_to_display = report.hologram_phase();
//! # let _ = phase_to_display;
//! # Ok(())
//! # }
//! ```

pub mod constraint;
pub mod error;
pub mod fft2;
pub mod field;
#[cfg(feature = "image")]
pub mod image_io;
pub mod metrics;
pub mod solver;
pub mod target;
pub mod trace;

pub use constraint::{HologramConstraint, Quantization};
pub use error::{Error, Result};
pub use fft2::CenteredFft;
pub use field::{normalize_power, total_power, ComplexField};
pub use metrics::ErrorMetric;
pub use solver::{RunConfig, RunReport, Solver};
pub use target::Target;
pub use trace::{ErrorTrace, TraceSample};

// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error metrics comparing the replay field against the target.
//!
//! All three metrics are phase-insensitive: MSE and PSNR compare amplitude
//! maps, SSIM compares intensity (squared-amplitude) maps. Each one rejects
//! mismatched shapes before touching any data.

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;

use crate::error::{Error, Result};
use crate::field::ComplexField;

/// Scalar discrepancy measure sampled once per iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorMetric {
    Mse,
    Psnr,
    Ssim,
}

impl ErrorMetric {
    /// Column label used in trace output.
    pub fn name(self) -> &'static str {
        match self {
            ErrorMetric::Mse => "MSE",
            ErrorMetric::Psnr => "PSNR",
            ErrorMetric::Ssim => "SSIM",
        }
    }

    pub fn evaluate(self, target: &ComplexField, replay: &ComplexField) -> Result<f64> {
        match self {
            ErrorMetric::Mse => mse(target, replay),
            ErrorMetric::Psnr => psnr(target, replay),
            ErrorMetric::Ssim => ssim(target, replay),
        }
    }
}

impl FromStr for ErrorMetric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MSE" => Ok(ErrorMetric::Mse),
            "PSNR" => Ok(ErrorMetric::Psnr),
            "SSIM" => Ok(ErrorMetric::Ssim),
            other => Err(Error::UnsupportedMetric(other.to_string())),
        }
    }
}

impl fmt::Display for ErrorMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn check_shapes(x: &ComplexField, y: &ComplexField) -> Result<()> {
    if x.dim() != y.dim() {
        return Err(Error::ShapeMismatch {
            expected: x.dim(),
            got: y.dim(),
        });
    }
    Ok(())
}

/// Phase-insensitive mean squared error: `mean((|x| - |y|)^2)`.
pub fn mse(x: &ComplexField, y: &ComplexField) -> Result<f64> {
    check_shapes(x, y)?;
    let (height, width) = x.dim();
    let sum: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(a, b)| {
            let d = a.norm() - b.norm();
            d * d
        })
        .sum();
    Ok(sum / (height * width) as f64)
}

/// Peak signal-to-noise ratio over amplitude maps:
/// `20 log10(max(|x|, |y|)) - 10 log10(MSE)`.
///
/// Returns `f64::INFINITY` when the MSE is exactly zero.
pub fn psnr(x: &ComplexField, y: &ComplexField) -> Result<f64> {
    let err = mse(x, y)?;
    if err == 0.0 {
        return Ok(f64::INFINITY);
    }
    let peak = x
        .iter()
        .chain(y.iter())
        .map(|v| v.norm())
        .fold(0.0_f64, f64::max);
    Ok(20.0 * peak.log10() - 10.0 * err.log10())
}

/// Mean structural similarity between the intensity maps `|x|^2` and `|y|^2`.
///
/// Gaussian-weighted sliding window (11x11, sigma 1.5, shrunk to fit small
/// fields), K1 = 0.01, K2 = 0.03, dynamic range taken from the observed
/// intensity extrema across both maps. Windows are evaluated only where they
/// fit entirely inside the field.
pub fn ssim(x: &ComplexField, y: &ComplexField) -> Result<f64> {
    check_shapes(x, y)?;
    let ix = x.mapv(|v| v.norm_sqr());
    let iy = y.mapv(|v| v.norm_sqr());

    let (height, width) = ix.dim();
    let mut win = 11usize.min(height).min(width);
    if win % 2 == 0 {
        win -= 1;
    }
    let kernel = gaussian_kernel(win, 1.5);

    let lo = ix.iter().chain(iy.iter()).fold(f64::INFINITY, |m, &v| m.min(v));
    let hi = ix
        .iter()
        .chain(iy.iter())
        .fold(f64::NEG_INFINITY, |m, &v| m.max(v));
    let range = (hi - lo).max(f64::EPSILON);
    let c1 = (0.01 * range).powi(2);
    let c2 = (0.03 * range).powi(2);

    let mut sum = 0.0;
    let mut count = 0usize;
    for r in 0..=(height - win) {
        for c in 0..=(width - win) {
            let (mx, my, vx, vy, cov) = window_stats(&ix, &iy, &kernel, r, c, win);
            let num = (2.0 * mx * my + c1) * (2.0 * cov + c2);
            let den = (mx * mx + my * my + c1) * (vx + vy + c2);
            sum += num / den;
            count += 1;
        }
    }
    Ok(sum / count as f64)
}

fn gaussian_kernel(win: usize, sigma: f64) -> Array2<f64> {
    let half = (win / 2) as isize;
    let mut kernel = Array2::from_shape_fn((win, win), |(r, c)| {
        let dr = r as isize - half;
        let dc = c as isize - half;
        (-((dr * dr + dc * dc) as f64) / (2.0 * sigma * sigma)).exp()
    });
    let total: f64 = kernel.iter().sum();
    kernel.mapv_inplace(|v| v / total);
    kernel
}

fn window_stats(
    ix: &Array2<f64>,
    iy: &Array2<f64>,
    kernel: &Array2<f64>,
    r0: usize,
    c0: usize,
    win: usize,
) -> (f64, f64, f64, f64, f64) {
    let mut mx = 0.0;
    let mut my = 0.0;
    for r in 0..win {
        for c in 0..win {
            let w = kernel[[r, c]];
            mx += w * ix[[r0 + r, c0 + c]];
            my += w * iy[[r0 + r, c0 + c]];
        }
    }
    let mut vx = 0.0;
    let mut vy = 0.0;
    let mut cov = 0.0;
    for r in 0..win {
        for c in 0..win {
            let w = kernel[[r, c]];
            let dx = ix[[r0 + r, c0 + c]] - mx;
            let dy = iy[[r0 + r, c0 + c]] - my;
            vx += w * dx * dx;
            vy += w * dy * dy;
            cov += w * dx * dy;
        }
    }
    (mx, my, vx, vy, cov)
}

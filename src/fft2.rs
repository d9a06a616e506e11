// SPDX-License-Identifier: AGPL-3.0-or-later

//! Centered 2-D Fourier transforms over [`ComplexField`]s.
//!
//! The solver works with optically-centered spectra: every transform is
//! wrapped in an fftshift on both sides so the DC term sits at the middle of
//! the array, and both directions carry the orthonormal `1/sqrt(h*w)` scale.
//! That scaling is what makes the power invariant hold across domains: an
//! orthonormal transform preserves total power exactly, so a unit-amplitude
//! hologram and its replay field both sum to `h*w`.

use std::sync::Arc;

use ndarray::Array2;
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

use crate::field::ComplexField;

/// Planner-backed centered transform for one fixed field shape.
///
/// Plans are built once per shape and reused every iteration; `rustfft`
/// supports arbitrary lengths, so fields are not restricted to powers of two.
pub struct CenteredFft {
    height: usize,
    width: usize,
    row_forward: Arc<dyn Fft<f64>>,
    row_inverse: Arc<dyn Fft<f64>>,
    col_forward: Arc<dyn Fft<f64>>,
    col_inverse: Arc<dyn Fft<f64>>,
}

impl CenteredFft {
    pub fn new(height: usize, width: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        Self {
            height,
            width,
            row_forward: planner.plan_fft_forward(width),
            row_inverse: planner.plan_fft_inverse(width),
            col_forward: planner.plan_fft_forward(height),
            col_inverse: planner.plan_fft_inverse(height),
        }
    }

    /// Hologram domain -> replay domain: `fftshift(fft2(fftshift(x))) / sqrt(h*w)`.
    pub fn forward(&self, field: &ComplexField) -> ComplexField {
        self.transform(field, false)
    }

    /// Replay domain -> hologram domain: `fftshift(ifft2(fftshift(x))) * sqrt(h*w)`,
    /// which with the unnormalized inverse kernel is again a `1/sqrt(h*w)` scale.
    pub fn inverse(&self, field: &ComplexField) -> ComplexField {
        self.transform(field, true)
    }

    fn transform(&self, field: &ComplexField, inverse: bool) -> ComplexField {
        assert_eq!(field.dim(), (self.height, self.width));
        let mut data = fftshift(field);

        let row_fft = if inverse {
            &self.row_inverse
        } else {
            &self.row_forward
        };
        let col_fft = if inverse {
            &self.col_inverse
        } else {
            &self.col_forward
        };

        let mut buf: Vec<Complex64> = Vec::with_capacity(self.width.max(self.height));
        for r in 0..self.height {
            buf.clear();
            buf.extend((0..self.width).map(|c| data[[r, c]]));
            row_fft.process(&mut buf);
            for c in 0..self.width {
                data[[r, c]] = buf[c];
            }
        }
        for c in 0..self.width {
            buf.clear();
            buf.extend((0..self.height).map(|r| data[[r, c]]));
            col_fft.process(&mut buf);
            for r in 0..self.height {
                data[[r, c]] = buf[r];
            }
        }

        let scale = 1.0 / ((self.height * self.width) as f64).sqrt();
        let mut out = fftshift(&data);
        out.mapv_inplace(|v| v * scale);
        out
    }
}

/// Rolls both axes by half their length, moving the DC bin to the center.
pub fn fftshift(field: &ComplexField) -> ComplexField {
    let (height, width) = field.dim();
    let mut out = Array2::zeros((height, width));
    for r in 0..height {
        for c in 0..width {
            out[[(r + height / 2) % height, (c + width / 2) % width]] = field[[r, c]];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::total_power;
    use approx::assert_relative_eq;

    fn impulse(h: usize, w: usize) -> ComplexField {
        let mut f = ComplexField::zeros((h, w));
        f[[0, 0]] = Complex64::new(1.0, 0.0);
        f
    }

    #[test]
    fn forward_then_inverse_is_identity() {
        let mut field = ComplexField::zeros((8, 8));
        for (i, v) in field.iter_mut().enumerate() {
            *v = Complex64::new((i as f64 * 0.37).sin(), (i as f64 * 0.11).cos());
        }
        let fft = CenteredFft::new(8, 8);
        let round = fft.inverse(&fft.forward(&field));
        for (a, b) in field.iter().zip(round.iter()) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-12);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn orthonormal_scaling_preserves_power() {
        let field = impulse(16, 8);
        let fft = CenteredFft::new(16, 8);
        let spectrum = fft.forward(&field);
        assert_relative_eq!(
            total_power(&spectrum),
            total_power(&field),
            epsilon = 1e-12
        );
    }

    #[test]
    fn fftshift_moves_dc_to_center() {
        let field = impulse(4, 6);
        let shifted = fftshift(&field);
        assert_eq!(shifted[[2, 3]], Complex64::new(1.0, 0.0));
        assert_eq!(shifted[[0, 0]], Complex64::new(0.0, 0.0));
    }

    #[test]
    fn works_for_non_power_of_two_shapes() {
        let field = impulse(6, 10);
        let fft = CenteredFft::new(6, 10);
        let round = fft.inverse(&fft.forward(&field));
        assert_relative_eq!(round[[0, 0]].re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(total_power(&round), 1.0, epsilon = 1e-12);
    }
}

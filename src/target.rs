// SPDX-License-Identifier: AGPL-3.0-or-later

//! Target construction: grayscale pixels in, normalized target field out.

use ndarray::Array2;

use crate::constraint::Quantization;
use crate::error::Result;
use crate::field::{self, ComplexField};

/// The image the hologram should reproduce.
///
/// Built once per run and never mutated: a zero-phase complex field whose
/// total power equals its pixel count. For binary devices the amplitude is
/// additionally made conjugate-symmetric, since a binary-phase hologram can
/// only produce a symmetric real-valued reconstruction.
#[derive(Debug, Clone)]
pub struct Target {
    field: ComplexField,
}

impl Target {
    /// Builds a target from a grayscale pixel matrix.
    ///
    /// Imposes conjugate symmetry first when `quantization` implies a binary
    /// device, then normalizes total power to `height * width`.
    pub fn from_grayscale(pixels: &Array2<f64>, quantization: Quantization) -> Result<Self> {
        let mut pixels = pixels.clone();
        if quantization.requires_conjugate_symmetry() {
            field::impose_conjugate_symmetry(&mut pixels)?;
        }
        let normalized = field::normalize_power(&field::from_amplitude(&pixels))?;
        Ok(Self { field: normalized })
    }

    /// Builds a target from an already power-normalized complex field.
    /// Intended for tests and synthetic targets; normalization is re-applied
    /// so the invariant holds regardless of input scaling.
    pub fn from_field(field: &ComplexField) -> Result<Self> {
        Ok(Self {
            field: field::normalize_power(field)?,
        })
    }

    pub fn field(&self) -> &ComplexField {
        &self.field
    }

    pub fn dim(&self) -> (usize, usize) {
        self.field.dim()
    }

    /// Amplitude map, for display collaborators.
    pub fn amplitude(&self) -> Array2<f64> {
        self.field.mapv(|v| v.norm())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::total_power;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    #[test]
    fn target_is_power_normalized() {
        let pixels = Array2::from_shape_fn((8, 8), |(r, c)| (r * 8 + c) as f64 + 1.0);
        let target = Target::from_grayscale(&pixels, Quantization::Levels(256)).unwrap();
        assert_relative_eq!(total_power(target.field()), 64.0, epsilon = 1e-9);
    }

    #[test]
    fn binary_device_gets_symmetric_target() {
        let pixels = Array2::from_shape_fn((8, 8), |(r, c)| (r * 8 + c) as f64 + 1.0);
        let target = Target::from_grayscale(&pixels, Quantization::Binary).unwrap();
        let amp = target.amplitude();
        // Rows [4, 7) mirror flipped rows [0, 3).
        for r in 0..3 {
            for c in 0..8 {
                assert_relative_eq!(amp[[4 + r, c]], amp[[2 - r, 7 - c]], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn continuous_device_keeps_pixels_asymmetric() {
        let pixels = Array2::from_shape_fn((8, 8), |(r, c)| (r * 8 + c) as f64 + 1.0);
        let target = Target::from_grayscale(&pixels, Quantization::Continuous).unwrap();
        let amp = target.amplitude();
        assert!((amp[[4, 0]] - amp[[2, 7]]).abs() > 1e-9);
    }

    #[test]
    fn zero_image_is_rejected() {
        let pixels = Array2::zeros((4, 4));
        assert!(Target::from_grayscale(&pixels, Quantization::Continuous).is_err());
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later

//! Hologram-domain constraints: phase quantization, spectral band-limiting
//! and power smoothing.
//!
//! The constraint is what turns a raw inverse-transformed field into
//! something a spatial light modulator can actually display. Plain
//! Gerchberg-Saxton keeps only the phase; the Wyrowski-Bryngdahl flags relax
//! that by preserving sub-unit amplitudes (power smoothing) and by masking
//! the spectrum to the modulator's usable bandwidth (band-limiting).

use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;

use crate::error::{Error, Result};
use crate::field::ComplexField;

/// Number of discrete phase states the rendering device supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Quantization {
    /// Full continuous phase; amplitude forced to unity.
    Continuous,
    /// Two phase states. Implies a conjugate-symmetric target.
    Binary,
    /// `n` evenly spaced phase states, `n >= 2`.
    Levels(u32),
}

impl Quantization {
    /// Discrete level count, or `None` for a continuous device.
    pub fn levels(self) -> Option<u32> {
        match self {
            Quantization::Continuous => None,
            Quantization::Binary => Some(2),
            Quantization::Levels(n) => Some(n),
        }
    }

    /// Whether the target must be made conjugate-symmetric before the run.
    pub fn requires_conjugate_symmetry(self) -> bool {
        matches!(self.levels(), Some(2))
    }

    pub fn validate(self) -> Result<()> {
        match self {
            Quantization::Levels(n) if n < 2 => Err(Error::UnsupportedQuantization(format!(
                "{n} levels (need at least 2, or Continuous)"
            ))),
            _ => Ok(()),
        }
    }

    /// Resolves the reference scripts' integer encoding: `0` meant
    /// continuous, any other count a discrete device.
    pub fn from_level_count(n: u32) -> Result<Self> {
        let q = match n {
            0 => Quantization::Continuous,
            2 => Quantization::Binary,
            n => Quantization::Levels(n),
        };
        q.validate()?;
        Ok(q)
    }
}

impl FromStr for Quantization {
    type Err = Error;

    /// Accepts the legacy textual aliases alongside bare level counts.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Continuous" => Ok(Quantization::Continuous),
            "Binary" => Ok(Quantization::Binary),
            "Multi-Level" => Ok(Quantization::Levels(256)),
            other => other
                .parse::<u32>()
                .map_err(|_| Error::UnsupportedQuantization(other.to_string()))
                .and_then(Quantization::from_level_count),
        }
    }
}

impl fmt::Display for Quantization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantization::Continuous => f.write_str("Continuous"),
            Quantization::Binary => f.write_str("Binary"),
            Quantization::Levels(n) => write!(f, "{n}-Level"),
        }
    }
}

/// Constraint applied to the raw hologram every iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HologramConstraint {
    pub quantization: Quantization,
    /// Zero everything outside the central quarter-area spectral rectangle.
    pub band_limit: bool,
    /// Keep sub-unit amplitudes instead of forcing every pixel to unity.
    pub power_smooth: bool,
}

impl HologramConstraint {
    /// Plain Gerchberg-Saxton: no band-limit, no power smoothing.
    pub fn gerchberg_saxton(quantization: Quantization) -> Self {
        Self {
            quantization,
            band_limit: false,
            power_smooth: false,
        }
    }

    /// Whether either Wyrowski-Bryngdahl relaxation is active.
    pub fn is_wyrowski_bryngdahl(&self) -> bool {
        self.band_limit || self.power_smooth
    }

    /// Applies the constraint pipeline: power smoothing (or unit-amplitude
    /// projection), band-limit mask, then phase quantization.
    pub fn apply(&self, raw: &ComplexField) -> ComplexField {
        let mut holo = raw.clone();

        if self.power_smooth {
            // Clip over-unity amplitudes only; dimmer pixels keep theirs.
            holo.mapv_inplace(|v| {
                if v.norm() > 1.0 {
                    Complex64::from_polar(1.0, v.arg())
                } else {
                    v
                }
            });
        } else {
            holo.mapv_inplace(|v| Complex64::from_polar(1.0, v.arg()));
        }

        if self.band_limit {
            apply_band_limit(&mut holo);
        }

        if let Some(n) = self.quantization.levels() {
            holo.mapv_inplace(|v| {
                Complex64::from_polar(v.norm(), quantize_phase(v.arg(), n))
            });
        }

        holo
    }
}

/// Snaps `angle` (radians, `[-pi, pi]`) to one of `n` evenly spaced levels.
///
/// The level index that rounds up to `n` wraps to level 0, so the output set
/// is exactly `{k * 2pi/n : 0 <= k < n}`, equal mod 2pi to the reference
/// value set.
pub fn quantize_phase(angle: f64, n: u32) -> f64 {
    let level = ((angle + PI) / TAU * f64::from(n)).round() as u32 % n;
    f64::from(level) * TAU / f64::from(n)
}

/// Zeroes every pixel outside the retained rectangle
/// `[h/4, 3h/4 - 1) x [w/4, 3w/4 - 1)`.
///
/// Both upper bounds stop one short of the symmetric point; the asymmetry is
/// intentional and matches the reference numerics.
fn apply_band_limit(holo: &mut ComplexField) {
    let (height, width) = holo.dim();
    let (r0, r1) = (height / 4, (height * 3 / 4).saturating_sub(1));
    let (c0, c1) = (width / 4, (width * 3 / 4).saturating_sub(1));
    for ((r, c), v) in holo.indexed_iter_mut() {
        let inside = r >= r0 && r < r1 && c >= c0 && c < c1;
        if !inside {
            *v = Complex64::new(0.0, 0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    fn ramp_field(h: usize, w: usize) -> ComplexField {
        Array2::from_shape_fn((h, w), |(r, c)| {
            let phase = (r as f64 * 0.7 + c as f64 * 0.3).sin() * PI;
            Complex64::from_polar(0.5 + (r + c) as f64 * 0.2, phase)
        })
    }

    #[test]
    fn continuous_output_is_unit_amplitude() {
        let constraint = HologramConstraint::gerchberg_saxton(Quantization::Continuous);
        let out = constraint.apply(&ramp_field(8, 8));
        for v in out.iter() {
            assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn binary_phases_are_zero_or_pi() {
        let constraint = HologramConstraint::gerchberg_saxton(Quantization::Binary);
        let out = constraint.apply(&ramp_field(8, 8));
        for v in out.iter() {
            let phase = v.arg().rem_euclid(TAU);
            let ok = phase.abs() < 1e-12
                || (phase - PI).abs() < 1e-12
                || (phase - TAU).abs() < 1e-12;
            assert!(ok, "phase {phase} not in {{0, pi}}");
        }
    }

    #[test]
    fn n_level_output_has_at_most_n_phases() {
        let n = 8;
        let constraint = HologramConstraint::gerchberg_saxton(Quantization::Levels(n));
        let out = constraint.apply(&ramp_field(16, 16));
        let step = TAU / f64::from(n);
        let mut seen = std::collections::BTreeSet::new();
        for v in out.iter() {
            let level = (v.arg().rem_euclid(TAU) / step).round() as u32 % n;
            let snapped = f64::from(level) * step;
            let dist = (v.arg().rem_euclid(TAU) - snapped).abs().min(
                (v.arg().rem_euclid(TAU) - snapped - TAU).abs(),
            );
            assert!(dist < 1e-12, "phase off-grid by {dist}");
            seen.insert(level);
        }
        assert!(seen.len() <= n as usize);
    }

    #[test]
    fn band_limit_zeroes_outside_retained_rectangle() {
        let constraint = HologramConstraint {
            quantization: Quantization::Continuous,
            band_limit: true,
            power_smooth: false,
        };
        let out = constraint.apply(&ramp_field(16, 16));
        for ((r, c), v) in out.indexed_iter() {
            let inside = (4..11).contains(&r) && (4..11).contains(&c);
            if inside {
                assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-12);
            } else {
                assert_eq!(*v, Complex64::new(0.0, 0.0));
            }
        }
    }

    #[test]
    fn power_smoothing_clips_only_bright_pixels() {
        let constraint = HologramConstraint {
            quantization: Quantization::Continuous,
            band_limit: false,
            power_smooth: true,
        };
        let mut field = ComplexField::zeros((2, 2));
        field[[0, 0]] = Complex64::from_polar(2.0, 0.4);
        field[[0, 1]] = Complex64::from_polar(0.3, -1.1);
        field[[1, 0]] = Complex64::from_polar(1.0, 2.0);
        field[[1, 1]] = Complex64::from_polar(0.9, 3.0);
        let out = constraint.apply(&field);
        assert_relative_eq!(out[[0, 0]].norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(out[[0, 0]].arg(), 0.4, epsilon = 1e-12);
        assert_relative_eq!(out[[0, 1]].norm(), 0.3, epsilon = 1e-12);
        assert_relative_eq!(out[[1, 0]].norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(out[[1, 1]].norm(), 0.9, epsilon = 1e-12);
    }

    #[test]
    fn quantize_phase_wraps_top_level_to_zero() {
        // An angle just below +pi rounds to level n, which must wrap to 0.
        assert_relative_eq!(quantize_phase(PI - 1e-9, 4), 0.0, epsilon = 1e-12);
        assert_relative_eq!(quantize_phase(0.0, 4), PI, epsilon = 1e-12);
    }

    #[test]
    fn legacy_aliases_parse() {
        assert_eq!("Continuous".parse::<Quantization>().unwrap(), Quantization::Continuous);
        assert_eq!("Binary".parse::<Quantization>().unwrap(), Quantization::Binary);
        assert_eq!(
            "Multi-Level".parse::<Quantization>().unwrap(),
            Quantization::Levels(256)
        );
        assert_eq!("64".parse::<Quantization>().unwrap(), Quantization::Levels(64));
        assert_eq!("0".parse::<Quantization>().unwrap(), Quantization::Continuous);
        assert!("1".parse::<Quantization>().is_err());
        assert!("Fienup".parse::<Quantization>().is_err());
    }

    #[test]
    fn level_one_is_rejected() {
        assert!(Quantization::Levels(1).validate().is_err());
        assert!(Quantization::Levels(2).validate().is_ok());
        assert!(Quantization::Continuous.validate().is_ok());
    }
}

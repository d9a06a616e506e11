// SPDX-License-Identifier: AGPL-3.0-or-later

//! Complex 2-D fields and the power-normalization invariant.
//!
//! Every field handled by the solver carries total power (the sum of squared
//! magnitudes) equal to its pixel count. Normalizing to that level once at
//! load time keeps error metrics comparable across iterations and lets the
//! post-run sanity check catch numerical regressions.

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{config, Error, Result};

/// A replay- or hologram-domain field: one complex sample per pixel.
pub type ComplexField = Array2<Complex64>;

/// Tolerance used while driving a field's power to 1 during normalization.
pub const NORMALIZE_TOLERANCE: f64 = 1e-10;

/// Looser tolerance for the post-run power sanity check.
pub const POWER_CHECK_TOLERANCE: f64 = 1e-3;

/// Total power of a field: `sum(|f|^2)` over all pixels.
pub fn total_power(field: &ComplexField) -> f64 {
    field.iter().map(|c| c.norm_sqr()).sum()
}

/// Rescales `field` so its total power equals `height * width`.
///
/// The rescale to unit power is repeated until it holds within
/// [`NORMALIZE_TOLERANCE`]; a single pass can miss on large fields where the
/// power sum itself accumulates round-off. The result is then lifted to the
/// canonical `height * width` level. Idempotent within floating tolerance.
pub fn normalize_power(field: &ComplexField) -> Result<ComplexField> {
    let (height, width) = field.dim();
    let mut out = field.clone();

    if total_power(&out) == 0.0 {
        return Err(Error::EmptyField);
    }

    while (total_power(&out) - 1.0).abs() > NORMALIZE_TOLERANCE {
        let scale = 1.0 / total_power(&out).sqrt();
        out.mapv_inplace(|c| c * scale);
    }
    let lift = ((height * width) as f64).sqrt();
    out.mapv_inplace(|c| c * lift);
    Ok(out)
}

/// Verifies that `field`'s total power equals `height * width` within
/// `tolerance`, naming the offending field in the error.
pub fn check_power(field: &ComplexField, name: &'static str, tolerance: f64) -> Result<()> {
    let (height, width) = field.dim();
    let expected = (height * width) as f64;
    let power = total_power(field);
    if (power - expected).abs() > tolerance {
        return Err(Error::PowerInvariant {
            field: name,
            power,
            expected,
            tolerance,
        });
    }
    Ok(())
}

/// Overwrites the lower half of `img` with the point-reflected copy of the
/// upper half, making the field conjugate-symmetric so a binary-phase device
/// can render it.
///
/// The copied block is rows `[0, h/2 - 1)` flipped both ways into rows
/// `[h/2, h - 1)`. Both ranges stop one row short of the obvious bound; the
/// asymmetry is intentional and matches the reference numerics, so the last
/// row and the row just above the midline are left untouched.
pub fn impose_conjugate_symmetry(img: &mut Array2<f64>) -> Result<()> {
    let (height, width) = img.dim();
    if height % 2 != 0 {
        return Err(config("conjugate symmetry requires an even field height"));
    }
    if height < 4 {
        return Ok(());
    }
    let half = height / 2;
    let copied_rows = half - 1;
    for r in 0..copied_rows {
        for c in 0..width {
            img[[half + r, c]] = img[[copied_rows - 1 - r, width - 1 - c]];
        }
    }
    Ok(())
}

/// Lifts a real amplitude matrix into a zero-phase complex field.
pub fn from_amplitude(amplitude: &Array2<f64>) -> ComplexField {
    amplitude.mapv(|a| Complex64::new(a, 0.0))
}

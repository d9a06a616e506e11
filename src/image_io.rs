// SPDX-License-Identifier: AGPL-3.0-or-later

//! Raster-file input for target construction (feature `image`).

use std::path::Path;

use ndarray::Array2;

use crate::error::{Error, Result};

/// Decodes a raster file and converts it to a single grayscale channel,
/// one `f64` per pixel in `[0, 255]`.
pub fn load_grayscale<P: AsRef<Path>>(path: P) -> Result<Array2<f64>> {
    let img = image::open(path.as_ref())
        .map_err(|e| Error::Image(e.to_string()))?
        .to_luma8();
    let (width, height) = img.dimensions();
    Ok(Array2::from_shape_fn(
        (height as usize, width as usize),
        |(r, c)| f64::from(img.get_pixel(c as u32, r as u32).0[0]),
    ))
}

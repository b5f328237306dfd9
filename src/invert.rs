//! Pixel color inversion.
//!
//! The dark-mode effect is a uniform channel-wise inversion: every sample
//! value `v` becomes `255 - v`, across the whole raster, photographs
//! included. The operation has no cross-pixel dependency, is deterministic,
//! and is its own inverse.

use image::RgbImage;

/// Invert an RGB raster in place.
///
/// Applying this twice restores the original buffer byte-for-byte.
pub fn invert_in_place(image: &mut RgbImage) {
    for sample in image.iter_mut() {
        *sample = 255 - *sample;
    }
}

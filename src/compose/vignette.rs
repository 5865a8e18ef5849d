//! Radial-falloff vignette.
//!
//! The mask is the outer product of two 1D Gaussian kernels (one per axis,
//! sigma = half the axis length), normalized so the brightest point is 1.0,
//! then scaled by a strength constant. Blending keeps 60% of the original
//! everywhere so corners darken without going black:
//! `out = clamp(v * mask + v * 0.6)`.

use image::RgbImage;
use rayon::prelude::*;

/// Fraction of the original image retained at full attenuation.
const BASE_RETENTION: f32 = 0.6;

/// Unnormalized 1D Gaussian kernel of the given length, centered at
/// `(len - 1) / 2`, sigma = `len / 2`.
pub fn gaussian_kernel(len: u32, sigma: f64) -> Vec<f64> {
    let center = (len as f64 - 1.0) / 2.0;
    let denom = 2.0 * sigma * sigma;
    (0..len)
        .map(|i| {
            let d = i as f64 - center;
            (-d * d / denom).exp()
        })
        .collect()
}

/// Per-pixel attenuation weights in [0, strength], row-major, peaking at the
/// image center.
pub fn falloff_mask(width: u32, height: u32, strength: f32) -> Vec<f32> {
    let row = gaussian_kernel(width, width as f64 / 2.0);
    let col = gaussian_kernel(height, height as f64 / 2.0);

    // Kernels peak at their centers, so the outer product's maximum is the
    // product of the two peaks.
    let peak = row.iter().cloned().fold(f64::MIN, f64::max)
        * col.iter().cloned().fold(f64::MIN, f64::max);

    let mut mask = Vec::with_capacity((width * height) as usize);
    for y in 0..height as usize {
        for x in 0..width as usize {
            mask.push((col[y] * row[x] / peak) as f32 * strength);
        }
    }
    mask
}

/// Apply the vignette in place.
pub fn apply(img: &mut RgbImage, strength: f32) {
    let (w, h) = img.dimensions();
    let mask = falloff_mask(w, h, strength);
    let buf: &mut [u8] = img;
    buf.par_chunks_mut(3)
        .zip(mask.par_iter())
        .for_each(|(px, &m)| {
            let weight = BASE_RETENTION + m;
            for c in px.iter_mut() {
                *c = (*c as f32 * weight).round().clamp(0.0, 255.0) as u8;
            }
        });
}

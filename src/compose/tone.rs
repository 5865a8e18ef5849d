//! Tone and color adjustments applied to the flattened composite.
//!
//! Channel-independent steps (gamma, contrast, brightness) are compiled into
//! 256-entry lookup tables once per invocation and applied by table lookup;
//! saturation and sharpening need per-pixel math. Every step clamps to
//! [0, 255] — values saturate, they never wrap.
//!
//! The order is fixed: gamma → contrast → brightness → saturation →
//! sharpness. Each step operates on the previous step's output.

use image::{RgbImage, RgbaImage, imageops};
use rayon::prelude::*;

/// Sigma of the Gaussian blur used for the unsharp-mask sharpening step.
const SHARPEN_SIGMA: f32 = 1.0;

/// Contrast pivot: distances from mid-gray are scaled, mid-gray is fixed.
const CONTRAST_PIVOT: f32 = 128.0;

fn point_table(f: impl Fn(f64) -> f64) -> [u8; 256] {
    let mut table = [0u8; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        *entry = f(i as f64).round().clamp(0.0, 255.0) as u8;
    }
    table
}

/// Power-law gamma table: `table[i] = 255 * (i/255)^(1/gamma)`.
pub fn gamma_table(gamma: f64) -> [u8; 256] {
    let inv = 1.0 / gamma;
    point_table(|v| (v / 255.0).powf(inv) * 255.0)
}

/// Mid-gray-pivot contrast table.
pub fn contrast_table(factor: f32) -> [u8; 256] {
    let f = factor as f64;
    point_table(|v| CONTRAST_PIVOT as f64 + f * (v - CONTRAST_PIVOT as f64))
}

/// Multiplicative brightness table.
pub fn brightness_table(factor: f32) -> [u8; 256] {
    let f = factor as f64;
    point_table(|v| v * f)
}

/// Remap every channel of every pixel through a lookup table.
pub fn apply_table(img: &mut RgbImage, table: &[u8; 256]) {
    let buf: &mut [u8] = img;
    buf.par_iter_mut().for_each(|v| *v = table[*v as usize]);
}

/// Integer Rec. 601 luminance, the gray point saturation pivots around.
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
}

/// Push each channel away from (factor > 1) or toward (factor < 1) the
/// pixel's own luminance gray.
pub fn adjust_saturation(img: &mut RgbImage, factor: f32) {
    let buf: &mut [u8] = img;
    buf.par_chunks_mut(3).for_each(|px| {
        let gray = luminance(px[0], px[1], px[2]) as f32;
        for c in px.iter_mut() {
            *c = (gray + factor * (*c as f32 - gray))
                .round()
                .clamp(0.0, 255.0) as u8;
        }
    });
}

/// Unsharp-mask sharpening: interpolate past the original away from a
/// Gaussian-blurred copy. A factor of 1.0 is the identity; ~1.1 restores
/// detail lost to resampling and blending.
pub fn sharpen(img: &RgbImage, factor: f32) -> RgbImage {
    let (w, h) = img.dimensions();
    let blurred = imageops::blur(img, SHARPEN_SIGMA);

    let mut out = RgbImage::new(w, h);
    let out_buf: &mut [u8] = &mut out;
    let orig: &[u8] = img;
    let blur: &[u8] = &blurred;

    out_buf
        .par_iter_mut()
        .zip(orig.par_iter().zip(blur.par_iter()))
        .for_each(|(o, (&v, &b))| {
            *o = (b as f32 + factor * (v as f32 - b as f32))
                .round()
                .clamp(0.0, 255.0) as u8;
        });
    out
}

/// Scale the RGB channels of an RGBA buffer, leaving alpha untouched.
///
/// Used to match the subject's exposure to the background before the shadow
/// is derived from it.
pub fn match_brightness(img: &mut RgbaImage, factor: f32) {
    let table = brightness_table(factor);
    for p in img.pixels_mut() {
        p[0] = table[p[0] as usize];
        p[1] = table[p[1] as usize];
        p[2] = table[p[2] as usize];
    }
}

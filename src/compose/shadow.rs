//! Contact shadow synthesis.
//!
//! The shadow is a near-black buffer whose alpha is the subject's own
//! silhouette scaled by a flat opacity, then softened with a Gaussian blur.
//! The blur runs on the alpha plane alone: the fill is uniform, so color
//! channels cannot fringe no matter how far the alpha spreads.

use image::{GrayImage, Rgba, RgbaImage, imageops};

/// Blur radius as a fraction of the subject height.
pub const BLUR_RADIUS_RATIO: f64 = 0.08;

/// Shadow fill color.
const FILL: [u8; 3] = [0, 0, 0];

/// Gaussian blur radius for a subject of the given height, truncated.
pub fn blur_radius(subject_height: u32) -> u32 {
    (subject_height as f64 * BLUR_RADIUS_RATIO) as u32
}

/// Build the hard-edged shadow silhouette from the subject's alpha channel.
///
/// Output has the subject's dimensions, constant fill, and
/// `alpha = subject_alpha * opacity / 255` per pixel, so soft cutout edges
/// carry through to the shadow.
pub fn silhouette(subject: &RgbaImage, opacity: u8) -> RgbaImage {
    let (w, h) = subject.dimensions();
    let mut shadow = RgbaImage::new(w, h);
    for (src, dst) in subject.pixels().zip(shadow.pixels_mut()) {
        let a = (src[3] as u16 * opacity as u16 + 127) / 255;
        *dst = Rgba([FILL[0], FILL[1], FILL[2], a as u8]);
    }
    shadow
}

/// Soften a silhouette by Gaussian-blurring its alpha plane.
///
/// A radius of zero returns the silhouette unchanged.
pub fn soften(shadow: &RgbaImage, radius: u32) -> RgbaImage {
    if radius == 0 {
        return shadow.clone();
    }
    let (w, h) = shadow.dimensions();
    let mut alpha = GrayImage::new(w, h);
    for (src, dst) in shadow.pixels().zip(alpha.pixels_mut()) {
        dst[0] = src[3];
    }
    let blurred = imageops::blur(&alpha, radius as f32);

    let mut out = RgbaImage::new(w, h);
    for (a, dst) in blurred.pixels().zip(out.pixels_mut()) {
        *dst = Rgba([FILL[0], FILL[1], FILL[2], a[0]]);
    }
    out
}

/// Synthesize the finished drop shadow for an already-resized subject.
pub fn drop_shadow(subject: &RgbaImage, opacity: u8) -> RgbaImage {
    soften(&silhouette(subject, opacity), blur_radius(subject.height()))
}

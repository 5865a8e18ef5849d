//! Layer assembly: paste shadow and subject, flatten onto the background.
//!
//! Both pastes go onto a transparent scratch layer sized to the background,
//! shadow first so the subject occludes it where they overlap. The scratch
//! layer is then alpha-composited over the opaque background in a single
//! pass and the result converted to RGB — no transparency survives this
//! module.
//!
//! The paste operator is the standard alpha-over with signed, clipped
//! offsets. It is implemented here rather than through `imageops::overlay`:
//! fully transparent source pixels must leave the destination byte-exact
//! (a cutout with alpha 0 everywhere composites to the unmodified
//! background), which a normalize-to-float round trip does not guarantee.

use image::{DynamicImage, Rgba, RgbImage, RgbaImage};

/// Force every pixel fully opaque. Applied to the background after decode so
/// a translucent PNG background cannot leak through the flatten.
pub fn force_opaque(img: &mut RgbaImage) {
    for p in img.pixels_mut() {
        p[3] = 255;
    }
}

/// Alpha-over a single source pixel onto a destination pixel.
///
/// `out_a = a_s + a_d(1-a_s)`, `out_c = (c_s·a_s + c_d·a_d(1-a_s)) / out_a`,
/// channels kept in 0-255, alphas normalized. Source alpha 0 and 255 short
/// circuit to the exact destination/source values.
fn blend_over(dst: &mut Rgba<u8>, src: &Rgba<u8>) {
    match src[3] {
        0 => {}
        255 => *dst = *src,
        _ => {
            let a_s = src[3] as f32 / 255.0;
            let a_d = dst[3] as f32 / 255.0;
            let out_a = a_s + a_d * (1.0 - a_s);
            for c in 0..3 {
                let over = src[c] as f32 * a_s + dst[c] as f32 * a_d * (1.0 - a_s);
                dst[c] = (over / out_a).round().clamp(0.0, 255.0) as u8;
            }
            dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Paste `src` over `dst` with its top-left corner at `(x, y)`.
///
/// Out-of-bounds source regions are clipped; negative origins are fine.
pub fn paste_over(dst: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    let (dst_w, dst_h) = (dst.width() as i64, dst.height() as i64);
    let (src_w, src_h) = (src.width() as i64, src.height() as i64);

    let x_range = x.max(0)..(x + src_w).min(dst_w);
    let y_range = y.max(0)..(y + src_h).min(dst_h);

    for dy in y_range {
        for dx in x_range.clone() {
            let s = src.get_pixel((dx - x) as u32, (dy - y) as u32);
            blend_over(dst.get_pixel_mut(dx as u32, dy as u32), s);
        }
    }
}

/// Composite shadow and subject over the background at the given offsets.
///
/// Consumes the background; the returned image has its dimensions.
pub fn flatten(
    mut background: RgbaImage,
    subject: &RgbaImage,
    shadow: &RgbaImage,
    subject_at: (i64, i64),
    shadow_at: (i64, i64),
) -> RgbImage {
    let (bg_w, bg_h) = background.dimensions();
    let mut layer = RgbaImage::from_pixel(bg_w, bg_h, Rgba([0, 0, 0, 0]));

    paste_over(&mut layer, shadow, shadow_at.0, shadow_at.1);
    paste_over(&mut layer, subject, subject_at.0, subject_at.1);
    paste_over(&mut background, &layer, 0, 0);

    DynamicImage::ImageRgba8(background).to_rgb8()
}

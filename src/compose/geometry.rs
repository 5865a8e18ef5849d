//! Pure placement math for the composite.
//!
//! All functions here are pure and testable without any I/O or images.
//! Offsets are signed: a subject that scales wider or taller than the
//! background gets a negative origin and is clipped at paste time, never
//! rejected.

/// Fraction of the background height the scaled subject occupies.
pub const SUBJECT_HEIGHT_RATIO: f64 = 0.6;

/// Shadow displacement as a fraction of the subject's dimensions,
/// simulating an overhead-and-side light source.
pub const SHADOW_OFFSET_RATIO: f64 = 0.06;

/// Calculate the subject's dimensions after scaling to the background.
///
/// Target height is `SUBJECT_HEIGHT_RATIO` of the background height; width
/// scales by the same factor to preserve aspect ratio. Both dimensions are
/// truncated and floored at 1 so the resize always has a valid target.
pub fn scaled_subject_size(subject: (u32, u32), bg_height: u32) -> (u32, u32) {
    let (src_w, src_h) = subject;
    let target_h = ((bg_height as f64 * SUBJECT_HEIGHT_RATIO) as u32).max(1);
    let scale = target_h as f64 / src_h as f64;
    let target_w = ((src_w as f64 * scale) as u32).max(1);
    (target_w, target_h)
}

/// Calculate where the subject's top-left corner lands on the background.
///
/// Horizontally centered (floor division), bottom edge flush with the
/// background's bottom edge. Either coordinate may be negative.
pub fn subject_placement(background: (u32, u32), subject: (u32, u32)) -> (i64, i64) {
    let (bg_w, bg_h) = background;
    let (w, h) = subject;
    let px = (bg_w as i64 - w as i64).div_euclid(2);
    let py = bg_h as i64 - h as i64;
    (px, py)
}

/// Directional bias added to the subject placement to position the shadow
/// down-and-right of the subject.
pub fn shadow_offset(subject: (u32, u32)) -> (i64, i64) {
    let (w, h) = subject;
    (
        (w as f64 * SHADOW_OFFSET_RATIO) as i64,
        (h as f64 * SHADOW_OFFSET_RATIO) as i64,
    )
}

//! Pipeline orchestration.
//!
//! One [`Pipeline::render`] call runs the full sequence — extract, decode,
//! scale, shadow, composite, tone-map, vignette — and returns the finished
//! RGB buffer or a typed failure. Each invocation is stateless: fresh
//! buffers in, fresh buffer out, nothing cached across calls.

use image::{RgbImage, RgbaImage, imageops};
use log::{debug, info};
use std::fmt;
use std::path::Path;

use crate::compose::{geometry, layers, shadow, tone, vignette};
use crate::config::PipelineConfig;
use crate::encode::{self, EncodeError};
use crate::extract::{ExtractError, SubjectExtractor};
use thiserror::Error;

/// Which input image a decode or geometry failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    Subject,
    Background,
}

impl fmt::Display for ImageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRole::Subject => write!(f, "subject"),
            ImageRole::Background => write!(f, "background"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("subject extraction failed: {0}")]
    Extraction(#[from] ExtractError),
    #[error("failed to decode {role} image: {source}")]
    Decode {
        role: ImageRole,
        #[source]
        source: image::ImageError,
    },
    #[error("{role} image has a zero dimension ({width}x{height})")]
    DegenerateGeometry {
        role: ImageRole,
        width: u32,
        height: u32,
    },
    #[error("failed to write output: {0}")]
    Encode(#[from] EncodeError),
}

/// The compositing pipeline: an extractor collaborator plus a finishing
/// policy. Stateless across renders; shareable across threads when the
/// extractor is.
pub struct Pipeline<E> {
    extractor: E,
    config: PipelineConfig,
}

impl<E: SubjectExtractor> Pipeline<E> {
    pub fn new(extractor: E, config: PipelineConfig) -> Self {
        Self { extractor, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the extraction collaborator on an encoded photo, returning
    /// encoded cutout bytes whose alpha carries the mask.
    pub fn extract(&self, photo: &[u8]) -> Result<Vec<u8>, PipelineError> {
        Ok(self.extractor.extract(photo)?)
    }

    /// Full pipeline: extract the subject from `subject_photo`, then
    /// composite it over `background`.
    pub fn render(
        &self,
        subject_photo: &[u8],
        background: &[u8],
    ) -> Result<RgbImage, PipelineError> {
        let cutout = self.extract(subject_photo)?;
        self.render_cutout(&cutout, background)
    }

    /// Composite an already-extracted cutout (alpha = mask) over a
    /// background.
    pub fn render_cutout(
        &self,
        cutout: &[u8],
        background: &[u8],
    ) -> Result<RgbImage, PipelineError> {
        let subject = decode_rgba(cutout, ImageRole::Subject)?;
        let mut background = decode_rgba(background, ImageRole::Background)?;
        layers::force_opaque(&mut background);

        check_nonzero(&subject, ImageRole::Subject)?;
        check_nonzero(&background, ImageRole::Background)?;

        let (bg_w, bg_h) = background.dimensions();
        let (w, h) = geometry::scaled_subject_size(subject.dimensions(), bg_h);
        info!(
            "compositing {}x{} subject onto {bg_w}x{bg_h} background as {w}x{h}",
            subject.width(),
            subject.height()
        );

        let mut subject = imageops::resize(&subject, w, h, imageops::FilterType::Lanczos3);
        tone::match_brightness(&mut subject, self.config.subject_brightness);

        let drop = shadow::drop_shadow(&subject, self.config.shadow_opacity);
        let placement = geometry::subject_placement((bg_w, bg_h), (w, h));
        let offset = geometry::shadow_offset((w, h));
        debug!(
            "subject at {placement:?}, shadow offset {offset:?}, blur radius {}",
            shadow::blur_radius(h)
        );

        let shadow_at = (placement.0 + offset.0, placement.1 + offset.1);
        let mut out = layers::flatten(background, &subject, &drop, placement, shadow_at);

        self.tone_map(&mut out);
        if self.config.vignette {
            vignette::apply(&mut out, self.config.vignette_strength);
        }
        Ok(out)
    }

    /// Render and encode in one step. Nothing is written on failure.
    pub fn render_to_file(
        &self,
        subject_photo: &[u8],
        background: &[u8],
        output: &Path,
    ) -> Result<(), PipelineError> {
        let img = self.render(subject_photo, background)?;
        encode::write_image(&img, output, self.config.jpeg_quality)?;
        Ok(())
    }

    /// Gamma, then the global enhancement chain, in the fixed order each
    /// step's output feeds the next.
    fn tone_map(&self, img: &mut RgbImage) {
        tone::apply_table(img, &tone::gamma_table(self.config.gamma));
        tone::apply_table(img, &tone::contrast_table(self.config.contrast));
        tone::apply_table(img, &tone::brightness_table(self.config.brightness));
        tone::adjust_saturation(img, self.config.saturation);
        *img = tone::sharpen(img, self.config.sharpness);
    }
}

fn decode_rgba(bytes: &[u8], role: ImageRole) -> Result<RgbaImage, PipelineError> {
    image::load_from_memory(bytes)
        .map(|d| d.to_rgba8())
        .map_err(|source| PipelineError::Decode { role, source })
}

fn check_nonzero(img: &RgbaImage, role: ImageRole) -> Result<(), PipelineError> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(PipelineError::DegenerateGeometry {
            role,
            width,
            height,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::tests::MockExtractor;
    use image::{Rgba, RgbaImage};

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        bytes
    }

    fn solid_png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
        png_bytes(&RgbaImage::from_pixel(w, h, Rgba(rgba)))
    }

    fn pipeline_with_cutout(cutout: Vec<u8>) -> Pipeline<MockExtractor> {
        Pipeline::new(
            MockExtractor::with_cutout(cutout),
            PipelineConfig::classic(),
        )
    }

    #[test]
    fn render_produces_background_dimensions() {
        let pipeline = pipeline_with_cutout(solid_png(40, 60, [200, 30, 30, 255]));
        let out = pipeline
            .render(b"photo", &solid_png(100, 150, [50, 90, 140, 255]))
            .unwrap();
        assert_eq!(out.dimensions(), (100, 150));
    }

    #[test]
    fn render_passes_photo_to_extractor() {
        let pipeline = pipeline_with_cutout(solid_png(10, 20, [0, 0, 0, 255]));
        pipeline
            .render(b"raw-photo-bytes", &solid_png(50, 80, [10, 10, 10, 255]))
            .unwrap();
        let calls = pipeline.extractor.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[b"raw-photo-bytes".to_vec()]);
    }

    #[test]
    fn extraction_failure_propagates() {
        let pipeline = Pipeline::new(MockExtractor::failing(), PipelineConfig::classic());
        let result = pipeline.render(b"photo", &solid_png(50, 80, [0, 0, 0, 255]));
        assert!(matches!(result, Err(PipelineError::Extraction(_))));
    }

    #[test]
    fn undecodable_cutout_is_a_subject_decode_error() {
        let pipeline = pipeline_with_cutout(vec![0xde, 0xad, 0xbe, 0xef]);
        let result = pipeline.render(b"photo", &solid_png(50, 80, [0, 0, 0, 255]));
        assert!(matches!(
            result,
            Err(PipelineError::Decode {
                role: ImageRole::Subject,
                ..
            })
        ));
    }

    #[test]
    fn undecodable_background_is_a_background_decode_error() {
        let pipeline = pipeline_with_cutout(solid_png(10, 10, [0, 0, 0, 255]));
        let result = pipeline.render(b"photo", b"not an image");
        assert!(matches!(
            result,
            Err(PipelineError::Decode {
                role: ImageRole::Background,
                ..
            })
        ));
    }

    #[test]
    fn render_to_file_writes_nothing_on_failure() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = tmp.path().join("composite.jpg");
        let pipeline = Pipeline::new(MockExtractor::failing(), PipelineConfig::classic());
        let result = pipeline.render_to_file(b"photo", &solid_png(40, 40, [0, 0, 0, 255]), &out);
        assert!(result.is_err());
        assert!(!out.exists());
    }

    #[test]
    fn render_is_deterministic() {
        let cutout = solid_png(30, 45, [180, 60, 40, 255]);
        let bg = solid_png(90, 120, [70, 100, 130, 255]);
        let a = pipeline_with_cutout(cutout.clone())
            .render(b"p", &bg)
            .unwrap();
        let b = pipeline_with_cutout(cutout).render(b"p", &bg).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn transparent_subject_leaves_only_tone_mapped_background() {
        let config = PipelineConfig::classic();
        let bg = solid_png(60, 90, [120, 140, 160, 255]);
        let pipeline = Pipeline::new(
            MockExtractor::with_cutout(solid_png(20, 30, [255, 0, 0, 0])),
            config.clone(),
        );
        let out = pipeline.render(b"p", &bg).unwrap();

        // Expected: the background run through the tone chain alone
        let mut expected = image::load_from_memory(&bg).unwrap().to_rgb8();
        tone::apply_table(&mut expected, &tone::gamma_table(config.gamma));
        tone::apply_table(&mut expected, &tone::contrast_table(config.contrast));
        tone::apply_table(&mut expected, &tone::brightness_table(config.brightness));
        tone::adjust_saturation(&mut expected, config.saturation);
        expected = tone::sharpen(&expected, config.sharpness);

        assert_eq!(out, expected);
    }

    #[test]
    fn studio_preset_runs_the_vignette_stage() {
        let cutout = solid_png(20, 30, [200, 200, 200, 255]);
        let bg = solid_png(61, 91, [130, 130, 130, 255]);
        let classic = Pipeline::new(
            MockExtractor::with_cutout(cutout.clone()),
            PipelineConfig {
                vignette: false,
                ..PipelineConfig::studio()
            },
        )
        .render(b"p", &bg)
        .unwrap();
        let studio = Pipeline::new(
            MockExtractor::with_cutout(cutout),
            PipelineConfig::studio(),
        )
        .render(b"p", &bg)
        .unwrap();

        // Same policy except the vignette: corners must differ, and the
        // vignetted corner must be darker
        let c = classic.get_pixel(0, 0).0;
        let s = studio.get_pixel(0, 0).0;
        assert!(s[0] < c[0], "vignette did not darken the corner: {s:?} vs {c:?}");
    }
}

//! End-to-end pipeline scenarios with synthetic images.

use image::{Rgba, RgbaImage};
use photostage::extract::{ExtractError, SubjectExtractor};
use photostage::{Pipeline, PipelineConfig, PipelineError, PrecutExtractor};

/// Extractor that always reports failure, for the failure-propagation path.
struct BrokenExtractor;

impl SubjectExtractor for BrokenExtractor {
    fn extract(&self, _encoded: &[u8]) -> Result<Vec<u8>, ExtractError> {
        Err(ExtractError::EmptyOutput)
    }
}

fn png_bytes(img: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .unwrap();
    bytes
}

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    png_bytes(&RgbaImage::from_pixel(w, h, Rgba(rgba)))
}

/// An opaque 400x600 "person" over a 1000x1500 backdrop: final dimensions
/// match the background, the subject lands centered with its bottom edge on
/// the canvas bottom.
#[test]
fn person_over_backdrop_is_centered_and_bottom_flush() {
    let subject = solid(400, 600, [190, 40, 40, 255]);
    let background = solid(1000, 1500, [60, 110, 160, 255]);

    let pipeline = Pipeline::new(PrecutExtractor, PipelineConfig::classic());
    let out = pipeline.render(&subject, &background).unwrap();

    assert_eq!(out.dimensions(), (1000, 1500));

    // Scaled subject: height 900 (0.6 * 1500), width 600, placed at
    // (200, 600). Sample well inside the subject region: red dominates.
    let inside = out.get_pixel(500, 1200);
    assert!(
        inside[0] > inside[1] + 50 && inside[0] > inside[2] + 50,
        "expected subject red at center-bottom, got {:?}",
        inside
    );

    // Top corners remain background-colored: blue channel dominates
    let corner = out.get_pixel(5, 5);
    assert!(
        corner[2] > corner[0],
        "expected background blue at top-left, got {:?}",
        corner
    );

    // One pixel above the subject's top edge at its horizontal center is
    // still background; one pixel below the edge is subject
    let above = out.get_pixel(500, 598);
    let below = out.get_pixel(500, 602);
    assert!(above[2] > above[0], "above subject top: {:?}", above);
    assert!(below[0] > below[2], "below subject top: {:?}", below);

    // Horizontal centering: columns just outside 200..800 are not subject
    let left_of = out.get_pixel(195, 1200);
    let right_of = out.get_pixel(805, 1200);
    assert!(left_of[0] < left_of[2] + 60);
    assert!(right_of[0] < right_of[2] + 60);
}

/// A fully transparent subject contributes nothing: neither its colors nor
/// its shadow are visible, whatever the cutout looked like under the mask.
#[test]
fn transparent_subject_contributes_nothing() {
    let background = solid(300, 450, [120, 120, 120, 255]);
    let pipeline = Pipeline::new(PrecutExtractor, PipelineConfig::classic());

    let white_ghost = pipeline
        .render(&solid(400, 600, [255, 255, 255, 0]), &background)
        .unwrap();
    let red_ghost = pipeline
        .render(&solid(200, 500, [255, 0, 0, 0]), &background)
        .unwrap();

    assert_eq!(white_ghost.dimensions(), (300, 450));
    // Only the tone-mapped background remains, regardless of the masked-out
    // pixels' colors or the cutout's size
    assert_eq!(white_ghost, red_ghost);
    // A flat background stays flat away from the borders
    let first = *white_ghost.get_pixel(10, 10);
    for y in 10..440 {
        for x in 10..290 {
            assert_eq!(*white_ghost.get_pixel(x, y), first, "at ({x}, {y})");
        }
    }
}

/// Extraction failure propagates as a typed error and writes nothing.
#[test]
fn extraction_failure_produces_no_output() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out_path = tmp.path().join("composite.jpg");

    let pipeline = Pipeline::new(BrokenExtractor, PipelineConfig::classic());
    let result = pipeline.render_to_file(
        b"any photo bytes",
        &solid(200, 300, [90, 90, 90, 255]),
        &out_path,
    );

    assert!(matches!(result, Err(PipelineError::Extraction(_))));
    assert!(!out_path.exists());
}

/// Byte-identical inputs render byte-identical outputs, across separate
/// pipeline instances.
#[test]
fn pipeline_is_a_pure_function_of_its_inputs() {
    let subject = solid(120, 180, [200, 80, 60, 255]);
    let background = solid(400, 600, [70, 90, 120, 255]);

    let first = Pipeline::new(PrecutExtractor, PipelineConfig::studio())
        .render(&subject, &background)
        .unwrap();
    let second = Pipeline::new(PrecutExtractor, PipelineConfig::studio())
        .render(&subject, &background)
        .unwrap();

    assert_eq!(first.as_raw(), second.as_raw());
}

/// The shadow shows up: on a light background, some pixels outside the
/// subject region are darker than the tone-mapped background.
#[test]
fn shadow_darkens_the_backdrop_near_the_subject() {
    let subject = solid(100, 150, [200, 200, 200, 255]);
    let background = solid(500, 750, [220, 220, 220, 255]);

    let pipeline = Pipeline::new(PrecutExtractor, PipelineConfig::classic());
    let out = pipeline.render(&subject, &background).unwrap();

    // Subject occupies x in [100, 400); the shadow rect is offset to
    // (118, 327), so the strip at x in [400, 418) is shadow over backdrop
    let far_corner = out.get_pixel(5, 5).0[0];
    let beside_subject = out.get_pixel(410, 700).0[0];
    assert!(
        beside_subject < far_corner,
        "expected shadow darkening: {beside_subject} vs {far_corner}"
    );
}

/// JPEG output decodes back at the background's dimensions.
#[test]
fn render_to_file_writes_decodable_jpeg() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out_path = tmp.path().join("composite.jpg");

    let pipeline = Pipeline::new(PrecutExtractor, PipelineConfig::classic());
    pipeline
        .render_to_file(
            &solid(80, 120, [180, 60, 40, 255]),
            &solid(200, 300, [90, 110, 130, 255]),
            &out_path,
        )
        .unwrap();

    let decoded = image::open(&out_path).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (200, 300));
}

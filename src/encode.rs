//! Final image encoding, dispatched on the output path's extension.

use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
    #[error("encode failed for {path}: {message}")]
    Codec { path: String, message: String },
}

/// Write the finished composite to `path` as JPEG (`.jpg`/`.jpeg`, at the
/// given quality) or PNG (`.png`).
pub fn write_image(img: &RgbImage, path: &Path, jpeg_quality: u8) -> Result<(), EncodeError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let codec = |e: image::ImageError| EncodeError::Codec {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    match ext.as_str() {
        "jpg" | "jpeg" => {
            let file = std::fs::File::create(path)?;
            let writer = std::io::BufWriter::new(file);
            let encoder = JpegEncoder::new_with_quality(writer, jpeg_quality.clamp(1, 100));
            img.write_with_encoder(encoder).map_err(codec)
        }
        "png" => {
            let file = std::fs::File::create(path)?;
            let writer = std::io::BufWriter::new(file);
            img.write_with_encoder(PngEncoder::new(writer)).map_err(codec)
        }
        other => Err(EncodeError::UnsupportedFormat(other.to_string())),
    }
}

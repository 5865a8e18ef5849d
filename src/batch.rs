//! Batch rendering: one subject composited over a directory of backgrounds.
//!
//! The subject is extracted once, then every background renders in parallel
//! with rayon. Individual background failures are collected and reported,
//! not fatal — a bad file in the directory doesn't sink the run.

use log::{info, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::encode;
use crate::extract::SubjectExtractor;
use crate::pipeline::{Pipeline, PipelineError};

/// Extensions the batch scanner picks up as backgrounds.
pub const BACKGROUND_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no background images found in {0}")]
    NoBackgrounds(PathBuf),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Output files written, in background scan order.
    pub written: Vec<PathBuf>,
    /// Backgrounds that failed, with the failure rendered to text.
    pub failed: Vec<(PathBuf, String)>,
}

/// Find background images under `dir`, sorted for deterministic output.
pub fn find_backgrounds(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| {
                    BACKGROUND_EXTENSIONS
                        .iter()
                        .any(|known| ext.eq_ignore_ascii_case(known))
                })
        })
        .collect();
    paths.sort();
    paths
}

/// Composite `subject_photo` over every background image under
/// `background_dir`, writing `<stem>-composite.jpg` files into `output_dir`.
pub fn run<E: SubjectExtractor>(
    pipeline: &Pipeline<E>,
    subject_photo: &Path,
    background_dir: &Path,
    output_dir: &Path,
) -> Result<BatchSummary, BatchError> {
    let backgrounds = find_backgrounds(background_dir);
    if backgrounds.is_empty() {
        return Err(BatchError::NoBackgrounds(background_dir.to_path_buf()));
    }

    let photo = fs::read(subject_photo)?;
    info!("extracting subject from {}", subject_photo.display());
    let cutout = pipeline.extract(&photo)?;

    fs::create_dir_all(output_dir)?;

    let results: Vec<Result<PathBuf, (PathBuf, String)>> = backgrounds
        .par_iter()
        .map(|bg_path| {
            let render = || -> Result<PathBuf, BatchError> {
                let bg_bytes = fs::read(bg_path)?;
                let img = pipeline.render_cutout(&cutout, &bg_bytes)?;
                let stem = bg_path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("background");
                let out_path = output_dir.join(format!("{stem}-composite.jpg"));
                encode::write_image(&img, &out_path, pipeline.config().jpeg_quality)
                    .map_err(PipelineError::from)?;
                Ok(out_path)
            };
            render().map_err(|e| {
                warn!("skipping {}: {e}", bg_path.display());
                (bg_path.clone(), e.to_string())
            })
        })
        .collect();

    let mut summary = BatchSummary::default();
    for result in results {
        match result {
            Ok(path) => summary.written.push(path),
            Err(failure) => summary.failed.push(failure),
        }
    }
    info!(
        "batch finished: {} written, {} failed",
        summary.written.len(),
        summary.failed.len()
    );
    Ok(summary)
}

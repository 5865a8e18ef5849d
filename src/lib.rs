//! # Photostage
//!
//! Composite a cut-out subject onto a new background, synthesize a plausible
//! contact shadow, and finish the result with studio-style tone corrections.
//!
//! # Architecture: One Linear Pipeline
//!
//! Every render is a single stateless pass through fixed stages:
//!
//! ```text
//! 1. Extract     photo        →  RGBA cutout      (external collaborator)
//! 2. Geometry    cutout       →  scaled + placed  (0.6 × bg height, centered, bottom-flush)
//! 3. Shadow      alpha mask   →  soft drop shadow (silhouette + Gaussian blur)
//! 4. Composite   bg/shadow/subject → flat RGB     (alpha-over, shadow under subject)
//! 5. Tone        RGB          →  finished RGB     (gamma LUT, contrast, brightness,
//!                                                  saturation, sharpness)
//! 6. Vignette    RGB          →  RGB              (optional radial falloff)
//! 7. Encode      RGB          →  JPEG/PNG bytes
//! ```
//!
//! There is no branching, no retry, and no state shared between renders —
//! a [`pipeline::Pipeline`] can serve parallel batch renders because every
//! invocation allocates its own buffers.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Orchestration: extract → compose → tone → encode, typed errors |
//! | [`compose`] | The pixel work: geometry, shadow, layer assembly, tone, vignette |
//! | [`extract`] | The background-removal collaborator trait + implementations |
//! | [`config`] | [`config::PipelineConfig`], the `classic`/`studio` presets, TOML loading |
//! | [`batch`] | One subject over a directory of backgrounds, rayon-parallel |
//! | [`encode`] | Extension-dispatched JPEG/PNG output |
//!
//! # Design Decisions
//!
//! ## Extraction Is a Collaborator, Not a Feature
//!
//! Segmentation models change fast; compositing math doesn't. The pipeline
//! consumes any [`extract::SubjectExtractor`] — the stock one shells out to
//! a `rembg`-style tool over stdin/stdout — and treats its failure as a
//! typed pipeline failure, never a crash.
//!
//! ## Policy Lives in Configuration
//!
//! Every tunable constant (shadow opacity, gamma, the enhancement factors,
//! vignette) is a named field on [`config::PipelineConfig`]. The two
//! finishing policies that shipped are both reachable as presets; neither
//! is hardcoded.
//!
//! ## Pure-Rust Imaging
//!
//! All pixel work uses the `image` crate (Lanczos3 resampling, alpha-over
//! compositing, Gaussian blur). No system dependencies: the binary is fully
//! self-contained apart from the optional extraction tool.

pub mod batch;
pub mod compose;
pub mod config;
pub mod encode;
pub mod extract;
pub mod pipeline;

pub use config::PipelineConfig;
pub use extract::{CommandExtractor, PrecutExtractor, SubjectExtractor};
pub use pipeline::{Pipeline, PipelineError};

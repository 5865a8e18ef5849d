//! Pipeline configuration.
//!
//! All tunable constants of the pipeline live in [`PipelineConfig`]. Two
//! named presets capture the two finishing policies observed in production:
//!
//! - **classic** — no vignette, gentle lift (gamma 0.95, contrast 1.02)
//! - **studio** — vignette on, deeper midtones (gamma 0.90, contrast 0.95)
//!
//! A `photostage.toml` file is sparse: it names a preset to start from and
//! overrides just the values it wants:
//!
//! ```toml
//! preset = "studio"
//!
//! [pipeline]
//! shadow_opacity = 90
//! saturation = 1.2
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unknown preset '{0}' (expected 'classic' or 'studio')")]
    UnknownPreset(String),
    #[error("config validation error: {0}")]
    Validation(String),
}

/// Every tunable constant of the compositing pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Flat alpha scale applied to the subject silhouette when deriving the
    /// shadow (0 = no shadow, 255 = silhouette-opaque shadow).
    pub shadow_opacity: u8,
    /// RGB scale applied to the subject before compositing, to match its
    /// exposure to the background.
    pub subject_brightness: f32,
    /// Midtone gamma. The LUT is `255 * (i/255)^(1/gamma)`.
    pub gamma: f64,
    /// Mid-gray-pivot contrast factor.
    pub contrast: f32,
    /// Global brightness factor.
    pub brightness: f32,
    /// Color factor: > 1 pushes channels away from luminance gray.
    pub saturation: f32,
    /// Unsharp-mask factor: 1.0 is identity.
    pub sharpness: f32,
    /// Enable the radial-falloff vignette stage.
    pub vignette: bool,
    /// Peak vignette mask value.
    pub vignette_strength: f32,
    /// JPEG encoder quality (1-100).
    pub jpeg_quality: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::classic()
    }
}

impl PipelineConfig {
    /// The no-vignette finishing policy.
    pub fn classic() -> Self {
        Self {
            shadow_opacity: 120,
            subject_brightness: 0.98,
            gamma: 0.95,
            contrast: 1.02,
            brightness: 1.02,
            saturation: 1.05,
            sharpness: 1.10,
            vignette: false,
            vignette_strength: 0.4,
            jpeg_quality: 95,
        }
    }

    /// The vignette finishing policy.
    pub fn studio() -> Self {
        Self {
            shadow_opacity: 100,
            subject_brightness: 0.90,
            gamma: 0.90,
            contrast: 0.95,
            brightness: 1.01,
            saturation: 1.10,
            sharpness: 1.10,
            vignette: true,
            vignette_strength: 0.4,
            jpeg_quality: 95,
        }
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "classic" => Ok(Self::classic()),
            "studio" => Ok(Self::studio()),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }

    /// Load a config file: preset base plus sparse overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse config TOML. Missing `preset` defaults to `classic`.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        let mut config = match file.preset {
            Some(name) => Self::preset(&name)?,
            None => Self::classic(),
        };
        if let Some(over) = file.pipeline {
            over.apply(&mut config);
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let err = |msg: String| Err(ConfigError::Validation(msg));
        if !self.gamma.is_finite() || self.gamma <= 0.0 {
            return err(format!("gamma must be positive, got {}", self.gamma));
        }
        for (name, v) in [
            ("subject_brightness", self.subject_brightness),
            ("contrast", self.contrast),
            ("brightness", self.brightness),
            ("saturation", self.saturation),
            ("sharpness", self.sharpness),
        ] {
            if !v.is_finite() || v < 0.0 {
                return err(format!("{name} must be finite and non-negative, got {v}"));
            }
        }
        if !(0.0..=1.0).contains(&self.vignette_strength) {
            return err(format!(
                "vignette_strength must be in [0, 1], got {}",
                self.vignette_strength
            ));
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return err(format!(
                "jpeg_quality must be 1-100, got {}",
                self.jpeg_quality
            ));
        }
        Ok(())
    }
}

/// On-disk shape: a preset name plus sparse `[pipeline]` overrides.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    preset: Option<String>,
    pipeline: Option<Overrides>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Overrides {
    shadow_opacity: Option<u8>,
    subject_brightness: Option<f32>,
    gamma: Option<f64>,
    contrast: Option<f32>,
    brightness: Option<f32>,
    saturation: Option<f32>,
    sharpness: Option<f32>,
    vignette: Option<bool>,
    vignette_strength: Option<f32>,
    jpeg_quality: Option<u8>,
}

impl Overrides {
    fn apply(&self, config: &mut PipelineConfig) {
        let Self {
            shadow_opacity,
            subject_brightness,
            gamma,
            contrast,
            brightness,
            saturation,
            sharpness,
            vignette,
            vignette_strength,
            jpeg_quality,
        } = self;
        if let Some(v) = shadow_opacity {
            config.shadow_opacity = *v;
        }
        if let Some(v) = subject_brightness {
            config.subject_brightness = *v;
        }
        if let Some(v) = gamma {
            config.gamma = *v;
        }
        if let Some(v) = contrast {
            config.contrast = *v;
        }
        if let Some(v) = brightness {
            config.brightness = *v;
        }
        if let Some(v) = saturation {
            config.saturation = *v;
        }
        if let Some(v) = sharpness {
            config.sharpness = *v;
        }
        if let Some(v) = vignette {
            config.vignette = *v;
        }
        if let Some(v) = vignette_strength {
            config.vignette_strength = *v;
        }
        if let Some(v) = jpeg_quality {
            config.jpeg_quality = *v;
        }
    }
}

/// A documented stock config file, printed by `photostage gen-config`.
pub fn stock_config_toml() -> &'static str {
    r#"# photostage configuration
#
# Pick a preset, then override individual values below. All overrides are
# optional - omit anything you don't want to change.

# "classic" - no vignette, gentle lift
# "studio"  - vignette on, deeper midtones
preset = "classic"

[pipeline]
# shadow_opacity = 120      # shadow alpha scale, 0-255
# subject_brightness = 0.98 # subject exposure match before compositing
# gamma = 0.95              # midtone gamma
# contrast = 1.02           # mid-gray contrast factor
# brightness = 1.02         # global brightness factor
# saturation = 1.05         # color factor
# sharpness = 1.1           # unsharp-mask factor, 1.0 = off
# vignette = false          # radial corner darkening
# vignette_strength = 0.4   # vignette mask peak, 0-1
# jpeg_quality = 95         # output JPEG quality, 1-100
"#
}

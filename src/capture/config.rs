//! Capture and guidance configuration.
//!
//! Thresholds are deliberately file-configurable: the acceptable
//! distance band depends on the physical subject being photographed,
//! and clinical deployments tune these without recompiling.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Fallback resolution used when a source reports zero dimensions.
///
/// Guards the downstream height-ratio calculations against division
/// by zero before the source has negotiated its native resolution.
pub const DEFAULT_WIDTH: u32 = 640;
/// See [`DEFAULT_WIDTH`].
pub const DEFAULT_HEIGHT: u32 = 480;

/// Preferred camera facing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear camera, preferred for photographing a body region.
    #[default]
    Environment,
    /// Front camera.
    User,
}

/// Configuration for camera acquisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Preferred facing direction (a hint, not a guarantee).
    pub facing: FacingMode,
    /// Preferred frame width in pixels.
    pub width: u32,
    /// Preferred frame height in pixels.
    pub height: u32,
    /// Detection cadence in milliseconds.
    pub detection_interval_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            facing: FacingMode::Environment,
            width: 1280,
            height: 720,
            detection_interval_ms: 500,
        }
    }
}

impl CaptureConfig {
    /// Creates a new configuration with the specified dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Detection cadence as a [`Duration`].
    pub fn detection_interval(&self) -> Duration {
        Duration::from_millis(self.detection_interval_ms)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.detection_interval_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    #[error("invalid detection interval (must be nonzero)")]
    InvalidInterval,
    #[error("invalid lighting thresholds (min must be below max)")]
    InvalidLighting,
    #[error("invalid distance thresholds (min must be below max)")]
    InvalidDistance,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Lighting thresholds on the 0-255 perceived-brightness scale.
///
/// Thresholds are exclusive: a boundary-valued average resolves to ideal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightingThresholds {
    /// Below this average brightness the scene is too dark.
    pub min_brightness: f64,
    /// Above this average brightness the scene is too bright.
    pub max_brightness: f64,
}

impl Default for LightingThresholds {
    fn default() -> Self {
        Self {
            min_brightness: 50.0,
            max_brightness: 200.0,
        }
    }
}

/// Distance thresholds on the box-height / frame-height ratio.
///
/// Height alone is the proxy so the metric stays invariant to
/// horizontal framing. Thresholds are exclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceThresholds {
    /// Below this height ratio the subject is too far away.
    pub min_ratio: f32,
    /// Above this height ratio the subject is too close.
    pub max_ratio: f32,
}

impl Default for DistanceThresholds {
    fn default() -> Self {
        Self {
            min_ratio: 0.2,
            max_ratio: 0.7,
        }
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub lighting: LightingThresholds,
    #[serde(default)]
    pub distance: DistanceThresholds,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: FileConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates all sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capture.validate()?;
        if self.lighting.min_brightness >= self.lighting.max_brightness {
            return Err(ConfigError::InvalidLighting);
        }
        if self.distance.min_ratio >= self.distance.max_ratio
            || self.distance.min_ratio < 0.0
        {
            return Err(ConfigError::InvalidDistance);
        }
        Ok(())
    }
}

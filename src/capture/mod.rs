//! Camera input and frame handling.
//!
//! This module provides abstractions for acquiring frames from a camera
//! source and managing capture configuration. The camera is treated as a
//! scoped resource whose acquisition and release are paired across all
//! control-flow exits.

mod camera;
mod config;
mod frame;
mod sampler;

pub use camera::{CameraError, CameraSource, DeniedCamera, MockCamera, MockRect};
pub use config::{
    CaptureConfig, ConfigError, DistanceThresholds, FacingMode, FileConfig, LightingThresholds,
    DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
pub use frame::{Frame, BYTES_PER_PIXEL};
pub use sampler::FrameSampler;

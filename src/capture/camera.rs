//! Camera abstraction for frame acquisition.
//!
//! This module provides a trait-based abstraction over camera hardware,
//! allowing for both real camera input and mock implementations for testing.
//! The camera is a scoped resource: every open is paired with a close,
//! guaranteed by the session on every exit path.

use super::{frame::BYTES_PER_PIXEL, CaptureConfig, Frame};
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("camera device unavailable: {0}")]
    Unavailable(String),
    #[error("failed to configure camera: {0}")]
    ConfigFailed(String),
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    #[error("camera not initialized")]
    NotInitialized,
}

/// Trait for camera source implementations.
///
/// This abstraction allows swapping between real camera hardware and
/// mock implementations for testing. Resolution in the config is a
/// hint; the source reports its actual dimensions through the frames
/// it produces.
pub trait CameraSource {
    /// Opens the camera with the given configuration.
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError>;

    /// Returns true once the source has produced enough data to sample.
    ///
    /// A freshly opened or stalled stream reports false; the sampler
    /// skips the cycle rather than reading garbage.
    fn frame_ready(&self) -> bool;

    /// Captures the latest frame. Sequence numbering is the sampler's job;
    /// sources stamp frames with sequence 0.
    fn capture(&mut self) -> Result<Frame, CameraError>;

    /// Checks if the camera is currently open.
    fn is_open(&self) -> bool;

    /// Closes the camera and releases the underlying device.
    fn close(&mut self);
}

/// Mock camera that generates synthetic frames for tests and the demo.
///
/// Frames are filled with a uniform brightness level, optionally with a
/// brighter rectangular region so the edge-density fallback detector has
/// something to find.
#[derive(Debug, Default)]
pub struct MockCamera {
    config: Option<CaptureConfig>,
    brightness: u8,
    rect: Option<MockRect>,
    // Cell so readiness polls can advance the warmup through &self
    warmup_remaining: std::cell::Cell<u32>,
}

/// A synthetic rectangular region painted into mock frames.
#[derive(Debug, Clone, Copy)]
pub struct MockRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub brightness: u8,
}

impl MockCamera {
    /// Creates a mock camera producing uniformly lit frames.
    pub fn new(brightness: u8) -> Self {
        Self {
            brightness,
            ..Default::default()
        }
    }

    /// Paints a rectangle of the given brightness into every frame.
    pub fn with_rect(mut self, rect: MockRect) -> Self {
        self.rect = Some(rect);
        self
    }

    /// Reports not-ready for the first `polls` readiness checks,
    /// simulating a stream that has not started delivering yet.
    pub fn with_warmup(self, polls: u32) -> Self {
        self.warmup_remaining.set(polls);
        self
    }

    fn render(&self, width: u32, height: u32) -> Vec<u8> {
        let mut pixels = vec![0u8; (width as usize) * (height as usize) * BYTES_PER_PIXEL];
        for chunk in pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            chunk[0] = self.brightness;
            chunk[1] = self.brightness;
            chunk[2] = self.brightness;
            chunk[3] = 255;
        }
        if let Some(rect) = self.rect {
            for y in rect.y..(rect.y + rect.height).min(height) {
                for x in rect.x..(rect.x + rect.width).min(width) {
                    let idx = ((y as usize) * (width as usize) + (x as usize)) * BYTES_PER_PIXEL;
                    pixels[idx] = rect.brightness;
                    pixels[idx + 1] = rect.brightness;
                    pixels[idx + 2] = rect.brightness;
                }
            }
        }
        pixels
    }
}

impl CameraSource for MockCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;
        self.config = Some(config.clone());
        tracing::info!(?config, "MockCamera opened");
        Ok(())
    }

    fn frame_ready(&self) -> bool {
        if self.config.is_none() {
            return false;
        }
        let remaining = self.warmup_remaining.get();
        if remaining > 0 {
            self.warmup_remaining.set(remaining - 1);
            return false;
        }
        true
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let config = self.config.as_ref().ok_or(CameraError::NotInitialized)?;
        if self.warmup_remaining.get() > 0 {
            return Err(CameraError::CaptureFailed("stream not ready".into()));
        }
        let (width, height) = (config.width, config.height);
        Ok(Frame::new(self.render(width, height), width, height, 0))
    }

    fn is_open(&self) -> bool {
        self.config.is_some()
    }

    fn close(&mut self) {
        self.config = None;
        tracing::info!("MockCamera closed");
    }
}

/// Mock camera that always fails to open, for exercising the error path.
#[derive(Debug, Default)]
pub struct DeniedCamera;

impl CameraSource for DeniedCamera {
    fn open(&mut self, _config: &CaptureConfig) -> Result<(), CameraError> {
        Err(CameraError::PermissionDenied)
    }

    fn frame_ready(&self) -> bool {
        false
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        Err(CameraError::NotInitialized)
    }

    fn is_open(&self) -> bool {
        false
    }

    fn close(&mut self) {}
}

//! Frame sampling from a live camera source.

use super::{
    camera::{CameraError, CameraSource},
    config::{DEFAULT_HEIGHT, DEFAULT_WIDTH},
    frame::BYTES_PER_PIXEL,
    Frame,
};

/// Pulls the latest frame from a camera source and stamps it with a
/// monotonic sequence number.
///
/// The sequence number is how the session discards results from stale
/// detection ticks: a tick's output is only applied if its frame
/// sequence is newer than the last one applied.
#[derive(Debug, Default)]
pub struct FrameSampler {
    sequence: u64,
}

impl FrameSampler {
    /// Creates a sampler starting at sequence zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples the current frame from the source.
    ///
    /// Returns `Ok(None)` when the source has not produced enough data
    /// yet; the caller skips the cycle. Sources reporting zero
    /// dimensions are normalized to 640x480 so downstream ratio
    /// calculations never divide by zero.
    pub fn sample(
        &mut self,
        source: &mut dyn CameraSource,
    ) -> Result<Option<Frame>, CameraError> {
        if !source.is_open() {
            return Err(CameraError::NotInitialized);
        }
        if !source.frame_ready() {
            tracing::trace!("frame not ready, skipping sample");
            return Ok(None);
        }

        let frame = source.capture()?;
        let (width, height) = if frame.width() == 0 || frame.height() == 0 {
            (DEFAULT_WIDTH, DEFAULT_HEIGHT)
        } else {
            (frame.width(), frame.height())
        };

        self.sequence += 1;
        let pixels = if frame.width() == width && frame.height() == height {
            frame.pixels().to_vec()
        } else {
            // Degenerate source; produce a black buffer at fallback size.
            vec![0u8; (width as usize) * (height as usize) * BYTES_PER_PIXEL]
        };
        Ok(Some(Frame::new(pixels, width, height, self.sequence)))
    }

    /// The sequence number of the most recently sampled frame.
    pub fn last_sequence(&self) -> u64 {
        self.sequence
    }
}

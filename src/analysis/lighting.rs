//! Ambient lighting classification.
//!
//! A pure function of pixel data: the same frame and thresholds always
//! produce the same classification.

use crate::capture::{Frame, LightingThresholds, BYTES_PER_PIXEL};

/// Classified lighting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lighting {
    TooDark,
    TooBright,
    Ideal,
    /// No frame analyzed yet.
    #[default]
    Unknown,
}

/// Pixel stride for brightness sampling. Every 10th pixel is enough
/// for an average and keeps the cost well inside the tick budget.
const SAMPLE_STRIDE_PIXELS: usize = 10;

/// Classifies an average brightness against the thresholds.
///
/// Thresholds are exclusive: an average exactly at a boundary resolves
/// to [`Lighting::Ideal`].
pub fn classify_brightness(avg: f64, thresholds: &LightingThresholds) -> Lighting {
    if avg < thresholds.min_brightness {
        Lighting::TooDark
    } else if avg > thresholds.max_brightness {
        Lighting::TooBright
    } else {
        Lighting::Ideal
    }
}

/// Classifies ambient lighting from a frame.
///
/// Samples pixels at a fixed stride and computes perceptual luminance
/// `0.299 R + 0.587 G + 0.114 B` per sample, averaged across samples.
pub fn classify_lighting(frame: &Frame, thresholds: &LightingThresholds) -> Lighting {
    match average_brightness(frame) {
        Some(avg) => {
            tracing::trace!(avg_brightness = avg, "lighting sample");
            classify_brightness(avg, thresholds)
        }
        None => Lighting::Unknown,
    }
}

/// Average perceptual luminance of the frame's sampled pixels,
/// or `None` for an empty buffer.
pub fn average_brightness(frame: &Frame) -> Option<f64> {
    let data = frame.pixels();
    let stride = SAMPLE_STRIDE_PIXELS * BYTES_PER_PIXEL;

    let mut total = 0.0f64;
    let mut count = 0usize;
    let mut i = 0;
    while i + 2 < data.len() {
        let r = data[i] as f64;
        let g = data[i + 1] as f64;
        let b = data[i + 2] as f64;
        total += r * 0.299 + g * 0.587 + b * 0.114;
        count += 1;
        i += stride;
    }

    (count > 0).then(|| total / count as f64)
}

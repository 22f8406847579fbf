//! Apparent-distance classification from candidate size.

use crate::capture::DistanceThresholds;

/// Classified apparent distance to the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Distance {
    TooFar,
    TooClose,
    Ideal,
    /// No subject to measure.
    #[default]
    Unknown,
}

/// Classifies apparent distance from the candidate's box height.
///
/// Ratio = box height / frame height. Height alone is the proxy so the
/// metric stays invariant to horizontal framing and cropping. Thresholds
/// are exclusive: a ratio exactly at a boundary resolves to
/// [`Distance::Ideal`].
pub fn classify_distance(
    box_height: f32,
    frame_height: u32,
    thresholds: &DistanceThresholds,
) -> Distance {
    if frame_height == 0 {
        return Distance::Unknown;
    }
    let ratio = box_height / frame_height as f32;

    if ratio < thresholds.min_ratio {
        Distance::TooFar
    } else if ratio > thresholds.max_ratio {
        Distance::TooClose
    } else {
        Distance::Ideal
    }
}

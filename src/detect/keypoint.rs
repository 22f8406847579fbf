//! Keypoint-to-box adapter.
//!
//! Anatomical models (pose estimators) report joint keypoints, not
//! bounding boxes. This adapter synthesizes a plausible subject box
//! around the confident keypoints so keypoint-based detectors satisfy
//! the same [`SubjectDetector`] interface as direct-box models.

use super::detector::{DetectError, SubjectDetector};
use super::{BoundingBox, Candidate};
use crate::capture::Frame;

/// A single detected anatomical keypoint in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Per-point confidence in [0, 1].
    pub confidence: f32,
}

/// Trait for models that report anatomical keypoints.
pub trait KeypointDetector {
    /// Detector identifier, for logs.
    fn name(&self) -> &'static str;

    /// Returns the keypoints relevant to the subject (e.g. both ankles
    /// for a foot subject), any confidence.
    fn keypoints(&mut self, frame: &Frame) -> Result<Vec<Keypoint>, DetectError>;
}

/// Box-synthesis parameters.
///
/// The box is grown from the extent of the confident keypoints: padded
/// horizontally by a multiple of the inter-keypoint separation and
/// extended by a larger multiple in the anatomically expected direction
/// (downward for a foot below its ankles).
#[derive(Debug, Clone)]
pub struct SynthesisParams {
    /// Per-point confidence floor.
    pub min_confidence: f32,
    /// Horizontal padding as a multiple of keypoint separation.
    pub horizontal_pad_factor: f32,
    /// Minimum absolute horizontal padding in pixels.
    pub min_horizontal_pad: f32,
    /// Downward extension as a multiple of keypoint separation.
    pub extension_factor: f32,
    /// Minimum absolute downward extension in pixels.
    pub min_extension: f32,
    /// Padding above the highest keypoint in pixels.
    pub top_pad: f32,
    /// Separation assumed when only one keypoint is confident.
    pub default_separation: f32,
    /// Minimum separation used in the padding math.
    pub min_separation: f32,
    /// Class label for the synthesized candidate.
    pub class_label: String,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            min_confidence: 0.3,
            horizontal_pad_factor: 0.4,
            min_horizontal_pad: 25.0,
            extension_factor: 2.0,
            min_extension: 100.0,
            top_pad: 10.0,
            default_separation: 60.0,
            min_separation: 40.0,
            class_label: "foot".to_string(),
        }
    }
}

/// Adapts a [`KeypointDetector`] to the [`SubjectDetector`] interface.
pub struct KeypointBoxAdapter<D> {
    inner: D,
    params: SynthesisParams,
}

impl<D: KeypointDetector> KeypointBoxAdapter<D> {
    /// Wraps a keypoint detector with default synthesis parameters.
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            params: SynthesisParams::default(),
        }
    }

    /// Wraps a keypoint detector with explicit synthesis parameters.
    pub fn with_params(inner: D, params: SynthesisParams) -> Self {
        Self { inner, params }
    }

    fn synthesize(&self, points: &[Keypoint], frame: &Frame) -> Option<Candidate> {
        if points.is_empty() {
            return None;
        }
        let p = &self.params;

        let min_x = points.iter().map(|k| k.x).fold(f32::INFINITY, f32::min);
        let max_x = points.iter().map(|k| k.x).fold(f32::NEG_INFINITY, f32::max);
        let min_y = points.iter().map(|k| k.y).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|k| k.y).fold(f32::NEG_INFINITY, f32::max);

        let separation = if points.len() > 1 {
            (max_x - min_x).max(p.min_separation)
        } else {
            p.default_separation
        };

        let horizontal_pad = (separation * p.horizontal_pad_factor).max(p.min_horizontal_pad);
        let extension = (separation * p.extension_factor).max(p.min_extension);

        // Confidence of the synthesized candidate is the weakest
        // contributing keypoint; the box is only as trustworthy as
        // the least certain joint anchoring it.
        let confidence = points
            .iter()
            .map(|k| k.confidence)
            .fold(f32::INFINITY, f32::min);

        let bbox = BoundingBox::new(
            min_x - horizontal_pad,
            min_y - p.top_pad,
            (max_x - min_x) + 2.0 * horizontal_pad,
            (max_y - min_y) + p.top_pad + extension,
        )
        .clipped(frame.width(), frame.height());

        Some(Candidate::new(bbox, p.class_label.clone(), confidence))
    }
}

impl<D: KeypointDetector> SubjectDetector for KeypointBoxAdapter<D> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<Candidate>, DetectError> {
        let keypoints = self.inner.keypoints(frame)?;
        let confident: Vec<Keypoint> = keypoints
            .into_iter()
            .filter(|k| k.confidence > self.params.min_confidence)
            .collect();

        Ok(self.synthesize(&confident, frame).into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedKeypoints(Vec<Keypoint>);

    impl KeypointDetector for FixedKeypoints {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn keypoints(&mut self, _frame: &Frame) -> Result<Vec<Keypoint>, DetectError> {
            Ok(self.0.clone())
        }
    }

    fn frame(w: u32, h: u32) -> Frame {
        use crate::capture::BYTES_PER_PIXEL;
        Frame::new(vec![0u8; (w * h) as usize * BYTES_PER_PIXEL], w, h, 0)
    }

    #[test]
    fn test_two_ankles_synthesize_box() {
        let mut adapter = KeypointBoxAdapter::new(FixedKeypoints(vec![
            Keypoint {
                x: 280.0,
                y: 200.0,
                confidence: 0.8,
            },
            Keypoint {
                x: 380.0,
                y: 210.0,
                confidence: 0.9,
            },
        ]));

        let candidates = adapter.detect(&frame(640, 480)).unwrap();
        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];

        // Separation 100: pad = 40, extension = 200
        assert!((c.bbox.x - 240.0).abs() < 1e-3);
        assert!((c.bbox.y - 190.0).abs() < 1e-3);
        assert!((c.bbox.width - 180.0).abs() < 1e-3);
        assert!((c.bbox.height - (10.0 + 10.0 + 200.0)).abs() < 1e-3);
        assert!((c.confidence - 0.8).abs() < 1e-6);
        assert_eq!(c.class_label, "foot");
    }

    #[test]
    fn test_single_ankle_uses_default_separation() {
        let mut adapter = KeypointBoxAdapter::new(FixedKeypoints(vec![Keypoint {
            x: 320.0,
            y: 200.0,
            confidence: 0.7,
        }]));

        let candidates = adapter.detect(&frame(640, 480)).unwrap();
        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];

        // Separation 60: pad = max(24, 25) = 25, extension = max(120, 100) = 120
        assert!((c.bbox.x - 295.0).abs() < 1e-3);
        assert!((c.bbox.width - 50.0).abs() < 1e-3);
        assert!((c.bbox.height - 130.0).abs() < 1e-3);
    }

    #[test]
    fn test_low_confidence_keypoints_filtered() {
        let mut adapter = KeypointBoxAdapter::new(FixedKeypoints(vec![
            Keypoint {
                x: 280.0,
                y: 200.0,
                confidence: 0.2,
            },
            Keypoint {
                x: 380.0,
                y: 210.0,
                confidence: 0.1,
            },
        ]));

        assert!(adapter.detect(&frame(640, 480)).unwrap().is_empty());
    }

    #[test]
    fn test_box_clipped_to_frame() {
        // Ankle near the bottom edge: the downward extension must clip
        let mut adapter = KeypointBoxAdapter::new(FixedKeypoints(vec![Keypoint {
            x: 320.0,
            y: 450.0,
            confidence: 0.9,
        }]));

        let candidates = adapter.detect(&frame(640, 480)).unwrap();
        let c = &candidates[0];
        assert!(c.bbox.y + c.bbox.height <= 480.0);
    }
}

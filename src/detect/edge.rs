//! Edge-density fallback detector.
//!
//! A non-ML heuristic used when the primary model is unavailable or
//! low-confidence. Sharp-edged rectangular objects stand out against
//! soft organic backgrounds: their outline produces a cluster of
//! high-gradient pixels whose bounding extent approximates the object.

use super::detector::{DetectError, SubjectDetector};
use super::{BoundingBox, Candidate};
use crate::capture::Frame;

/// Tuning parameters for the edge-density heuristic.
#[derive(Debug, Clone)]
pub struct EdgeParams {
    /// Per-channel gradient sum above which a pixel counts as an edge.
    pub edge_threshold: u32,
    /// Sampling stride in pixels, both axes.
    pub stride: u32,
    /// Minimum number of edge pixels before a candidate is formed.
    pub min_edge_pixels: usize,
    /// Accepted aspect-ratio band for the bounding extent.
    pub min_aspect: f32,
    pub max_aspect: f32,
    /// Minimum extent in pixels, each dimension.
    pub min_dimension: f32,
    /// Maximum extent as a fraction of the frame, each dimension.
    pub max_frame_fraction: f32,
    /// Fixed confidence assigned to the synthesized candidate.
    pub confidence: f32,
    /// Class label assigned to the synthesized candidate.
    pub class_label: String,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            edge_threshold: 100,
            stride: 4,
            min_edge_pixels: 30,
            min_aspect: 0.4,
            max_aspect: 2.2,
            min_dimension: 40.0,
            max_frame_fraction: 0.8,
            confidence: 0.7,
            class_label: "edge-region".to_string(),
        }
    }
}

/// Pixel-gradient fallback detector.
#[derive(Debug)]
pub struct EdgeDetector {
    params: EdgeParams,
}

impl EdgeDetector {
    /// Creates a detector with the given parameters. Strides below 1
    /// are clamped to 1 so the scan always advances.
    pub fn new(mut params: EdgeParams) -> Self {
        params.stride = params.stride.max(1);
        Self { params }
    }

    /// Sum of absolute channel differences against the right and below
    /// neighbors one stride away. Comparing at the stride distance keeps
    /// boundaries visible to the sparse sampling grid: any edge crossing
    /// between two sampled columns or rows registers on the nearer one.
    fn edge_strength(frame: &Frame, x: u32, y: u32, stride: u32) -> Option<u32> {
        let (r, g, b) = frame.rgb_at(x, y)?;
        let (rr, rg, rb) = frame.rgb_at(x + stride, y)?;
        let (br, bg, bb) = frame.rgb_at(x, y + stride)?;

        let horiz = r.abs_diff(rr) as u32 + g.abs_diff(rg) as u32 + b.abs_diff(rb) as u32;
        let vert = r.abs_diff(br) as u32 + g.abs_diff(bg) as u32 + b.abs_diff(bb) as u32;
        Some(horiz + vert)
    }
}

impl SubjectDetector for EdgeDetector {
    fn name(&self) -> &'static str {
        "edge-density"
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<Candidate>, DetectError> {
        let p = &self.params;
        let (width, height) = (frame.width(), frame.height());
        if width < 2 || height < 2 {
            return Ok(Vec::new());
        }

        let mut min_x = u32::MAX;
        let mut max_x = 0u32;
        let mut min_y = u32::MAX;
        let mut max_y = 0u32;
        let mut edge_pixels = 0usize;

        let mut y = 0;
        while y + p.stride < height {
            let mut x = 0;
            while x + p.stride < width {
                if let Some(strength) = Self::edge_strength(frame, x, y, p.stride) {
                    if strength > p.edge_threshold {
                        edge_pixels += 1;
                        min_x = min_x.min(x);
                        max_x = max_x.max(x);
                        min_y = min_y.min(y);
                        max_y = max_y.max(y);
                    }
                }
                x += p.stride;
            }
            y += p.stride;
        }

        if edge_pixels < p.min_edge_pixels {
            return Ok(Vec::new());
        }

        let bbox = BoundingBox::new(
            min_x as f32,
            min_y as f32,
            (max_x - min_x) as f32,
            (max_y - min_y) as f32,
        );

        let aspect = bbox.aspect_ratio();
        if aspect < p.min_aspect || aspect > p.max_aspect {
            tracing::trace!(aspect, "edge extent rejected: implausible aspect");
            return Ok(Vec::new());
        }
        if bbox.width < p.min_dimension || bbox.height < p.min_dimension {
            return Ok(Vec::new());
        }
        if bbox.width > width as f32 * p.max_frame_fraction
            || bbox.height > height as f32 * p.max_frame_fraction
        {
            return Ok(Vec::new());
        }

        Ok(vec![Candidate::new(
            bbox,
            p.class_label.clone(),
            p.confidence,
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CameraSource, CaptureConfig, MockCamera, MockRect};

    fn frame_with_rect(rect: MockRect, w: u32, h: u32) -> Frame {
        let mut camera = MockCamera::new(60).with_rect(rect);
        camera.open(&CaptureConfig::with_dimensions(w, h)).unwrap();
        camera.capture().unwrap()
    }

    fn detect(frame: &Frame) -> Vec<Candidate> {
        EdgeDetector::new(EdgeParams::default()).detect(frame).unwrap()
    }

    #[test]
    fn test_uniform_frame_no_candidates() {
        let mut camera = MockCamera::new(128);
        camera
            .open(&CaptureConfig::with_dimensions(320, 240))
            .unwrap();
        let frame = camera.capture().unwrap();
        assert!(detect(&frame).is_empty());
    }

    #[test]
    fn test_rectangle_detected() {
        let frame = frame_with_rect(
            MockRect {
                x: 100,
                y: 80,
                width: 120,
                height: 100,
                brightness: 230,
            },
            640,
            480,
        );
        let candidates = detect(&frame);
        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.confidence, 0.7);
        // Bounding extent tracks the rectangle outline within a stride
        assert!((c.bbox.x - 100.0).abs() <= 8.0, "x = {}", c.bbox.x);
        assert!((c.bbox.width - 120.0).abs() <= 12.0, "w = {}", c.bbox.width);
    }

    #[test]
    fn test_zero_stride_clamped() {
        let mut params = EdgeParams::default();
        params.stride = 0;
        let mut detector = EdgeDetector::new(params);

        // Scan terminates and behaves as stride 1
        let frame = frame_with_rect(
            MockRect {
                x: 10,
                y: 10,
                width: 60,
                height: 60,
                brightness: 230,
            },
            160,
            120,
        );
        let candidates = detector.detect(&frame).unwrap();
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_tiny_region_rejected() {
        let frame = frame_with_rect(
            MockRect {
                x: 100,
                y: 100,
                width: 16,
                height: 16,
                brightness: 230,
            },
            640,
            480,
        );
        assert!(detect(&frame).is_empty());
    }

    #[test]
    fn test_oversized_region_rejected() {
        // Covers >80% of the frame in both dimensions
        let frame = frame_with_rect(
            MockRect {
                x: 10,
                y: 10,
                width: 610,
                height: 450,
                brightness: 230,
            },
            640,
            480,
        );
        assert!(detect(&frame).is_empty());
    }

    #[test]
    fn test_extreme_aspect_rejected() {
        // A thin horizontal strip: aspect far above 2.2
        let frame = frame_with_rect(
            MockRect {
                x: 60,
                y: 200,
                width: 400,
                height: 60,
                brightness: 230,
            },
            640,
            480,
        );
        assert!(detect(&frame).is_empty());
    }
}

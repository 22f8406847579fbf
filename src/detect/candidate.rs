//! Detection candidate types.

/// Axis-aligned bounding region in the coordinate space of the frame
/// that produced it. Never reuse a box against a frame with different
/// dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// Creates a new bounding box.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Width / height.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0.0 {
            return 0.0;
        }
        self.width / self.height
    }

    /// Box area as a fraction of the frame area.
    pub fn area_ratio(&self, frame_width: u32, frame_height: u32) -> f32 {
        let frame_area = (frame_width as f32) * (frame_height as f32);
        if frame_area == 0.0 {
            return 0.0;
        }
        (self.width * self.height) / frame_area
    }

    /// Center point of the box.
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Clips the box to the frame bounds.
    pub fn clipped(&self, frame_width: u32, frame_height: u32) -> Self {
        let x0 = self.x.max(0.0);
        let y0 = self.y.max(0.0);
        let x1 = (self.x + self.width).min(frame_width as f32);
        let y1 = (self.y + self.height).min(frame_height as f32);
        Self {
            x: x0,
            y: y0,
            width: (x1 - x0).max(0.0),
            height: (y1 - y0).max(0.0),
        }
    }

    /// Box expressed as percentages of the frame, for host overlays.
    pub fn normalized(&self, frame_width: u32, frame_height: u32) -> Option<NormalizedBox> {
        if frame_width == 0 || frame_height == 0 {
            return None;
        }
        let (w, h) = (frame_width as f32, frame_height as f32);
        Some(NormalizedBox {
            left_pct: self.x / w * 100.0,
            top_pct: self.y / h * 100.0,
            width_pct: self.width / w * 100.0,
            height_pct: self.height / h * 100.0,
        })
    }
}

/// Bounding box in percent-of-frame units, for positioning an overlay
/// element regardless of the rendered viewport size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub left_pct: f32,
    pub top_pct: f32,
    pub width_pct: f32,
    pub height_pct: f32,
}

/// A detected region hypothesized to contain the subject.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub bbox: BoundingBox,
    pub class_label: String,
    /// Detector confidence in [0, 1].
    pub confidence: f32,
}

impl Candidate {
    /// Creates a candidate with the given box, label and confidence.
    pub fn new(bbox: BoundingBox, class_label: impl Into<String>, confidence: f32) -> Self {
        Self {
            bbox,
            class_label: class_label.into(),
            confidence,
        }
    }
}

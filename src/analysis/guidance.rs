//! Directional positioning guidance.

use crate::detect::BoundingBox;

/// Which side(s) of frame center the subject currently sits on; the
/// host renders the corresponding move-toward-center hint.
///
/// The booleans are independent, not mutually exclusive: a subject can
/// be simultaneously left of and below center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositionGuidance {
    /// Subject center is left of frame center.
    pub left: bool,
    /// Subject center is right of frame center.
    pub right: bool,
    /// Subject center is above frame center.
    pub up: bool,
    /// Subject center is below frame center.
    pub down: bool,
}

impl PositionGuidance {
    /// True when no correction is needed.
    pub fn centered(&self) -> bool {
        !(self.left || self.right || self.up || self.down)
    }
}

/// Dead-zone radius as a fraction of the smaller frame dimension.
/// Inside it no direction is flagged, so guidance does not flicker
/// when the subject is already acceptably centered.
const DEAD_ZONE_FRACTION: f32 = 0.10;

/// Computes the directional offset between the candidate center and
/// the frame center.
pub fn guide(bbox: &BoundingBox, frame_width: u32, frame_height: u32) -> PositionGuidance {
    if frame_width == 0 || frame_height == 0 {
        return PositionGuidance::default();
    }

    let (cx, cy) = bbox.center();
    let target_x = frame_width as f32 / 2.0;
    let target_y = frame_height as f32 / 2.0;
    let dead_zone = (frame_width.min(frame_height) as f32) * DEAD_ZONE_FRACTION;

    let dx = cx - target_x;
    let dy = cy - target_y;

    PositionGuidance {
        left: dx < -dead_zone,
        right: dx > dead_zone,
        up: dy < -dead_zone,
        down: dy > dead_zone,
    }
}

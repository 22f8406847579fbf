//! Per-frame analysis: lighting, distance, positioning, readiness.
//!
//! Everything in this module is a pure function of its inputs. State
//! lives in the session; the analysis layer only classifies.

mod distance;
mod guidance;
mod lighting;
mod readiness;

pub use distance::{classify_distance, Distance};
pub use guidance::{guide, PositionGuidance};
pub use lighting::{average_brightness, classify_brightness, classify_lighting, Lighting};
pub use readiness::{DetectionStatus, StatusTier};

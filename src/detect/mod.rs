//! Subject detection: candidate types, detector strategies, evaluation.
//!
//! Two interchangeable strategies compose with fallback in
//! [`DetectorStack`]: a primary model (any [`SubjectDetector`], with
//! keypoint models adapted through [`KeypointBoxAdapter`]) and the
//! pixel-level [`EdgeDetector`] heuristic. The [`evaluate`] step never
//! needs to know which strategy produced a candidate.

mod candidate;
mod detector;
mod edge;
mod evaluate;
mod keypoint;

pub use candidate::{BoundingBox, Candidate, NormalizedBox};
pub use detector::{
    DetectError, DetectionSource, DetectorStack, NullDetector, ScriptedDetector, SubjectDetector,
    PRIMARY_CONFIDENCE_FLOOR,
};
pub use edge::{EdgeDetector, EdgeParams};
pub use evaluate::{evaluate, Band, ScoredCandidate, SubjectProfile};
pub use keypoint::{Keypoint, KeypointBoxAdapter, KeypointDetector, SynthesisParams};

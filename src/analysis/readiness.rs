//! Signal fusion: the readiness gate and its status messages.
//!
//! The detection loop replaces the whole [`DetectionStatus`] snapshot
//! each cycle; nothing merges into a previous value. Consumers compare
//! old and new snapshots themselves if they need to animate changes.

use super::{Distance, Lighting};
use crate::detect::BoundingBox;

/// Immutable per-cycle detection snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionStatus {
    /// Whether a plausible subject was found this cycle.
    pub subject_present: bool,
    /// Apparent distance classification.
    pub distance: Distance,
    /// Ambient lighting classification.
    pub lighting: Lighting,
    /// Best candidate's box, in current-frame coordinates.
    pub bounding_box: Option<BoundingBox>,
}

/// Coarse tier for the host's status colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTier {
    /// No subject found yet.
    Searching,
    /// Subject found, corrections needed.
    Adjusting,
    /// All conditions met.
    Ready,
}

impl DetectionStatus {
    /// The single boolean the capture control checks.
    ///
    /// True iff the subject is present AND distance is ideal AND
    /// lighting is ideal. All three are required; no partial credit.
    pub fn is_ready(&self) -> bool {
        self.subject_present
            && self.distance == Distance::Ideal
            && self.lighting == Lighting::Ideal
    }

    /// Prioritized human-readable status message.
    ///
    /// Priority order is fixed and deterministic: missing subject wins
    /// outright; otherwise distance correction precedes lighting
    /// correction; all-clear yields a single affirmative.
    pub fn status_message(&self) -> String {
        if !self.subject_present {
            return "Place the subject in the frame".to_string();
        }

        let mut issues: Vec<&str> = Vec::new();
        match self.distance {
            Distance::TooFar => issues.push("Move closer"),
            Distance::TooClose => issues.push("Move farther"),
            Distance::Ideal | Distance::Unknown => {}
        }
        match self.lighting {
            Lighting::TooDark => issues.push("Find brighter lighting"),
            Lighting::TooBright => issues.push("Reduce lighting"),
            Lighting::Ideal | Lighting::Unknown => {}
        }

        if issues.is_empty() {
            "Good position - ready".to_string()
        } else {
            issues.join(" / ")
        }
    }

    /// Status tier for the host overlay.
    pub fn tier(&self) -> StatusTier {
        if !self.subject_present {
            StatusTier::Searching
        } else if self.is_ready() {
            StatusTier::Ready
        } else {
            StatusTier::Adjusting
        }
    }
}

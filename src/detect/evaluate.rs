//! Candidate evaluation against a subject profile.
//!
//! The profile describes the physical subject being photographed: its
//! plausible shape and size relative to the frame, and the class label
//! the primary model uses for it. Profiles are injectable so the same
//! evaluator serves an anatomical subject and a handheld calibration
//! object without code changes.

use serde::{Deserialize, Serialize};

use super::Candidate;

/// Inclusive band of acceptable values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Band {
    pub min: f32,
    pub max: f32,
}

impl Band {
    /// Creates a band.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// True when the value falls inside the band.
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Shape and size heuristics for the expected subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectProfile {
    /// Class label the primary model assigns to this subject.
    pub target_class: String,
    /// Hard filter: candidates outside this aspect band are rejected.
    pub aspect_band: Band,
    /// Soft boost: aspect ratios in this narrower band score higher.
    pub ideal_aspect_band: Band,
    /// Hard filter: candidates outside this frame-area-ratio band are
    /// rejected.
    pub area_band: Band,
    /// Soft boost: area ratios in this band score higher.
    pub ideal_area_band: Band,
    /// Multiplier applied for an ideal aspect ratio.
    pub aspect_boost: f32,
    /// Multiplier applied for an ideal area ratio.
    pub area_boost: f32,
    /// Multiplier applied for a direct class-label match.
    pub class_boost: f32,
}

impl SubjectProfile {
    /// Profile tuned for an anatomical foot/ankle subject.
    ///
    /// Feet photographed from arbitrary angles produce tall or squat
    /// boxes, so the hard bands are generous.
    pub fn foot() -> Self {
        Self {
            target_class: "foot".to_string(),
            aspect_band: Band::new(0.3, 3.0),
            ideal_aspect_band: Band::new(0.5, 1.5),
            area_band: Band::new(0.01, 0.6),
            ideal_area_band: Band::new(0.03, 0.25),
            aspect_boost: 1.5,
            area_boost: 1.3,
            class_boost: 2.0,
        }
    }

    /// Profile tuned for a rectangular handheld object (e.g. a
    /// reference card held next to the wound).
    pub fn handheld_object() -> Self {
        Self {
            target_class: "edge-region".to_string(),
            aspect_band: Band::new(0.4, 2.2),
            ideal_aspect_band: Band::new(0.6, 1.8),
            area_band: Band::new(0.01, 0.5),
            ideal_area_band: Band::new(0.03, 0.25),
            aspect_boost: 1.5,
            area_boost: 1.3,
            class_boost: 2.0,
        }
    }
}

impl Default for SubjectProfile {
    fn default() -> Self {
        Self::foot()
    }
}

/// A candidate together with its evaluation score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: f32,
}

/// Picks the best candidate for the subject, or `None` when no
/// candidate survives the hard filters.
///
/// Scoring starts from the detector confidence and applies
/// multiplicative boosts for ideal shape, ideal size, and a matching
/// class label. Ties break in favour of the first-seen candidate.
pub fn evaluate(
    candidates: &[Candidate],
    frame_width: u32,
    frame_height: u32,
    profile: &SubjectProfile,
) -> Option<ScoredCandidate> {
    let mut best: Option<ScoredCandidate> = None;

    for candidate in candidates {
        let aspect = candidate.bbox.aspect_ratio();
        let area = candidate.bbox.area_ratio(frame_width, frame_height);

        // Hard filters, not soft penalties
        if !profile.aspect_band.contains(aspect) {
            tracing::trace!(aspect, "candidate rejected: aspect outside band");
            continue;
        }
        if !profile.area_band.contains(area) {
            tracing::trace!(area, "candidate rejected: area outside band");
            continue;
        }

        let mut score = candidate.confidence;
        if profile.ideal_aspect_band.contains(aspect) {
            score *= profile.aspect_boost;
        }
        if profile.ideal_area_band.contains(area) {
            score *= profile.area_boost;
        }
        if candidate.class_label == profile.target_class {
            score *= profile.class_boost;
        }

        // Strictly-greater keeps ties stable on first-seen order
        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(ScoredCandidate {
                candidate: candidate.clone(),
                score,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::BoundingBox;
    use proptest::prelude::*;

    fn candidate(w: f32, h: f32, label: &str, confidence: f32) -> Candidate {
        Candidate::new(BoundingBox::new(100.0, 100.0, w, h), label, confidence)
    }

    #[test]
    fn test_empty_candidates() {
        assert!(evaluate(&[], 640, 480, &SubjectProfile::foot()).is_none());
    }

    #[test]
    fn test_hard_aspect_filter() {
        // Aspect 5.0 is outside the foot band regardless of confidence
        let c = candidate(250.0, 50.0, "foot", 1.0);
        assert!(evaluate(&[c], 640, 480, &SubjectProfile::foot()).is_none());
    }

    #[test]
    fn test_hard_area_filter() {
        // 10x10 in a 640x480 frame: area ratio ~0.0003, below the band
        let c = candidate(10.0, 10.0, "foot", 1.0);
        assert!(evaluate(&[c], 640, 480, &SubjectProfile::foot()).is_none());
    }

    #[test]
    fn test_boosts_compound() {
        // Aspect 0.8 (ideal), area 160*200/307200 ≈ 0.104 (ideal), class match
        let c = candidate(160.0, 200.0, "foot", 0.5);
        let scored = evaluate(&[c], 640, 480, &SubjectProfile::foot()).unwrap();
        let expected = 0.5 * 1.5 * 1.3 * 2.0;
        assert!((scored.score - expected).abs() < 1e-5);
    }

    #[test]
    fn test_class_match_outranks_confidence() {
        let off_class = candidate(160.0, 200.0, "other", 0.9);
        let on_class = candidate(160.0, 200.0, "foot", 0.6);
        let scored = evaluate(
            &[off_class, on_class],
            640,
            480,
            &SubjectProfile::foot(),
        )
        .unwrap();
        assert_eq!(scored.candidate.class_label, "foot");
    }

    #[test]
    fn test_tie_breaks_first_seen() {
        let first = candidate(160.0, 200.0, "foot", 0.5);
        let second = candidate(160.0, 200.0, "foot", 0.5);
        let scored = evaluate(
            &[first.clone(), second],
            640,
            480,
            &SubjectProfile::foot(),
        )
        .unwrap();
        assert_eq!(scored.candidate, first);
    }

    proptest! {
        /// The evaluator never returns a candidate whose aspect or area
        /// ratio falls outside the hard bands, regardless of confidence.
        #[test]
        fn prop_hard_bands_enforced(
            w in 1.0f32..640.0,
            h in 1.0f32..480.0,
            confidence in 0.0f32..=1.0,
        ) {
            let profile = SubjectProfile::foot();
            let c = candidate(w, h, "foot", confidence);
            if let Some(scored) = evaluate(&[c], 640, 480, &profile) {
                let aspect = scored.candidate.bbox.aspect_ratio();
                let area = scored.candidate.bbox.area_ratio(640, 480);
                prop_assert!(profile.aspect_band.contains(aspect));
                prop_assert!(profile.area_band.contains(area));
            }
        }
    }
}

//! Subject detector trait and the primary/fallback stack.

use thiserror::Error;

use super::edge::{EdgeDetector, EdgeParams};
use super::Candidate;
use crate::capture::Frame;

/// Errors a detector implementation may report.
///
/// These never escape [`DetectorStack::run`]: a transient inference
/// error is indistinguishable from "subject not found yet" as far as
/// the guidance loop is concerned.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("detection model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Trait for subject detector implementations.
///
/// Implementations return zero or more candidate regions per frame and
/// must tolerate the subject appearing from any angle. Keypoint-based
/// models adapt through [`super::KeypointBoxAdapter`] so the evaluator
/// never needs to know which strategy produced a candidate.
pub trait SubjectDetector {
    /// Detector identifier, for logs.
    fn name(&self) -> &'static str;

    /// Runs detection on a frame.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Candidate>, DetectError>;
}

/// Tagged result of the primary/fallback chain, so the behavior per
/// source stays traceable and testable independently of the fusion.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionSource {
    /// Candidates from the primary model.
    Primary(Vec<Candidate>),
    /// Candidates from the edge-density heuristic.
    Fallback(Vec<Candidate>),
    /// Neither strategy found anything usable.
    None,
}

impl DetectionSource {
    /// The candidates regardless of which strategy produced them.
    pub fn candidates(&self) -> &[Candidate] {
        match self {
            DetectionSource::Primary(c) | DetectionSource::Fallback(c) => c,
            DetectionSource::None => &[],
        }
    }
}

/// Confidence floor below which primary candidates do not count and
/// the fallback heuristic is consulted instead.
pub const PRIMARY_CONFIDENCE_FLOOR: f32 = 0.3;

/// Composes a primary detector with the edge-density fallback.
pub struct DetectorStack {
    primary: Box<dyn SubjectDetector>,
    fallback: EdgeDetector,
    confidence_floor: f32,
}

impl DetectorStack {
    /// Creates a stack with the default confidence floor and fallback
    /// parameters.
    pub fn new(primary: Box<dyn SubjectDetector>) -> Self {
        Self {
            primary,
            fallback: EdgeDetector::new(EdgeParams::default()),
            confidence_floor: PRIMARY_CONFIDENCE_FLOOR,
        }
    }

    /// Overrides the fallback heuristic parameters.
    pub fn with_fallback_params(mut self, params: EdgeParams) -> Self {
        self.fallback = EdgeDetector::new(params);
        self
    }

    /// Runs the chain on one frame.
    ///
    /// The fallback runs when the primary errors, returns nothing, or
    /// returns only candidates below the confidence floor. Errors are
    /// absorbed here; a transient model failure never crashes the loop.
    pub fn run(&mut self, frame: &Frame) -> DetectionSource {
        let primary = match self.primary.detect(frame) {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::debug!(detector = self.primary.name(), error = %e, "primary detector failed");
                Vec::new()
            }
        };

        let confident: Vec<Candidate> = primary
            .into_iter()
            .filter(|c| c.confidence >= self.confidence_floor)
            .collect();

        if !confident.is_empty() {
            return DetectionSource::Primary(confident);
        }

        match self.fallback.detect(frame) {
            Ok(candidates) if !candidates.is_empty() => DetectionSource::Fallback(candidates),
            Ok(_) => DetectionSource::None,
            Err(e) => {
                tracing::debug!(error = %e, "fallback detector failed");
                DetectionSource::None
            }
        }
    }
}

/// Detector that always returns no candidates. Stands in for a primary
/// model in tests and in degraded demo runs.
#[derive(Debug, Default)]
pub struct NullDetector;

impl SubjectDetector for NullDetector {
    fn name(&self) -> &'static str {
        "null"
    }

    fn detect(&mut self, _frame: &Frame) -> Result<Vec<Candidate>, DetectError> {
        Ok(Vec::new())
    }
}

/// Detector returning a scripted sequence of results, for tests.
pub struct ScriptedDetector {
    name: &'static str,
    script: Vec<Result<Vec<Candidate>, DetectError>>,
}

impl ScriptedDetector {
    /// Creates a detector that replays the given results in order,
    /// then returns empty once the script is exhausted.
    pub fn new(script: Vec<Result<Vec<Candidate>, DetectError>>) -> Self {
        Self {
            name: "scripted",
            script,
        }
    }
}

impl SubjectDetector for ScriptedDetector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn detect(&mut self, _frame: &Frame) -> Result<Vec<Candidate>, DetectError> {
        if self.script.is_empty() {
            Ok(Vec::new())
        } else {
            self.script.remove(0)
        }
    }
}

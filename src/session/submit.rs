//! Submission to the external analysis/storage collaborator.
//!
//! The service is opaque to the engine: it receives the encoded image
//! and the user's notes, and either returns an artifact identifier or
//! an error message the user can act on.

use thiserror::Error;

/// Identifier of a successfully stored capture artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactId(String);

impl ArtifactId {
    /// Wraps a service-issued identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors surfaced by the analysis/storage collaborator.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("submission failed: {0}")]
    Service(String),
    #[error("a submission is already in flight")]
    InFlight,
}

/// Contract for the analysis/storage service.
pub trait AnalysisService {
    /// Submits the encoded image and notes, returning the stored
    /// artifact's identifier.
    fn submit(&mut self, image: &[u8], notes: &str) -> Result<ArtifactId, SubmitError>;
}

/// Scripted service for tests and the demo binary.
pub struct MockAnalysisService {
    script: Vec<Result<ArtifactId, SubmitError>>,
    pub calls: usize,
}

impl MockAnalysisService {
    /// Always succeeds with sequentially numbered identifiers.
    pub fn accepting() -> Self {
        Self {
            script: Vec::new(),
            calls: 0,
        }
    }

    /// Replays the given results in order, then succeeds.
    pub fn scripted(script: Vec<Result<ArtifactId, SubmitError>>) -> Self {
        Self { script, calls: 0 }
    }
}

impl AnalysisService for MockAnalysisService {
    fn submit(&mut self, _image: &[u8], _notes: &str) -> Result<ArtifactId, SubmitError> {
        self.calls += 1;
        if self.script.is_empty() {
            Ok(ArtifactId::new(format!("artifact-{}", self.calls)))
        } else {
            self.script.remove(0)
        }
    }
}

//! Capture session orchestration.
//!
//! The session owns the camera as a scoped resource and advances only
//! on explicit user action or detection-driven enablement. The host
//! drives [`CaptureSession::run_tick`] on a fixed cadence while the
//! camera step is active.

mod state;
mod submit;

pub use state::{
    CaptureSession, CaptureStep, ModelState, SessionError, SubmitRequest, TickOutcome, TickResult,
    TickSkip,
};
pub use submit::{AnalysisService, ArtifactId, MockAnalysisService, SubmitError};

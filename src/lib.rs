//! Capture Guidance Library
//!
//! A real-time capture-guidance engine for wound photo documentation.
//! Continuously analyzes a live camera feed, decides whether the
//! subject is correctly framed (present, at ideal distance, under
//! acceptable lighting), and drives a deterministic ready-to-capture
//! vs. corrective-guidance response.
//!
//! # Architecture
//!
//! The system follows an explicit per-tick data flow:
//!
//! ```text
//! capture → detect → evaluate → analysis (distance/lighting/guidance)
//!                                   ↓
//!                            readiness gate → session state machine
//! ```
//!
//! # Design Principles
//!
//! - **Conservative gating**: capture stays disabled unless presence,
//!   distance and lighting are all confirmed
//! - **Graceful degradation**: a failed model load disables guidance,
//!   never the session; per-frame detector errors are absorbed
//! - **Snapshot semantics**: each tick replaces the detection status
//!   wholesale; stale results are discarded by sequence stamp
//! - **Scoped camera**: acquisition and release are paired on every
//!   exit path, including teardown
//!
//! # Example
//!
//! ```no_run
//! use capture_guidance::{
//!     capture::{FileConfig, MockCamera},
//!     detect::{DetectorStack, NullDetector, SubjectProfile},
//!     session::{CaptureSession, MockAnalysisService, TickOutcome},
//! };
//!
//! let camera = MockCamera::new(128);
//! let mut session = CaptureSession::new(
//!     Box::new(camera),
//!     FileConfig::default(),
//!     SubjectProfile::foot(),
//! );
//!
//! // Model load completes; the detection loop may run
//! session.model_loaded(DetectorStack::new(Box::new(NullDetector)));
//!
//! // Host timer fires every 500ms while in the camera step
//! for _ in 0..10 {
//!     session.run_tick();
//!     println!("{}", session.status().status_message());
//!     if session.capture_enabled() {
//!         session.capture_photo().unwrap();
//!         break;
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod capture;
pub mod detect;
pub mod session;

// Re-export commonly used types at crate root
pub use analysis::{DetectionStatus, Distance, Lighting, PositionGuidance, StatusTier};
pub use capture::{CameraSource, CaptureConfig, FileConfig, Frame, FrameSampler, MockCamera};
pub use detect::{
    BoundingBox, Candidate, DetectionSource, DetectorStack, SubjectDetector, SubjectProfile,
};
pub use session::{AnalysisService, CaptureSession, CaptureStep, ModelState};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Capture session state machine.
//!
//! Orchestrates the camera lifecycle, the periodic detection loop, the
//! capture action, review/annotate, submission and success. The camera
//! is a scoped resource: it is released on every exit from the camera
//! step, including teardown.

use thiserror::Error;

use crate::analysis::{
    classify_distance, classify_lighting, guide, DetectionStatus, Distance, PositionGuidance,
};
use crate::capture::{
    CameraError, CameraSource, FileConfig, Frame, FrameSampler, BYTES_PER_PIXEL,
};
use crate::detect::{evaluate, DetectionSource, DetectorStack, SubjectProfile};

use super::submit::{AnalysisService, ArtifactId, SubmitError};

/// Steps of the capture flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStep {
    /// Live camera with the detection loop running.
    Camera,
    /// Frozen image review with free-text notes.
    Preview,
    /// Final review before submission.
    Confirm,
    /// Artifact stored; terminal for this capture.
    Success,
}

/// Detector model lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModelState {
    /// One-time asynchronous load still pending; capture disabled.
    #[default]
    Loading,
    /// Model ready; the detection loop may run.
    Ready,
    /// Load failed; auto-guidance disabled, capture stays disabled.
    /// Readiness can never be established without detection.
    Degraded(String),
}

/// Why a detection tick did not produce a status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickSkip {
    /// Session is not in the camera step.
    WrongStep,
    /// Camera is not open (error or released).
    CameraClosed,
    /// Detector model not loaded or degraded.
    ModelNotReady,
    /// Source has not produced a readable frame.
    FrameNotReady,
    /// Result was older than the last applied one.
    Stale,
}

/// Outcome of one detection tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A fresh snapshot was applied.
    Applied,
    /// The tick was skipped; no state changed.
    Skipped(TickSkip),
}

/// Errors from session actions.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("action '{action}' is invalid in step {from:?}")]
    InvalidTransition {
        from: CaptureStep,
        action: &'static str,
    },
    #[error("capture is not enabled (subject not positioned)")]
    NotPositioned,
    #[error("detection model is not ready")]
    ModelNotReady,
    #[error("camera error: {0}")]
    Camera(#[from] CameraError),
    #[error("image encoding failed: {0}")]
    Encode(String),
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// Top-level state container for one capture flow.
///
/// Created when the capture view mounts; mutated exclusively by user
/// actions and tick callbacks; releases the camera on drop.
pub struct CaptureSession {
    step: CaptureStep,
    camera: Box<dyn CameraSource>,
    config: FileConfig,
    profile: SubjectProfile,
    model_state: ModelState,
    detector: Option<DetectorStack>,
    sampler: FrameSampler,
    status: DetectionStatus,
    /// Dimensions of the frame the current status was computed from.
    status_frame: (u32, u32),
    last_applied_sequence: u64,
    captured_image: Option<Vec<u8>>,
    notes: String,
    artifact_id: Option<ArtifactId>,
    last_error: Option<String>,
    camera_error: Option<String>,
    submit_in_flight: bool,
}

/// Payload of an outstanding submission, handed to the host so the
/// service call can run without borrowing the session. The session
/// counts the submission as in flight until the outcome comes back
/// through [`CaptureSession::apply_submit_result`].
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    /// Encoded JPEG to upload.
    pub image: Vec<u8>,
    /// Free-text notes accompanying the image.
    pub notes: String,
}

/// Result of one detection cycle, stamped with the frame sequence so a
/// late-arriving result from a stale tick cannot overwrite a newer one.
#[derive(Debug, Clone)]
pub struct TickResult {
    pub sequence: u64,
    pub status: DetectionStatus,
    pub source: DetectionSource,
    /// Dimensions of the frame this result was computed from; the
    /// bounding box only makes sense against these.
    pub frame_width: u32,
    pub frame_height: u32,
}

impl CaptureSession {
    /// Creates a session in the camera step and acquires the camera.
    ///
    /// A camera acquisition failure is recorded, not propagated: the
    /// session stays usable and the user can retry.
    pub fn new(
        mut camera: Box<dyn CameraSource>,
        config: FileConfig,
        profile: SubjectProfile,
    ) -> Self {
        let camera_error = match camera.open(&config.capture) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(error = %e, "camera acquisition failed");
                Some(e.to_string())
            }
        };
        let initial_dims = (config.capture.width, config.capture.height);
        Self {
            step: CaptureStep::Camera,
            camera,
            config,
            profile,
            model_state: ModelState::Loading,
            detector: None,
            sampler: FrameSampler::new(),
            status: DetectionStatus::default(),
            status_frame: initial_dims,
            last_applied_sequence: 0,
            captured_image: None,
            notes: String::new(),
            artifact_id: None,
            last_error: None,
            camera_error,
            submit_in_flight: false,
        }
    }

    // ---- accessors ----

    /// Current step.
    pub fn step(&self) -> CaptureStep {
        self.step
    }

    /// Latest detection snapshot.
    pub fn status(&self) -> &DetectionStatus {
        &self.status
    }

    /// Positioning correction for the latest snapshot's bounding box.
    pub fn guidance(&self) -> PositionGuidance {
        match &self.status.bounding_box {
            Some(bbox) => guide(bbox, self.status_frame.0, self.status_frame.1),
            None => PositionGuidance::default(),
        }
    }

    /// Detector model state.
    pub fn model_state(&self) -> &ModelState {
        &self.model_state
    }

    /// User-visible camera error, if any.
    pub fn camera_error(&self) -> Option<&str> {
        self.camera_error.as_deref()
    }

    /// Last user-visible submit error, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Encoded capture, present from preview through success.
    pub fn captured_image(&self) -> Option<&[u8]> {
        self.captured_image.as_deref()
    }

    /// Free-text notes.
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Stored artifact identifier, set only on success.
    pub fn artifact_id(&self) -> Option<&ArtifactId> {
        self.artifact_id.as_ref()
    }

    /// True while a submission is outstanding.
    pub fn submit_in_flight(&self) -> bool {
        self.submit_in_flight
    }

    /// Whether the capture control is enabled.
    ///
    /// Requires the camera step, a ready model, no camera error, and a
    /// currently-true readiness gate. Each condition disables capture
    /// independently.
    pub fn capture_enabled(&self) -> bool {
        self.step == CaptureStep::Camera
            && self.model_state == ModelState::Ready
            && self.camera_error.is_none()
            && self.status.is_ready()
    }

    // ---- model lifecycle ----

    /// Installs the loaded detector stack; enables the detection loop.
    pub fn model_loaded(&mut self, detector: DetectorStack) {
        self.detector = Some(detector);
        self.model_state = ModelState::Ready;
        tracing::info!("detection model ready");
    }

    /// Records a model load failure; the session degrades to
    /// no-auto-guidance mode rather than crashing.
    pub fn model_load_failed(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(%reason, "detection model failed to load, guidance disabled");
        self.model_state = ModelState::Degraded(reason);
    }

    // ---- detection loop ----

    /// Runs one detection cycle and applies the result.
    ///
    /// Skips (without touching state) when the session is not in the
    /// camera step, the camera is closed, the model is not ready, or
    /// the frame is not ready. Per-frame detection errors are absorbed;
    /// a missed cycle is indistinguishable from "subject not found yet".
    pub fn run_tick(&mut self) -> TickOutcome {
        match self.compute_tick() {
            Some(result) => self.apply_tick(result),
            None => match () {
                _ if self.step != CaptureStep::Camera => TickOutcome::Skipped(TickSkip::WrongStep),
                _ if !self.camera.is_open() => TickOutcome::Skipped(TickSkip::CameraClosed),
                _ if self.model_state != ModelState::Ready => {
                    TickOutcome::Skipped(TickSkip::ModelNotReady)
                }
                _ => TickOutcome::Skipped(TickSkip::FrameNotReady),
            },
        }
    }

    /// Computes one detection cycle without applying it.
    ///
    /// Split from [`Self::apply_tick`] so hosts that run detection off
    /// the UI context can apply results later, with the stale guard
    /// still enforced.
    pub fn compute_tick(&mut self) -> Option<TickResult> {
        if self.step != CaptureStep::Camera
            || !self.camera.is_open()
            || self.model_state != ModelState::Ready
        {
            return None;
        }

        let frame = match self.sampler.sample(self.camera.as_mut()) {
            Ok(Some(frame)) => frame,
            Ok(None) => return None,
            Err(e) => {
                // Recovered locally; the next tick proceeds normally
                tracing::debug!(error = %e, "frame sample failed");
                return None;
            }
        };

        let lighting = classify_lighting(&frame, &self.config.lighting);

        let detector = self.detector.as_mut()?;
        let source = detector.run(&frame);

        let best = evaluate(
            source.candidates(),
            frame.width(),
            frame.height(),
            &self.profile,
        );

        let status = match best {
            Some(scored) => {
                let bbox = scored.candidate.bbox;
                DetectionStatus {
                    subject_present: true,
                    distance: classify_distance(bbox.height, frame.height(), &self.config.distance),
                    lighting,
                    bounding_box: Some(bbox),
                }
            }
            None => DetectionStatus {
                subject_present: false,
                distance: Distance::Unknown,
                lighting,
                bounding_box: None,
            },
        };

        Some(TickResult {
            sequence: frame.sequence(),
            status,
            source,
            frame_width: frame.width(),
            frame_height: frame.height(),
        })
    }

    /// Applies a tick result, discarding it if stale or if the session
    /// has left the camera step since the tick was computed.
    pub fn apply_tick(&mut self, result: TickResult) -> TickOutcome {
        if self.step != CaptureStep::Camera {
            return TickOutcome::Skipped(TickSkip::WrongStep);
        }
        if result.sequence <= self.last_applied_sequence {
            tracing::trace!(
                sequence = result.sequence,
                last = self.last_applied_sequence,
                "stale tick discarded"
            );
            return TickOutcome::Skipped(TickSkip::Stale);
        }
        self.last_applied_sequence = result.sequence;
        // Wholesale snapshot replacement, never a merge
        self.status = result.status;
        self.status_frame = (result.frame_width, result.frame_height);
        TickOutcome::Applied
    }

    // ---- user actions ----

    /// Retries camera acquisition after an error.
    pub fn retry_camera(&mut self) -> Result<(), SessionError> {
        if self.step != CaptureStep::Camera {
            return Err(SessionError::InvalidTransition {
                from: self.step,
                action: "retry_camera",
            });
        }
        match self.camera.open(&self.config.capture) {
            Ok(()) => {
                self.camera_error = None;
                Ok(())
            }
            Err(e) => {
                self.camera_error = Some(e.to_string());
                Err(SessionError::Camera(e))
            }
        }
    }

    /// Captures the current frame, freezing it as a JPEG and moving to
    /// preview. Releases the camera and stops the loop as a side effect.
    pub fn capture_photo(&mut self) -> Result<(), SessionError> {
        if self.step != CaptureStep::Camera {
            return Err(SessionError::InvalidTransition {
                from: self.step,
                action: "capture_photo",
            });
        }
        match self.model_state {
            ModelState::Ready => {}
            _ => return Err(SessionError::ModelNotReady),
        }
        if !self.capture_enabled() {
            return Err(SessionError::NotPositioned);
        }

        let frame = self
            .sampler
            .sample(self.camera.as_mut())?
            .ok_or(CameraError::CaptureFailed("frame not ready".into()))?;

        self.captured_image = Some(encode_jpeg(&frame)?);
        self.release_camera();
        self.step = CaptureStep::Preview;
        tracing::info!(sequence = frame.sequence(), "photo captured");
        Ok(())
    }

    /// Sets the free-text notes; only meaningful during preview.
    pub fn set_notes(&mut self, notes: impl Into<String>) -> Result<(), SessionError> {
        if self.step != CaptureStep::Preview {
            return Err(SessionError::InvalidTransition {
                from: self.step,
                action: "set_notes",
            });
        }
        self.notes = notes.into();
        Ok(())
    }

    /// Discards the captured image and notes and returns to the camera
    /// step, re-acquiring the source.
    pub fn retake(&mut self) -> Result<(), SessionError> {
        if self.step != CaptureStep::Preview {
            return Err(SessionError::InvalidTransition {
                from: self.step,
                action: "retake",
            });
        }
        self.captured_image = None;
        self.notes.clear();
        self.status = DetectionStatus::default();
        self.step = CaptureStep::Camera;
        self.camera_error = match self.camera.open(&self.config.capture) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(error = %e, "camera re-acquisition failed");
                Some(e.to_string())
            }
        };
        Ok(())
    }

    /// Moves from preview to the final confirmation step.
    pub fn proceed_to_confirm(&mut self) -> Result<(), SessionError> {
        if self.step != CaptureStep::Preview {
            return Err(SessionError::InvalidTransition {
                from: self.step,
                action: "proceed_to_confirm",
            });
        }
        self.step = CaptureStep::Confirm;
        Ok(())
    }

    /// Returns from confirmation to preview. Disabled while a
    /// submission is outstanding.
    pub fn back_to_preview(&mut self) -> Result<(), SessionError> {
        if self.step != CaptureStep::Confirm || self.submit_in_flight {
            return Err(SessionError::InvalidTransition {
                from: self.step,
                action: "back_to_preview",
            });
        }
        self.last_error = None;
        self.step = CaptureStep::Preview;
        Ok(())
    }

    /// Starts a submission, marking it in flight and handing out the
    /// payload for the service call.
    ///
    /// Rejected outside the confirm step, while another submission is
    /// outstanding, or when no image has been captured. The host runs
    /// the service call on the returned payload and feeds the outcome
    /// to [`Self::apply_submit_result`].
    pub fn begin_submit(&mut self) -> Result<SubmitRequest, SessionError> {
        if self.step != CaptureStep::Confirm {
            return Err(SessionError::InvalidTransition {
                from: self.step,
                action: "submit",
            });
        }
        if self.submit_in_flight {
            return Err(SessionError::Submit(SubmitError::InFlight));
        }
        let image = self
            .captured_image
            .clone()
            .ok_or(SessionError::InvalidTransition {
                from: self.step,
                action: "submit",
            })?;

        self.submit_in_flight = true;
        Ok(SubmitRequest {
            image,
            notes: self.notes.clone(),
        })
    }

    /// Applies the outcome of an outstanding submission.
    ///
    /// An outcome with no matching outstanding submission, or arriving
    /// after the session has left the confirm step, is discarded: an
    /// abandoned submission must not mutate whatever state the user
    /// navigated to. On success stores the artifact identifier and
    /// moves to the success step. On failure the session stays in
    /// confirm with the error surfaced and the image and notes
    /// retained for retry.
    pub fn apply_submit_result(
        &mut self,
        outcome: Result<ArtifactId, SubmitError>,
    ) -> Result<(), SessionError> {
        if !self.submit_in_flight {
            tracing::debug!("submit outcome with no outstanding submission, discarded");
            return Ok(());
        }
        self.submit_in_flight = false;
        if self.step != CaptureStep::Confirm {
            tracing::debug!(step = ?self.step, "submit outcome after leaving confirm, discarded");
            return Ok(());
        }

        match outcome {
            Ok(artifact) => {
                tracing::info!(artifact = %artifact, "submission succeeded");
                self.artifact_id = Some(artifact);
                self.last_error = None;
                self.step = CaptureStep::Success;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "submission failed, staying in confirm");
                self.last_error = Some(e.to_string());
                Err(SessionError::Submit(e))
            }
        }
    }

    /// Runs a full submission synchronously against the service.
    ///
    /// Composes [`Self::begin_submit`] and [`Self::apply_submit_result`]
    /// for hosts that do not run the service call off-context.
    pub fn submit(&mut self, service: &mut dyn AnalysisService) -> Result<(), SessionError> {
        let request = self.begin_submit()?;
        let outcome = service.submit(&request.image, &request.notes);
        self.apply_submit_result(outcome)
    }

    fn release_camera(&mut self) {
        if self.camera.is_open() {
            self.camera.close();
            tracing::debug!("camera released");
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        // Teardown is an exit path like any other
        self.release_camera();
    }
}

/// Encodes a frame as JPEG (quality 80), stripping the alpha channel.
fn encode_jpeg(frame: &Frame) -> Result<Vec<u8>, SessionError> {
    let (width, height) = (frame.width(), frame.height());
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for chunk in frame.pixels().chunks_exact(BYTES_PER_PIXEL) {
        rgb.extend_from_slice(&chunk[..3]);
    }

    let mut bytes = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, 80);
    encoder
        .encode(&rgb, width, height, image::ExtendedColorType::Rgb8)
        .map_err(|e| SessionError::Encode(e.to_string()))?;
    Ok(bytes)
}

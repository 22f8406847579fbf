//! Capture Guidance CLI
//!
//! Command-line demonstration of the capture-guidance engine, driving
//! a full capture session against a mock camera.

use capture_guidance::{
    capture::{FileConfig, MockCamera, MockRect},
    detect::{DetectorStack, NullDetector, SubjectProfile},
    session::{CaptureSession, CaptureStep, MockAnalysisService, TickOutcome},
};
use clap::Parser;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(version, about = "Capture guidance demo against a mock camera")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Maximum detection ticks before giving up.
    #[arg(long, default_value_t = 20)]
    ticks: u32,

    /// Background brightness of the mock scene (0-255).
    #[arg(long, default_value_t = 120)]
    brightness: u8,

    /// Subject profile: "foot" or "handheld".
    #[arg(long, default_value = "handheld")]
    profile: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Capture Guidance v{}", capture_guidance::VERSION);
    info!("This is a demonstration using mock camera input");

    let config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };

    let profile = match args.profile.as_str() {
        "foot" => SubjectProfile::foot(),
        "handheld" => SubjectProfile::handheld_object(),
        other => {
            eprintln!("Unknown profile '{}' (expected foot|handheld)", other);
            std::process::exit(1);
        }
    };

    // Mock scene: a bright rectangular object centered in the frame,
    // sized so distance classifies as ideal.
    let (width, height) = (config.capture.width, config.capture.height);
    let camera = MockCamera::new(args.brightness).with_rect(MockRect {
        x: width / 2 - width / 8,
        y: height / 4,
        width: width / 4,
        height: height / 2,
        brightness: 230,
    });

    let mut session = CaptureSession::new(Box::new(camera), config, profile);
    if let Some(e) = session.camera_error() {
        eprintln!("Camera unavailable: {}", e);
        std::process::exit(1);
    }

    // No trained model in the demo; the edge-density fallback carries it
    session.model_loaded(DetectorStack::new(Box::new(NullDetector)));

    info!("Running detection loop...");
    let mut captured = false;
    for tick in 0..args.ticks {
        match session.run_tick() {
            TickOutcome::Applied => {
                let status = session.status();
                info!(
                    tick,
                    ready = status.is_ready(),
                    "{}",
                    status.status_message()
                );
            }
            TickOutcome::Skipped(reason) => {
                info!(tick, ?reason, "tick skipped");
            }
        }

        if session.capture_enabled() {
            match session.capture_photo() {
                Ok(()) => {
                    captured = true;
                    break;
                }
                Err(e) => warn!("Capture failed: {}", e),
            }
        }
    }

    if !captured {
        warn!("Subject never reached a ready position; giving up");
        return;
    }

    info!(
        "Captured {} bytes, adding notes and submitting",
        session.captured_image().map(|i| i.len()).unwrap_or(0)
    );
    if let Err(e) = session
        .set_notes("Demo capture via mock camera")
        .and_then(|()| session.proceed_to_confirm())
    {
        eprintln!("Session flow error: {}", e);
        std::process::exit(1);
    }

    let mut service = MockAnalysisService::accepting();
    if let Err(e) = session.submit(&mut service) {
        warn!("Submission failed: {}", e);
        return;
    }

    if session.step() == CaptureStep::Success {
        match session.artifact_id() {
            Some(artifact) => println!("Capture complete: artifact {}", artifact),
            None => warn!("Success step reached without an artifact id"),
        }
    }
}

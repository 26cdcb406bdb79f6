//! SnapCrop - select a screen region, save it as a PNG, print the path
//!
//! Exit code 0 means a PNG was written and its absolute path printed on
//! stdout. Every other outcome (cancellation, degenerate selection, display
//! reconfiguration, any failure) exits 1 and prints nothing on stdout.

mod lock;

use crate::lock::InstanceLock;
use clap::Parser;
use export::ExportError;
use overlay::{AbortReason, CaptureMode, OverlaySession, SessionOutcome};
use std::process::ExitCode;

const APP_NAME: &str = "snapcrop";

#[derive(Parser, Debug)]
#[command(name = APP_NAME, version, about = "Interactive screen region capture")]
struct Cli {
    /// Drag a rectangle instead of drawing a freehand stroke
    #[arg(short, long, conflicts_with = "freehand")]
    rectangle: bool,

    /// Draw a freehand stroke and capture its bounding box (default)
    #[arg(short, long)]
    freehand: bool,

    /// Remove a stale instance lock before starting
    #[arg(long)]
    force_unlock: bool,
}

impl Cli {
    fn mode(&self) -> CaptureMode {
        if self.rectangle {
            CaptureMode::Rectangle
        } else {
            CaptureMode::Freehand
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    if cli.force_unlock {
        InstanceLock::force_release(APP_NAME)?;
    }
    let _lock = InstanceLock::try_acquire(APP_NAME)?;

    // Capture before any window exists, otherwise the overlay would end up
    // in its own frames
    let frames = capture::capture_all()?;
    log::info!("captured {} display(s)", frames.len());

    match OverlaySession::run(&frames, cli.mode())? {
        SessionOutcome::Committed {
            frame_index,
            payload,
        } => {
            let frame = frames
                .iter()
                .find(|f| f.index == frame_index)
                .ok_or_else(|| anyhow::anyhow!("no frame for display {frame_index}"))?;
            let Some(region) = payload.bounding_rect() else {
                log::warn!("committed selection is empty, nothing to export");
                return Ok(ExitCode::FAILURE);
            };

            match export::export_region(frame, region) {
                Ok(path) => {
                    println!("{}", path.display());
                    Ok(ExitCode::SUCCESS)
                }
                Err(ExportError::DegenerateSelection) => {
                    log::warn!("selection has zero area after clamping, nothing to export");
                    Ok(ExitCode::FAILURE)
                }
                Err(e) => Err(e.into()),
            }
        }
        SessionOutcome::Cancelled => {
            // Expected termination path, not an error
            log::info!("capture cancelled");
            Ok(ExitCode::FAILURE)
        }
        SessionOutcome::Aborted(AbortReason::DisplayReconfigured) => {
            log::warn!("display configuration changed mid-session, captured frames are stale");
            Ok(ExitCode::FAILURE)
        }
    }
}

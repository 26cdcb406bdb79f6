//! Overlay module for SnapCrop
//!
//! Presents one frozen fullscreen window per captured display and runs the
//! interactive selection session across them.

pub mod display;
pub mod platform;
pub mod render;
pub mod selection;
pub mod session;
pub mod watcher;

pub use selection::{CaptureMode, Corner, Phase, SelectionEngine, SelectionPayload};
pub use session::{AbortReason, Arbiter, OverlaySession, SessionOutcome};
pub use watcher::DisplayWatcher;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("Window creation failed: {0}")]
    WindowCreation(#[from] winit::error::OsError),

    #[error("Render surface error: {0}")]
    Surface(String),
}

pub type OverlayResult<T> = Result<T, OverlayError>;

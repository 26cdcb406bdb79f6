//! Frame acquisition for SnapCrop
//!
//! Captures one immutable frame per connected display, before any overlay
//! window exists.

pub mod backend;
pub mod frame;
pub mod geometry;

pub use backend::{capture_all, display_snapshot};
pub use frame::{DisplaySnapshot, Frame};
pub use geometry::{LogicalPoint, LogicalRect, PixelRect};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Capture backend error: {0}")]
    Backend(#[from] xcap::XCapError),

    #[error("No displays captured")]
    NoDisplays,
}

pub type CaptureResult<T> = Result<T, CaptureError>;

//! Export pipeline for SnapCrop
//!
//! Converts a committed logical selection into physical crop coordinates
//! against the frame image, writes the PNG and reports its path.

mod crop;
mod png;

pub use crop::to_pixel_rect;
pub use png::{export_region, output_path, write_crop, OUTPUT_FILE};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Selection is empty after clamping to the frame")]
    DegenerateSelection,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type ExportResult<T> = Result<T, ExportError>;

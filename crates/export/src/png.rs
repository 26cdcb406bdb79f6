//! PNG writing for the committed crop

use crate::crop::to_pixel_rect;
use crate::{ExportError, ExportResult};
use capture::{Frame, LogicalRect, PixelRect};
use image::imageops;
use once_cell::sync::Lazy;
use std::env;
use std::path::{Path, PathBuf};

/// Fixed output file name inside the system temporary directory.
/// A previous run's file at this path is overwritten.
pub const OUTPUT_FILE: &str = "snapcrop.png";

static OUTPUT_PATH: Lazy<PathBuf> = Lazy::new(|| env::temp_dir().join(OUTPUT_FILE));

/// Absolute path the exported PNG is written to
pub fn output_path() -> &'static Path {
    &OUTPUT_PATH
}

/// Crop the frame to a committed logical selection and write the PNG to the
/// fixed output path, returning that path.
pub fn export_region(frame: &Frame, region: LogicalRect) -> ExportResult<PathBuf> {
    let path = output_path().to_path_buf();
    write_crop(frame, region, &path)?;
    Ok(path)
}

/// Crop and write to an explicit path.
///
/// The crop is persisted as a standalone raster: its pixels are physical
/// image pixels, no display scale factor applies to it any more.
pub fn write_crop(frame: &Frame, region: LogicalRect, path: &Path) -> ExportResult<PixelRect> {
    let crop = to_pixel_rect(region, frame.device_pixel_ratio, frame.pixel_size())
        .ok_or(ExportError::DegenerateSelection)?;

    log::debug!(
        "exporting {}x{} at ({}, {}) from display {}",
        crop.width,
        crop.height,
        crop.x,
        crop.y,
        frame.index
    );

    let cropped =
        imageops::crop_imm(&frame.image, crop.x, crop.y, crop.width, crop.height).to_image();
    cropped.save(path)?;
    Ok(crop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture::LogicalPoint;
    use image::{Rgba, RgbaImage};

    /// 1920x1080 frame whose pixel at (x, y) encodes its own coordinates
    fn synthetic_frame(dpr: f64, width: u32, height: u32) -> Frame {
        let image = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 0, 255])
        });
        Frame::new(
            0,
            "synthetic".into(),
            LogicalRect::new(0.0, 0.0, width as f64 / dpr, height as f64 / dpr),
            dpr,
            image,
        )
    }

    #[test]
    fn rectangle_drag_exports_expected_crop() {
        let frame = synthetic_frame(1.0, 1920, 1080);
        let region = LogicalRect::from_points(
            LogicalPoint::new(100.0, 100.0),
            LogicalPoint::new(500.0, 400.0),
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OUTPUT_FILE);

        let crop = write_crop(&frame, region, &path).unwrap();
        assert_eq!(crop, PixelRect::new(100, 100, 400, 300));

        let saved = image::open(&path).unwrap().to_rgba8();
        assert_eq!((saved.width(), saved.height()), (400, 300));
        // Top-left pixel of the crop came from (100, 100)
        assert_eq!(saved.get_pixel(0, 0), &Rgba([100, 100, 0, 255]));
    }

    #[test]
    fn high_dpi_drag_exports_physical_pixels() {
        let frame = synthetic_frame(2.0, 3840, 2160);
        let region = LogicalRect::from_points(
            LogicalPoint::new(100.0, 100.0),
            LogicalPoint::new(500.0, 400.0),
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OUTPUT_FILE);

        let crop = write_crop(&frame, region, &path).unwrap();
        assert_eq!(crop, PixelRect::new(200, 200, 800, 600));

        let saved = image::open(&path).unwrap().to_rgba8();
        assert_eq!((saved.width(), saved.height()), (800, 600));
    }

    #[test]
    fn zero_area_drag_is_rejected_and_writes_nothing() {
        let frame = synthetic_frame(1.0, 1920, 1080);
        let p = LogicalPoint::new(300.0, 300.0);
        let region = LogicalRect::from_points(p, p);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OUTPUT_FILE);

        let err = write_crop(&frame, region, &path).unwrap_err();
        assert!(matches!(err, ExportError::DegenerateSelection));
        assert!(!path.exists());
    }

    #[test]
    fn output_path_is_in_temp_dir() {
        let path = output_path();
        assert!(path.starts_with(env::temp_dir()));
        assert_eq!(path.file_name().unwrap(), OUTPUT_FILE);
    }
}

//! Captured frame data

use crate::geometry::LogicalRect;
use image::RgbaImage;

/// One display's captured image plus its geometry and pixel-scale metadata.
///
/// Immutable after acquisition; owned by the session for its whole lifetime.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Display ordinal in acquisition order
    pub index: usize,
    /// Platform display identifier
    pub name: String,
    /// Display rectangle in desktop (logical) coordinates
    pub geometry: LogicalRect,
    /// Scale factor from logical units to physical image pixels
    pub device_pixel_ratio: f64,
    /// Physical-pixel raster of the display at capture time
    pub image: RgbaImage,
}

impl Frame {
    /// A non-positive scale factor would make every physical-to-logical
    /// conversion degenerate, so it is normalized to 1.0 here.
    pub fn new(
        index: usize,
        name: String,
        geometry: LogicalRect,
        device_pixel_ratio: f64,
        image: RgbaImage,
    ) -> Self {
        let device_pixel_ratio = if device_pixel_ratio <= f64::EPSILON {
            log::warn!(
                "display {index} ({name}) reported scale factor {device_pixel_ratio}, using 1.0"
            );
            1.0
        } else {
            device_pixel_ratio
        };
        Self {
            index,
            name,
            geometry,
            device_pixel_ratio,
            image,
        }
    }

    /// Physical size of the captured raster
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// Lightweight monitor topology record used for hotplug detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySnapshot {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

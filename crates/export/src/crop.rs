//! Logical-to-physical crop math

use capture::{LogicalRect, PixelRect};

/// Convert a logical selection rectangle into physical image pixels.
///
/// Origin and size are scaled by the device pixel ratio and rounded to the
/// nearest integer, then clamped so the result lies entirely within the
/// image bounds: origin never negative, extent never past the image edge.
/// Returns `None` when the clamped rectangle has no area left.
pub fn to_pixel_rect(
    rect: LogicalRect,
    device_pixel_ratio: f64,
    image_size: (u32, u32),
) -> Option<PixelRect> {
    let dpr = if device_pixel_ratio <= f64::EPSILON {
        1.0
    } else {
        device_pixel_ratio
    };
    let (image_w, image_h) = image_size;

    let x = (rect.x * dpr).round() as i64;
    let y = (rect.y * dpr).round() as i64;
    let mut w = (rect.width * dpr).round() as i64;
    let mut h = (rect.height * dpr).round() as i64;

    // A selection starting left of / above the frame loses the out-of-frame
    // part, it does not shift into the frame.
    if x < 0 {
        w += x;
    }
    if y < 0 {
        h += y;
    }
    let x = x.max(0);
    let y = y.max(0);

    if x + w > image_w as i64 {
        w = image_w as i64 - x;
    }
    if y + h > image_h as i64 {
        h = image_h as i64 - y;
    }

    if w <= 0 || h <= 0 {
        return None;
    }

    Some(PixelRect::new(x as u32, y as u32, w as u32, h as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: (u32, u32) = (1920, 1080);

    #[test]
    fn identity_scale_maps_directly() {
        // Drag from (100,100) to (500,400) at dpr 1.0
        let rect = LogicalRect::new(100.0, 100.0, 400.0, 300.0);
        let crop = to_pixel_rect(rect, 1.0, FRAME).unwrap();
        assert_eq!(crop, PixelRect::new(100, 100, 400, 300));
    }

    #[test]
    fn high_dpi_scales_origin_and_size() {
        // Same logical drag at dpr 2.0 against a 3840x2160 raster
        let rect = LogicalRect::new(100.0, 100.0, 400.0, 300.0);
        let crop = to_pixel_rect(rect, 2.0, (3840, 2160)).unwrap();
        assert_eq!(crop, PixelRect::new(200, 200, 800, 600));
    }

    #[test]
    fn fractional_scale_rounds_to_nearest() {
        let rect = LogicalRect::new(10.0, 10.0, 101.0, 101.0);
        let crop = to_pixel_rect(rect, 1.5, FRAME).unwrap();
        assert_eq!(crop, PixelRect::new(15, 15, 152, 152));
    }

    #[test]
    fn clamps_past_right_edge() {
        // Drag from (1800,0) to (2000,100): width clamps to 120, not 200
        let rect = LogicalRect::new(1800.0, 0.0, 200.0, 100.0);
        let crop = to_pixel_rect(rect, 1.0, FRAME).unwrap();
        assert_eq!(crop, PixelRect::new(1800, 0, 120, 100));
    }

    #[test]
    fn clamps_negative_origin() {
        let rect = LogicalRect::new(-50.0, -20.0, 100.0, 100.0);
        let crop = to_pixel_rect(rect, 1.0, FRAME).unwrap();
        assert_eq!(crop, PixelRect::new(0, 0, 50, 80));
    }

    #[test]
    fn zero_area_drag_is_degenerate() {
        let rect = LogicalRect::new(300.0, 300.0, 0.0, 0.0);
        assert!(to_pixel_rect(rect, 1.0, FRAME).is_none());
    }

    #[test]
    fn selection_entirely_outside_is_degenerate() {
        let rect = LogicalRect::new(2000.0, 0.0, 100.0, 100.0);
        assert!(to_pixel_rect(rect, 1.0, FRAME).is_none());
        let rect = LogicalRect::new(-500.0, 0.0, 100.0, 100.0);
        assert!(to_pixel_rect(rect, 1.0, FRAME).is_none());
    }

    #[test]
    fn non_positive_dpr_is_treated_as_one() {
        let rect = LogicalRect::new(100.0, 100.0, 400.0, 300.0);
        let crop = to_pixel_rect(rect, 0.0, FRAME).unwrap();
        assert_eq!(crop, PixelRect::new(100, 100, 400, 300));
    }
}

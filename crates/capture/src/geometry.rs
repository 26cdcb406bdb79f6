//! Geometry types shared across the capture session
//!
//! Logical coordinates are the UI coordinate space of a window; physical
//! pixels are the raster space of a captured frame image. The two are
//! related by the frame's device pixel ratio.

/// Point in logical (device-independent) coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LogicalPoint {
    pub x: f64,
    pub y: f64,
}

impl LogicalPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Midpoint between this point and another
    pub fn midpoint(&self, other: &LogicalPoint) -> LogicalPoint {
        LogicalPoint::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Linear interpolation towards `target` by factor `t` in [0, 1]
    pub fn lerp(&self, target: &LogicalPoint, t: f64) -> LogicalPoint {
        LogicalPoint::new(
            self.x * (1.0 - t) + target.x * t,
            self.y * (1.0 - t) + target.y * t,
        )
    }
}

/// Rectangle in logical coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LogicalRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LogicalRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Normalized rectangle spanning two corner points given in any order
    pub fn from_points(a: LogicalPoint, b: LogicalPoint) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Axis-aligned bounding box of a point sequence, `None` when empty
    pub fn bounding(points: &[LogicalPoint]) -> Option<Self> {
        let first = points.first()?;
        let mut min_x = first.x;
        let mut min_y = first.y;
        let mut max_x = first.x;
        let mut max_y = first.y;
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

/// Rectangle in physical image pixels, always inside the image bounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_normalizes_all_drag_directions() {
        let a = LogicalPoint::new(100.0, 100.0);
        let b = LogicalPoint::new(500.0, 400.0);
        let expected = LogicalRect::new(100.0, 100.0, 400.0, 300.0);

        // Four drag directions, both argument orders
        assert_eq!(LogicalRect::from_points(a, b), expected);
        assert_eq!(LogicalRect::from_points(b, a), expected);

        let tr = LogicalPoint::new(500.0, 100.0);
        let bl = LogicalPoint::new(100.0, 400.0);
        assert_eq!(LogicalRect::from_points(tr, bl), expected);
        assert_eq!(LogicalRect::from_points(bl, tr), expected);
    }

    #[test]
    fn from_points_zero_area() {
        let p = LogicalPoint::new(42.0, 7.0);
        let r = LogicalRect::from_points(p, p);
        assert_eq!(r.width, 0.0);
        assert_eq!(r.height, 0.0);
        assert_eq!(r.x, 42.0);
    }

    #[test]
    fn bounding_box_of_stroke() {
        let points = [
            LogicalPoint::new(10.0, 50.0),
            LogicalPoint::new(30.0, 20.0),
            LogicalPoint::new(25.0, 80.0),
        ];
        let r = LogicalRect::bounding(&points).unwrap();
        assert_eq!(r, LogicalRect::new(10.0, 20.0, 20.0, 60.0));
    }

    #[test]
    fn bounding_box_empty_is_none() {
        assert!(LogicalRect::bounding(&[]).is_none());
    }

    #[test]
    fn lerp_stays_between_endpoints() {
        let a = LogicalPoint::new(0.0, 0.0);
        let b = LogicalPoint::new(10.0, -10.0);
        let m = a.lerp(&b, 0.2);
        assert_eq!(m, LogicalPoint::new(2.0, -2.0));
    }
}

//! Overlay painting
//!
//! All drawing happens on the CPU into a `tiny_skia::Pixmap` that the
//! session presents through softbuffer. Selection geometry arrives in
//! logical units and is mapped to the window's physical pixels with a
//! single scale transform.

use crate::selection::{CaptureMode, Phase, SelectionEngine};
use capture::{LogicalPoint, LogicalRect};
use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, SwashCache, Weight};
use tiny_skia::{
    BlendMode, FillRule, FilterQuality, LineCap, LineJoin, Mask, Paint, Path, PathBuilder,
    PathStroker, Pixmap, PixmapPaint, Rect, Stroke, Transform,
};

/// Cubic approximation factor for a quarter circle
const KAPPA: f64 = 0.552_284_749_831;

const BORDER_WIDTH: f32 = 2.0;
const CROSSHAIR_SIZE: f32 = 20.0;
const STROKE_CORE_WIDTH: f32 = 3.0;
const GLOW_WIDE_WIDTH: f32 = 16.0;
const GLOW_TIGHT_WIDTH: f32 = 8.0;
const LABEL_FONT_SIZE: f32 = 13.0;
const LABEL_LINE_HEIGHT: f32 = 18.0;
const LABEL_OFFSET: f32 = 20.0;

/// Overlay renderer; owns the font machinery so it is loaded once and
/// shared by every window
pub struct Renderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
        }
    }

    /// Paint one window's overlay: frozen background, dim layer and the
    /// current selection visuals. `scale` maps logical units to the
    /// target's physical pixels.
    pub fn render(
        &mut self,
        target: &mut Pixmap,
        background: &Pixmap,
        engine: &SelectionEngine,
        scale: f32,
    ) {
        draw_background(target, background);

        let transform = Transform::from_scale(scale, scale);
        match (engine.mode(), engine.phase()) {
            (CaptureMode::Rectangle, Phase::Drawing | Phase::Committed) => {
                self.draw_rectangle_selection(target, engine, scale, transform);
            }
            (CaptureMode::Rectangle, Phase::Idle) => {
                dim(target, 60);
                if let Some(pointer) = engine.pointer() {
                    draw_crosshair(target, pointer, transform);
                }
            }
            (CaptureMode::Freehand, _) => {
                dim(target, 60);
                draw_stroke(target, engine.stroke(), scale, transform);
            }
            _ => {}
        }
    }

    fn draw_rectangle_selection(
        &mut self,
        target: &mut Pixmap,
        engine: &SelectionEngine,
        scale: f32,
        transform: Transform,
    ) {
        let rect = engine.normalized_rect();
        let radii = engine.corner_radii();

        // Dim everything outside the selection; the selected region stays
        // at full brightness
        let logical_w = target.width() as f64 / scale as f64;
        let logical_h = target.height() as f64 / scale as f64;
        let mut pb = PathBuilder::new();
        if let Some(full) = Rect::from_xywh(0.0, 0.0, logical_w as f32, logical_h as f32) {
            pb.push_rect(full);
        }
        add_rounded_rect(&mut pb, rect, radii);
        if let Some(path) = pb.finish() {
            let mut paint = Paint::default();
            paint.set_color_rgba8(0, 0, 0, 100);
            paint.anti_alias = true;
            target.fill_path(&path, &paint, FillRule::EvenOdd, transform, None);
        }

        // Border with three rounded corners and a sharp drag corner
        if let Some(border) = rounded_rect_path(rect, radii) {
            let mut paint = Paint::default();
            paint.set_color_rgba8(255, 255, 255, 255);
            paint.anti_alias = true;
            let stroke = Stroke {
                width: BORDER_WIDTH,
                line_join: LineJoin::Round,
                ..Stroke::default()
            };
            target.stroke_path(&border, &paint, &stroke, transform, None);
        }

        if let Some(text) = engine.dimension_label() {
            let center_x = rect.center_x() as f32 * scale;
            let top_y = (rect.bottom() as f32 + LABEL_OFFSET) * scale;
            self.draw_label(target, &text, center_x, top_y, scale);
        }
    }

    /// Centered label on a dark pill, in physical coordinates
    fn draw_label(&mut self, target: &mut Pixmap, text: &str, center_x: f32, top_y: f32, scale: f32) {
        let metrics = Metrics::new(LABEL_FONT_SIZE * scale, LABEL_LINE_HEIGHT * scale);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        buffer.set_size(&mut self.font_system, None, None);
        buffer.set_text(
            &mut self.font_system,
            text,
            Attrs::new().family(Family::SansSerif).weight(Weight::BOLD),
            Shaping::Advanced,
        );
        buffer.shape_until_scroll(&mut self.font_system, false);

        let text_w = buffer
            .layout_runs()
            .map(|run| run.line_w)
            .fold(0.0_f32, f32::max);
        let text_h = LABEL_LINE_HEIGHT * scale;
        let pad_x = 8.0 * scale;
        let pad_y = 4.0 * scale;

        let pill = LogicalRect::new(
            (center_x - text_w / 2.0 - pad_x) as f64,
            (top_y - pad_y) as f64,
            (text_w + pad_x * 2.0) as f64,
            (text_h + pad_y * 2.0) as f64,
        );
        let pill_radius = 4.0 * scale as f64;
        if let Some(path) = rounded_rect_path(pill, [pill_radius; 4]) {
            let mut paint = Paint::default();
            paint.set_color_rgba8(0, 0, 0, 180);
            paint.anti_alias = true;
            target.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }

        let origin_x = center_x - text_w / 2.0;
        let origin_y = top_y;
        buffer.draw(
            &mut self.font_system,
            &mut self.swash_cache,
            cosmic_text::Color::rgba(255, 255, 255, 255),
            |x, y, w, h, color| {
                let Some(rect) = Rect::from_xywh(
                    origin_x + x as f32,
                    origin_y + y as f32,
                    w as f32,
                    h as f32,
                ) else {
                    return;
                };
                let mut paint = Paint::default();
                paint.set_color_rgba8(color.r(), color.g(), color.b(), color.a());
                target.fill_rect(rect, &paint, Transform::identity(), None);
            },
        );
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Frame image drawn "preserve aspect, crop to fill"; no caching, the
/// image is shown exactly once
fn draw_background(target: &mut Pixmap, background: &Pixmap) {
    let tw = target.width() as f32;
    let th = target.height() as f32;
    let bw = background.width() as f32;
    let bh = background.height() as f32;
    if bw <= 0.0 || bh <= 0.0 {
        return;
    }
    let scale = (tw / bw).max(th / bh);
    let tx = (tw - bw * scale) / 2.0;
    let ty = (th - bh * scale) / 2.0;
    let paint = PixmapPaint {
        opacity: 1.0,
        blend_mode: BlendMode::Source,
        quality: FilterQuality::Bilinear,
    };
    target.draw_pixmap(
        0,
        0,
        background.as_ref(),
        &paint,
        Transform::from_row(scale, 0.0, 0.0, scale, tx, ty),
        None,
    );
}

fn dim(target: &mut Pixmap, alpha: u8) {
    let Some(full) = Rect::from_xywh(0.0, 0.0, target.width() as f32, target.height() as f32)
    else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color_rgba8(0, 0, 0, alpha);
    target.fill_rect(full, &paint, Transform::identity(), None);
}

fn draw_crosshair(target: &mut Pixmap, pointer: LogicalPoint, transform: Transform) {
    let mut pb = PathBuilder::new();
    let (x, y) = (pointer.x as f32, pointer.y as f32);
    pb.move_to(x - CROSSHAIR_SIZE, y);
    pb.line_to(x + CROSSHAIR_SIZE, y);
    pb.move_to(x, y - CROSSHAIR_SIZE);
    pb.line_to(x, y + CROSSHAIR_SIZE);
    let Some(path) = pb.finish() else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color_rgba8(255, 255, 255, 220);
    paint.anti_alias = true;
    let stroke = Stroke {
        width: 1.0,
        ..Stroke::default()
    };
    target.stroke_path(&path, &paint, &stroke, transform, None);
}

/// Freehand stroke: quadratic curves through successive midpoints with a
/// two-pass glow. The glow is masked by the core stroke's own outline so it
/// never bleeds inside the selection stroke itself.
fn draw_stroke(target: &mut Pixmap, points: &[LogicalPoint], scale: f32, transform: Transform) {
    let Some(path) = stroke_to_path(points) else {
        return;
    };

    let core_stroke = Stroke {
        width: STROKE_CORE_WIDTH,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };

    let glow_mask = Mask::new(target.width(), target.height()).map(|mut mask| {
        let mut stroker = PathStroker::new();
        if let Some(outline) = stroker.stroke(&path, &core_stroke, scale) {
            mask.fill_path(&outline, FillRule::Winding, true, transform);
        }
        mask.invert();
        mask
    });

    // Wide low-intensity pass, then a tight brighter pass
    for (width, alpha) in [(GLOW_WIDE_WIDTH, 28), (GLOW_TIGHT_WIDTH, 64)] {
        let mut paint = Paint::default();
        paint.set_color_rgba8(90, 180, 255, alpha);
        paint.anti_alias = true;
        let stroke = Stroke {
            width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        target.stroke_path(&path, &paint, &stroke, transform, glow_mask.as_ref());
    }

    let mut paint = Paint::default();
    paint.set_color_rgba8(255, 255, 255, 255);
    paint.anti_alias = true;
    target.stroke_path(&path, &paint, &core_stroke, transform, None);
}

/// Smoothed points connected with quadratic curves through successive
/// midpoints, giving a continuous path rather than a jagged polyline
fn stroke_to_path(points: &[LogicalPoint]) -> Option<Path> {
    let first = points.first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    match points.len() {
        // A single press renders as a dot through the round cap
        1 => pb.line_to(first.x as f32 + 0.01, first.y as f32),
        2 => pb.line_to(points[1].x as f32, points[1].y as f32),
        len => {
            for i in 1..len - 1 {
                let mid = points[i].midpoint(&points[i + 1]);
                pb.quad_to(
                    points[i].x as f32,
                    points[i].y as f32,
                    mid.x as f32,
                    mid.y as f32,
                );
            }
            let last = points[len - 1];
            pb.line_to(last.x as f32, last.y as f32);
        }
    }
    pb.finish()
}

/// Rectangle outline with per-corner radii in
/// [top-left, top-right, bottom-right, bottom-left] order
fn rounded_rect_path(rect: LogicalRect, radii: [f64; 4]) -> Option<Path> {
    let mut pb = PathBuilder::new();
    add_rounded_rect(&mut pb, rect, radii);
    pb.finish()
}

fn add_rounded_rect(pb: &mut PathBuilder, rect: LogicalRect, radii: [f64; 4]) {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return;
    }
    let [tl, tr, br, bl] = radii;
    let (left, top) = (rect.x, rect.y);
    let (right, bottom) = (rect.right(), rect.bottom());
    let k = 1.0 - KAPPA;

    pb.move_to((left + tl) as f32, top as f32);
    pb.line_to((right - tr) as f32, top as f32);
    if tr > 0.0 {
        pb.cubic_to(
            (right - tr * k) as f32,
            top as f32,
            right as f32,
            (top + tr * k) as f32,
            right as f32,
            (top + tr) as f32,
        );
    }
    pb.line_to(right as f32, (bottom - br) as f32);
    if br > 0.0 {
        pb.cubic_to(
            right as f32,
            (bottom - br * k) as f32,
            (right - br * k) as f32,
            bottom as f32,
            (right - br) as f32,
            bottom as f32,
        );
    }
    pb.line_to((left + bl) as f32, bottom as f32);
    if bl > 0.0 {
        pb.cubic_to(
            (left + bl * k) as f32,
            bottom as f32,
            left as f32,
            (bottom - bl * k) as f32,
            left as f32,
            (bottom - bl) as f32,
        );
    }
    pb.line_to(left as f32, (top + tl) as f32);
    if tl > 0.0 {
        pb.cubic_to(
            left as f32,
            (top + tl * k) as f32,
            (left + tl * k) as f32,
            top as f32,
            (left + tl) as f32,
            top as f32,
        );
    }
    pb.close();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::CaptureMode;

    fn p(x: f64, y: f64) -> LogicalPoint {
        LogicalPoint::new(x, y)
    }

    #[test]
    fn rounded_rect_path_stays_inside_rect() {
        let rect = LogicalRect::new(10.0, 20.0, 100.0, 60.0);
        let path = rounded_rect_path(rect, [24.0, 24.0, 0.0, 24.0]).unwrap();
        let bounds = path.bounds();
        assert!((bounds.left() - 10.0).abs() < 0.5);
        assert!((bounds.top() - 20.0).abs() < 0.5);
        assert!((bounds.right() - 110.0).abs() < 0.5);
        assert!((bounds.bottom() - 80.0).abs() < 0.5);
    }

    #[test]
    fn degenerate_rect_produces_no_path() {
        let rect = LogicalRect::new(0.0, 0.0, 0.0, 0.0);
        assert!(rounded_rect_path(rect, [0.0; 4]).is_none());
    }

    #[test]
    fn stroke_path_spans_its_points() {
        let points = [p(0.0, 0.0), p(50.0, 10.0), p(100.0, 0.0)];
        let path = stroke_to_path(&points).unwrap();
        let bounds = path.bounds();
        assert!(bounds.left() <= 0.0 + 0.5);
        assert!(bounds.right() >= 99.5);
    }

    #[test]
    fn single_point_stroke_still_builds() {
        assert!(stroke_to_path(&[p(5.0, 5.0)]).is_some());
        assert!(stroke_to_path(&[]).is_none());
    }

    #[test]
    fn render_smoke_test() {
        let mut renderer = Renderer::new();
        let mut target = Pixmap::new(200, 100).unwrap();
        let background = Pixmap::new(200, 100).unwrap();

        let mut engine = SelectionEngine::new(CaptureMode::Rectangle);
        renderer.render(&mut target, &background, &engine, 1.0);

        engine.pointer_pressed(p(20.0, 20.0));
        engine.pointer_moved(p(120.0, 80.0));
        renderer.render(&mut target, &background, &engine, 1.0);

        let mut engine = SelectionEngine::new(CaptureMode::Freehand);
        engine.pointer_pressed(p(10.0, 10.0));
        engine.pointer_moved(p(60.0, 40.0));
        engine.pointer_moved(p(90.0, 20.0));
        renderer.render(&mut target, &background, &engine, 1.0);
    }
}

//! Interactive selection state machine
//!
//! One engine per overlay window, operating in that window's local logical
//! coordinate space. Reaching a terminal phase is a session-wide event; the
//! session arbiter decides which window's terminal event counts.

use capture::{LogicalPoint, LogicalRect};

/// Low-pass factor for freehand strokes: each appended point is
/// `previous * (1 - α) + raw * α`, which damps hand jitter while staying
/// responsive. The raw pointer position is only ever stored as the first
/// stroke point.
pub const STROKE_SMOOTHING: f64 = 0.2;

/// Largest corner rounding radius in logical units
pub const MAX_CORNER_RADIUS: f64 = 24.0;

/// Dimension label is hidden below this width/height
pub const LABEL_MIN_EXTENT: f64 = 10.0;

/// Selection mode, fixed for the whole session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    Rectangle,
    Freehand,
}

/// Engine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Drawing,
    Committed,
    Cancelled,
}

/// Rectangle corner identifiers, used for the sharp drag corner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Committed selection handed to the export pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionPayload {
    /// Normalized rectangle from a drag
    Region(LogicalRect),
    /// Smoothed freehand stroke; exports as its bounding box
    Stroke(Vec<LogicalPoint>),
}

impl SelectionPayload {
    /// Logical rectangle this payload selects, `None` for an empty stroke
    pub fn bounding_rect(&self) -> Option<LogicalRect> {
        match self {
            SelectionPayload::Region(rect) => Some(*rect),
            SelectionPayload::Stroke(points) => LogicalRect::bounding(points),
        }
    }
}

/// Per-window selection state machine
#[derive(Debug)]
pub struct SelectionEngine {
    mode: CaptureMode,
    phase: Phase,
    start: LogicalPoint,
    end: LogicalPoint,
    stroke: Vec<LogicalPoint>,
    /// Last observed pointer position, tracked in every phase (drives the
    /// idle crosshair and the sharp-corner choice). `None` until the first
    /// pointer event arrives; a press with no known position is dropped by
    /// the session rather than starting a drag at the origin.
    pointer: Option<LogicalPoint>,
}

impl SelectionEngine {
    pub fn new(mode: CaptureMode) -> Self {
        Self {
            mode,
            phase: Phase::Idle,
            start: LogicalPoint::default(),
            end: LogicalPoint::default(),
            stroke: Vec::new(),
            pointer: None,
        }
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pointer(&self) -> Option<LogicalPoint> {
        self.pointer
    }

    pub fn stroke(&self) -> &[LogicalPoint] {
        &self.stroke
    }

    /// Primary pointer press: Idle -> Drawing
    pub fn pointer_pressed(&mut self, p: LogicalPoint) {
        if self.phase != Phase::Idle {
            return;
        }
        self.pointer = Some(p);
        self.start = p;
        self.end = p;
        self.stroke.clear();
        if self.mode == CaptureMode::Freehand {
            self.stroke.push(p);
        }
        self.phase = Phase::Drawing;
    }

    /// Pointer move: updates the live end point / appends a smoothed point
    pub fn pointer_moved(&mut self, p: LogicalPoint) {
        self.pointer = Some(p);
        if self.phase != Phase::Drawing {
            return;
        }
        match self.mode {
            // The box tracks the pointer exactly, no smoothing
            CaptureMode::Rectangle => self.end = p,
            CaptureMode::Freehand => {
                if let Some(last) = self.stroke.last().copied() {
                    self.stroke.push(last.lerp(&p, STROKE_SMOOTHING));
                } else {
                    self.stroke.push(p);
                }
            }
        }
    }

    /// Primary pointer release: Drawing -> Committed.
    ///
    /// Returns the frozen payload; the caller must submit it to the session
    /// arbiter, commitment here is per-window only.
    pub fn pointer_released(&mut self, p: LogicalPoint) -> Option<SelectionPayload> {
        if self.phase != Phase::Drawing {
            return None;
        }
        self.pointer = Some(p);
        self.phase = Phase::Committed;
        match self.mode {
            CaptureMode::Rectangle => {
                self.end = p;
                Some(SelectionPayload::Region(self.normalized_rect()))
            }
            CaptureMode::Freehand => Some(SelectionPayload::Stroke(std::mem::take(
                &mut self.stroke,
            ))),
        }
    }

    /// Escape/Q at any time: Idle|Drawing -> Cancelled
    pub fn cancel(&mut self) {
        if matches!(self.phase, Phase::Idle | Phase::Drawing) {
            self.phase = Phase::Cancelled;
        }
    }

    /// Normalized rectangle between start and end, valid in any drag order
    pub fn normalized_rect(&self) -> LogicalRect {
        LogicalRect::from_points(self.start, self.end)
    }

    /// Corner rounding radius: `min(24, min(w, h) / 2)`
    pub fn corner_radius(&self) -> f64 {
        let rect = self.normalized_rect();
        MAX_CORNER_RADIUS.min(rect.width.min(rect.height) / 2.0)
    }

    /// The corner nearest the pointer, determined by which quadrant the
    /// pointer occupies relative to the start point. Rendered sharp while
    /// the other three corners are rounded; recomputed every frame.
    pub fn drag_corner(&self) -> Corner {
        let pointer = self.pointer.unwrap_or(self.start);
        let right = pointer.x >= self.start.x;
        let below = pointer.y >= self.start.y;
        match (right, below) {
            (true, true) => Corner::BottomRight,
            (true, false) => Corner::TopRight,
            (false, true) => Corner::BottomLeft,
            (false, false) => Corner::TopLeft,
        }
    }

    /// Per-corner radii in [top-left, top-right, bottom-right, bottom-left]
    /// order, with the drag corner forced to zero
    pub fn corner_radii(&self) -> [f64; 4] {
        let r = self.corner_radius();
        let mut radii = [r; 4];
        let sharp = match self.drag_corner() {
            Corner::TopLeft => 0,
            Corner::TopRight => 1,
            Corner::BottomRight => 2,
            Corner::BottomLeft => 3,
        };
        radii[sharp] = 0.0;
        radii
    }

    /// Dimension label while a rectangle selection is active, shown only
    /// once both extents exceed 10 logical units
    pub fn dimension_label(&self) -> Option<String> {
        if self.mode != CaptureMode::Rectangle || self.phase != Phase::Drawing {
            return None;
        }
        let rect = self.normalized_rect();
        if rect.width > LABEL_MIN_EXTENT && rect.height > LABEL_MIN_EXTENT {
            Some(format!(
                "{} × {}",
                rect.width.round() as i64,
                rect.height.round() as i64
            ))
        } else {
            None
        }
    }
}

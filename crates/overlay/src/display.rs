//! Display mapper
//!
//! Pairs each captured frame with the windowing system's live monitor list.
//! Display identifiers are not guaranteed stable between the capture call
//! and window creation, so matching falls back from name equality to
//! geometry equality; an unmapped frame positions its window from the
//! frame's own recorded geometry.

use capture::Frame;

/// Monitor facts extracted from a live `MonitorHandle`
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayInfo {
    pub name: Option<String>,
    pub position: (i32, i32),
    pub size: (u32, u32),
}

/// Index of the monitor a frame belongs to, or `None` when unmapped
pub fn match_display(frame: &Frame, monitors: &[DisplayInfo]) -> Option<usize> {
    // Tier 1: exact name match
    if let Some(i) = monitors
        .iter()
        .position(|m| m.name.as_deref() == Some(frame.name.as_str()))
    {
        return Some(i);
    }

    // Tier 2: exact geometry match
    monitors.iter().position(|m| {
        m.position.0 as f64 == frame.geometry.x
            && m.position.1 as f64 == frame.geometry.y
            && m.size.0 as f64 == frame.geometry.width
            && m.size.1 as f64 == frame.geometry.height
    })
}

//! xcap-backed frame acquisition
//!
//! `capture_all` runs once, synchronously, before any overlay window is
//! created. The screen has to be captured before it is obscured by the
//! overlay itself.

use crate::frame::{DisplaySnapshot, Frame};
use crate::geometry::LogicalRect;
use crate::{CaptureError, CaptureResult};
use xcap::Monitor;

/// Capture one frame per connected display.
///
/// Returns an error when no display could be captured; the caller is
/// expected to abort the whole process in that case, there is nothing to
/// select from.
pub fn capture_all() -> CaptureResult<Vec<Frame>> {
    let monitors = Monitor::all()?;
    if monitors.is_empty() {
        return Err(CaptureError::NoDisplays);
    }

    let mut frames = Vec::with_capacity(monitors.len());
    for (index, monitor) in monitors.iter().enumerate() {
        let image = monitor.capture_image()?;
        let geometry = LogicalRect::new(
            monitor.x() as f64,
            monitor.y() as f64,
            monitor.width() as f64,
            monitor.height() as f64,
        );
        log::debug!(
            "display {} | {} | {:?} | scale {} | image {}x{}",
            index,
            monitor.name(),
            geometry,
            monitor.scale_factor(),
            image.width(),
            image.height()
        );
        frames.push(Frame::new(
            index,
            monitor.name().to_string(),
            geometry,
            monitor.scale_factor() as f64,
            image,
        ));
    }

    if frames.is_empty() {
        return Err(CaptureError::NoDisplays);
    }
    Ok(frames)
}

/// Snapshot of the current monitor topology, without capturing pixels.
///
/// Used by the display hotplug watcher: acquiring frames twice from the same
/// static configuration yields identical snapshots, so any difference means
/// the captured frames no longer correspond to reality.
pub fn display_snapshot() -> Vec<DisplaySnapshot> {
    match Monitor::all() {
        Ok(monitors) => monitors
            .iter()
            .map(|m| DisplaySnapshot {
                name: m.name().to_string(),
                x: m.x(),
                y: m.y(),
                width: m.width(),
                height: m.height(),
            })
            .collect(),
        Err(e) => {
            log::warn!("monitor enumeration failed: {e}");
            Vec::new()
        }
    }
}

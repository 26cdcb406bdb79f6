//! Display hotplug watcher
//!
//! A monitor added, removed or resized while the overlay is open means the
//! captured frames no longer correspond to reality, so the session has to
//! abort. The watcher polls the monitor topology on a background thread and
//! fires a callback once on the first confirmed change.

use capture::{display_snapshot, DisplaySnapshot};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(300);
const DEBOUNCE: Duration = Duration::from_millis(500);

/// Handle to a running watcher thread
pub struct DisplayWatcher {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl DisplayWatcher {
    /// Start watching; `on_change` fires at most once, from the watcher
    /// thread, after which the thread exits.
    pub fn start<F>(on_change: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = running.clone();

        let handle = thread::spawn(move || {
            let mut monitor = TopologyMonitor::new(display_snapshot);
            while thread_running.load(Ordering::Relaxed) {
                thread::sleep(POLL_INTERVAL);
                if !thread_running.load(Ordering::Relaxed) {
                    break;
                }
                if monitor.check(|| thread::sleep(DEBOUNCE)) {
                    on_change();
                    break;
                }
            }
        });

        Self {
            running,
            handle: Some(handle),
        }
    }

    /// Stop the watcher and join its thread
    pub fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for DisplayWatcher {
    fn drop(&mut self) {
        // Joining here could block the UI thread, the flag is enough
        self.running.store(false, Ordering::Relaxed);
    }
}

/// Snapshot comparator with debouncing, generic over the snapshot source so
/// change detection is testable without real monitors
struct TopologyMonitor<S>
where
    S: FnMut() -> Vec<DisplaySnapshot>,
{
    snapshot: S,
    last: Vec<DisplaySnapshot>,
}

impl<S> TopologyMonitor<S>
where
    S: FnMut() -> Vec<DisplaySnapshot>,
{
    fn new(mut snapshot: S) -> Self {
        let last = snapshot();
        Self { snapshot, last }
    }

    /// True when the topology differs from the baseline and still differs
    /// after the debounce wait (transient glitches are ignored)
    fn check<D: FnOnce()>(&mut self, debounce_wait: D) -> bool {
        let current = (self.snapshot)();
        if current == self.last {
            return false;
        }
        debounce_wait();
        let confirmed = (self.snapshot)();
        if confirmed != self.last {
            self.last = confirmed;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(names: &[&str]) -> Vec<DisplaySnapshot> {
        names
            .iter()
            .map(|n| DisplaySnapshot {
                name: n.to_string(),
                x: 0,
                y: 0,
                width: 1920,
                height: 1080,
            })
            .collect()
    }

    #[test]
    fn unchanged_topology_does_not_fire() {
        let mut monitor = TopologyMonitor::new(|| snap(&["DP-1"]));
        assert!(!monitor.check(|| {}));
        assert!(!monitor.check(|| {}));
    }

    #[test]
    fn confirmed_change_fires_once() {
        let mut calls = 0;
        let mut monitor = TopologyMonitor::new(move || {
            calls += 1;
            if calls == 1 {
                snap(&["DP-1", "HDMI-1"])
            } else {
                snap(&["DP-1"])
            }
        });
        assert!(monitor.check(|| {}));
    }

    #[test]
    fn transient_glitch_is_debounced_away() {
        let mut calls = 0;
        let mut monitor = TopologyMonitor::new(move || {
            calls += 1;
            // Baseline, glitch, back to baseline on confirmation
            if calls == 2 {
                snap(&[])
            } else {
                snap(&["DP-1"])
            }
        });
        assert!(!monitor.check(|| {}));
    }

    #[test]
    fn resolution_change_counts_as_topology_change() {
        let mut calls = 0;
        let mut monitor = TopologyMonitor::new(move || {
            calls += 1;
            let mut s = snap(&["DP-1"]);
            if calls > 1 {
                s[0].width = 2560;
            }
            s
        });
        assert!(monitor.check(|| {}));
    }

    #[test]
    fn watcher_can_stop() {
        let watcher = DisplayWatcher::start(|| {});
        watcher.stop();
    }
}

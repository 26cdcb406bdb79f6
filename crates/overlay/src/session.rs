//! Overlay session
//!
//! Owns the fleet of per-monitor fullscreen windows, wires each to its
//! frame and selection engine, and arbitrates the single session outcome.
//! Any window's commit or cancel ends the whole session; the first terminal
//! event wins and every other window is force-closed without producing a
//! result of its own.

use crate::display::{match_display, DisplayInfo};
use crate::platform::{self, HostStrategy};
use crate::render::Renderer;
use crate::selection::{CaptureMode, SelectionEngine, SelectionPayload};
use crate::watcher::DisplayWatcher;
use crate::{OverlayError, OverlayResult};
use capture::{Frame, LogicalPoint};
use parking_lot::Mutex;
use std::num::NonZeroU32;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use tiny_skia::{IntSize, Pixmap};
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::monitor::MonitorHandle;
use winit::window::{Fullscreen, Window, WindowId, WindowLevel};

/// Terminal outcome of the whole session, created exactly once
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// A selection was committed in the window showing `frame_index`
    Committed {
        frame_index: usize,
        payload: SelectionPayload,
    },
    /// Escape/Q or window close
    Cancelled,
    Aborted(AbortReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// Monitor set changed mid-session; the captured frames are stale
    DisplayReconfigured,
}

/// Events posted into the UI event loop from outside a window
#[derive(Debug, Clone, Copy)]
pub enum SessionEvent {
    DisplayChanged,
}

/// First-writer-wins arbitration for the session outcome.
///
/// Multiple windows can receive near-simultaneous terminal events; only the
/// first `try_decide` stores an outcome, checked-and-set atomically.
pub struct Arbiter {
    decided: AtomicBool,
    outcome: Mutex<Option<SessionOutcome>>,
}

impl Arbiter {
    pub fn new() -> Self {
        Self {
            decided: AtomicBool::new(false),
            outcome: Mutex::new(None),
        }
    }

    /// Store `outcome` if no outcome exists yet; returns whether this call
    /// decided the session
    pub fn try_decide(&self, outcome: SessionOutcome) -> bool {
        if self
            .decided
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }
        *self.outcome.lock() = Some(outcome);
        true
    }

    pub fn is_decided(&self) -> bool {
        self.decided.load(Ordering::SeqCst)
    }

    pub fn take_outcome(&self) -> Option<SessionOutcome> {
        self.outcome.lock().take()
    }
}

impl Default for Arbiter {
    fn default() -> Self {
        Self::new()
    }
}

/// One overlay window bound to one captured frame
struct OverlayHost {
    window: Rc<Window>,
    surface: softbuffer::Surface<Rc<Window>, Rc<Window>>,
    _context: softbuffer::Context<Rc<Window>>,
    background: Pixmap,
    engine: SelectionEngine,
    frame_index: usize,
}

/// The capture session's window fleet and event handling
pub struct OverlaySession<'a> {
    frames: &'a [Frame],
    mode: CaptureMode,
    windows: Vec<OverlayHost>,
    renderer: Renderer,
    arbiter: Arbiter,
    init_error: Option<OverlayError>,
}

impl<'a> OverlaySession<'a> {
    /// Run the interactive session over already-acquired frames; blocks
    /// until a terminal event, then reports the single session outcome.
    pub fn run(frames: &'a [Frame], mode: CaptureMode) -> OverlayResult<SessionOutcome> {
        let event_loop = EventLoop::<SessionEvent>::with_user_event().build()?;
        let proxy = event_loop.create_proxy();
        let watcher = DisplayWatcher::start(move || {
            let _ = proxy.send_event(SessionEvent::DisplayChanged);
        });

        let mut session = OverlaySession {
            frames,
            mode,
            windows: Vec::new(),
            renderer: Renderer::new(),
            arbiter: Arbiter::new(),
            init_error: None,
        };
        let run_result = event_loop.run_app(&mut session);
        watcher.stop();
        run_result?;

        if let Some(e) = session.init_error.take() {
            return Err(e);
        }
        Ok(session
            .arbiter
            .take_outcome()
            .unwrap_or(SessionOutcome::Cancelled))
    }

    fn create_windows(&mut self, event_loop: &ActiveEventLoop) -> OverlayResult<()> {
        let monitors: Vec<MonitorHandle> = event_loop.available_monitors().collect();
        let infos: Vec<DisplayInfo> = monitors
            .iter()
            .map(|m| DisplayInfo {
                name: m.name(),
                position: (m.position().x, m.position().y),
                size: (m.size().width, m.size().height),
            })
            .collect();

        for frame in self.frames {
            let monitor = match_display(frame, &infos).map(|i| monitors[i].clone());
            if monitor.is_none() {
                log::warn!(
                    "display {} ({}) not found in live monitor list, using recorded geometry",
                    frame.index,
                    frame.name
                );
            }
            let host = self.create_host(event_loop, frame, monitor)?;
            self.windows.push(host);
        }
        Ok(())
    }

    fn create_host(
        &self,
        event_loop: &ActiveEventLoop,
        frame: &Frame,
        monitor: Option<MonitorHandle>,
    ) -> OverlayResult<OverlayHost> {
        let mut attrs = Window::default_attributes()
            .with_title("snapcrop")
            .with_decorations(false)
            .with_resizable(false)
            .with_window_level(WindowLevel::AlwaysOnTop)
            .with_visible(false);

        match platform::host_strategy() {
            HostStrategy::Fullscreen => {
                attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(monitor)));
            }
            HostStrategy::Bypass => {
                // Explicit geometry equal to the monitor's bounds; the
                // window manager never places or composites this window
                let (position, size) = match &monitor {
                    Some(m) => (m.position(), m.size()),
                    None => (
                        PhysicalPosition::new(
                            frame.geometry.x as i32,
                            frame.geometry.y as i32,
                        ),
                        PhysicalSize::new(
                            frame.geometry.width as u32,
                            frame.geometry.height as u32,
                        ),
                    ),
                };
                attrs = attrs.with_position(position).with_inner_size(size);
            }
        }
        attrs = platform::apply_window_attributes(attrs);

        let window = Rc::new(event_loop.create_window(attrs)?);
        platform::suppress_window_animations(&window);

        let context = softbuffer::Context::new(window.clone())
            .map_err(|e| OverlayError::Surface(e.to_string()))?;
        let surface = softbuffer::Surface::new(&context, window.clone())
            .map_err(|e| OverlayError::Surface(e.to_string()))?;

        let background = pixmap_from_frame(frame)
            .ok_or_else(|| OverlayError::Surface("empty frame image".into()))?;

        window.set_visible(true);
        window.focus_window();
        window.request_redraw();

        Ok(OverlayHost {
            window,
            surface,
            _context: context,
            background,
            engine: SelectionEngine::new(self.mode),
            frame_index: frame.index,
        })
    }

    /// Submit a terminal event; only the first submission across all
    /// windows wins, after which every window closes and input stops.
    fn decide(&mut self, event_loop: &ActiveEventLoop, outcome: SessionOutcome) {
        if !self.arbiter.try_decide(outcome) {
            return;
        }
        for host in &self.windows {
            host.window.set_visible(false);
        }
        event_loop.exit();
    }

    fn redraw(&mut self, idx: usize) {
        let host = &mut self.windows[idx];
        let size = host.window.inner_size();
        let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return;
        };
        if let Err(e) = host.surface.resize(w, h) {
            log::warn!("surface resize failed: {e}");
            return;
        }
        let Some(mut pixmap) = Pixmap::new(size.width, size.height) else {
            return;
        };
        let scale = host.window.scale_factor() as f32;
        self.renderer
            .render(&mut pixmap, &host.background, &host.engine, scale);

        match host.surface.buffer_mut() {
            Ok(mut buffer) => {
                for (dst, src) in buffer.iter_mut().zip(pixmap.data().chunks_exact(4)) {
                    *dst = ((src[0] as u32) << 16) | ((src[1] as u32) << 8) | (src[2] as u32);
                }
                if let Err(e) = buffer.present() {
                    log::warn!("present failed: {e}");
                }
            }
            Err(e) => log::warn!("buffer acquisition failed: {e}"),
        }
    }
}

impl ApplicationHandler<SessionEvent> for OverlaySession<'_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);
        if !self.windows.is_empty() {
            return;
        }
        if let Err(e) = self.create_windows(event_loop) {
            // Close any already-open windows and abort the session
            self.windows.clear();
            self.init_error = Some(e);
            event_loop.exit();
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: SessionEvent) {
        match event {
            SessionEvent::DisplayChanged => {
                log::warn!("display configuration changed mid-session, aborting");
                self.decide(
                    event_loop,
                    SessionOutcome::Aborted(AbortReason::DisplayReconfigured),
                );
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(idx) = self
            .windows
            .iter()
            .position(|h| h.window.id() == window_id)
        else {
            return;
        };

        match event {
            WindowEvent::RedrawRequested => self.redraw(idx),

            WindowEvent::CloseRequested => {
                // External close is equivalent to cancellation
                self.windows[idx].engine.cancel();
                self.decide(event_loop, SessionOutcome::Cancelled);
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } if is_cancel_key(&logical_key) => {
                self.windows[idx].engine.cancel();
                self.decide(event_loop, SessionOutcome::Cancelled);
            }

            WindowEvent::CursorMoved { position, .. } => {
                if self.arbiter.is_decided() {
                    return;
                }
                let host = &mut self.windows[idx];
                let logical = position.to_logical::<f64>(host.window.scale_factor());
                host.engine
                    .pointer_moved(LogicalPoint::new(logical.x, logical.y));
                host.window.request_redraw();
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                if self.arbiter.is_decided() {
                    return;
                }
                let host = &mut self.windows[idx];
                // A press or release with no known cursor position is
                // dropped; the position arrives with the next CursorMoved
                let Some(at) = host.engine.pointer() else {
                    return;
                };
                match state {
                    ElementState::Pressed => {
                        host.engine.pointer_pressed(at);
                        host.window.request_redraw();
                    }
                    ElementState::Released => {
                        if let Some(payload) = host.engine.pointer_released(at) {
                            let frame_index = host.frame_index;
                            self.decide(
                                event_loop,
                                SessionOutcome::Committed {
                                    frame_index,
                                    payload,
                                },
                            );
                        }
                    }
                }
            }

            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.windows[idx].window.request_redraw();
            }

            _ => {}
        }
    }
}

fn is_cancel_key(key: &Key) -> bool {
    match key {
        Key::Named(NamedKey::Escape) => true,
        Key::Character(c) => c.as_str().eq_ignore_ascii_case("q"),
        _ => false,
    }
}

fn pixmap_from_frame(frame: &Frame) -> Option<Pixmap> {
    let (w, h) = frame.pixel_size();
    let size = IntSize::from_wh(w, h)?;
    // Fully opaque RGBA, so straight and premultiplied are identical
    Pixmap::from_vec(frame.image.as_raw().clone(), size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture::LogicalRect;

    #[test]
    fn arbiter_accepts_only_the_first_outcome() {
        let arbiter = Arbiter::new();
        assert!(!arbiter.is_decided());

        assert!(arbiter.try_decide(SessionOutcome::Cancelled));
        assert!(arbiter.is_decided());

        // A near-simultaneous commit from another window loses
        assert!(!arbiter.try_decide(SessionOutcome::Committed {
            frame_index: 0,
            payload: SelectionPayload::Region(LogicalRect::new(0.0, 0.0, 10.0, 10.0)),
        }));
        assert_eq!(arbiter.take_outcome(), Some(SessionOutcome::Cancelled));
    }

    #[test]
    fn arbiter_outcome_taken_once() {
        let arbiter = Arbiter::new();
        arbiter.try_decide(SessionOutcome::Aborted(AbortReason::DisplayReconfigured));
        assert!(arbiter.take_outcome().is_some());
        assert!(arbiter.take_outcome().is_none());
    }

    #[test]
    fn arbiter_first_writer_wins_across_threads() {
        use std::sync::Arc;

        let arbiter = Arc::new(Arbiter::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let arbiter = arbiter.clone();
            handles.push(std::thread::spawn(move || {
                arbiter.try_decide(SessionOutcome::Committed {
                    frame_index: i,
                    payload: SelectionPayload::Region(LogicalRect::new(
                        0.0, 0.0, 1.0, 1.0,
                    )),
                })
            }));
        }
        let winners: usize = handles
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();
        assert_eq!(winners, 1);
        assert!(arbiter.take_outcome().is_some());
    }

    #[test]
    fn cancel_keys() {
        assert!(is_cancel_key(&Key::Named(NamedKey::Escape)));
        assert!(is_cancel_key(&Key::Character("q".into())));
        assert!(is_cancel_key(&Key::Character("Q".into())));
        assert!(!is_cancel_key(&Key::Character("x".into())));
        assert!(!is_cancel_key(&Key::Named(NamedKey::Enter)));
    }
}

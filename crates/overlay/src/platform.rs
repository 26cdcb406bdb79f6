//! Platform window-manager integration
//!
//! Two concerns live here, both selected at compile time and kept out of the
//! shared session logic:
//!
//! - the window hosting strategy (native fullscreen vs. explicit-geometry
//!   bypass for window managers that draw persistent desktop chrome over
//!   naive fullscreen windows), and
//! - suppression of OS open/close animations after a window is shown. Any
//!   visible flash is a defect, the overlay must appear instantly.

use winit::window::Window;

/// How overlay windows claim their monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStrategy {
    /// Request native borderless fullscreen and let the window manager
    /// size the window to the target monitor
    Fullscreen,
    /// Set explicit geometry equal to the monitor's bounds and skip
    /// window-manager placement entirely (X11 override-redirect), so a top
    /// panel can never sit above the overlay
    Bypass,
}

/// Strategy for the current target platform
pub const fn host_strategy() -> HostStrategy {
    if cfg!(all(unix, not(target_os = "macos"))) {
        HostStrategy::Bypass
    } else {
        HostStrategy::Fullscreen
    }
}

/// Per-target attribute tweaks applied to every overlay window before
/// creation: taskbar/dock skipping, shadow removal, window-manager bypass.
pub fn apply_window_attributes(
    attrs: winit::window::WindowAttributes,
) -> winit::window::WindowAttributes {
    #[cfg(target_os = "windows")]
    let attrs = {
        use winit::platform::windows::WindowAttributesExtWindows;
        attrs.with_skip_taskbar(true)
    };
    #[cfg(target_os = "macos")]
    let attrs = {
        use winit::platform::macos::WindowAttributesExtMacOS;
        attrs.with_has_shadow(false)
    };
    #[cfg(all(unix, not(target_os = "macos")))]
    let attrs = {
        use winit::platform::x11::WindowAttributesExtX11;
        attrs.with_override_redirect(true)
    };
    attrs
}

/// Disable the OS show/close animation for an overlay window.
///
/// Failures are logged and otherwise ignored: a flash is cosmetic, the
/// session must not die over it.
pub fn suppress_window_animations(window: &Window) {
    imp::suppress_window_animations(window);
}

#[cfg(target_os = "windows")]
mod imp {
    use raw_window_handle::{HasWindowHandle, RawWindowHandle};
    use windows::Win32::Foundation::{BOOL, HWND};
    use windows::Win32::Graphics::Dwm::{
        DwmSetWindowAttribute, DWMWA_TRANSITIONS_FORCEDISABLED,
    };
    use winit::window::Window;

    pub fn suppress_window_animations(window: &Window) {
        let handle = match window.window_handle() {
            Ok(h) => h.as_raw(),
            Err(e) => {
                log::warn!("no native window handle: {e}");
                return;
            }
        };
        let RawWindowHandle::Win32(handle) = handle else {
            return;
        };
        let hwnd = HWND(handle.hwnd.get() as *mut core::ffi::c_void);
        let disabled = BOOL::from(true);
        let result = unsafe {
            DwmSetWindowAttribute(
                hwnd,
                DWMWA_TRANSITIONS_FORCEDISABLED,
                &disabled as *const BOOL as *const core::ffi::c_void,
                std::mem::size_of::<BOOL>() as u32,
            )
        };
        if let Err(e) = result {
            log::warn!("DwmSetWindowAttribute failed: {e}");
        }
    }
}

#[cfg(target_os = "macos")]
mod imp {
    use objc2_app_kit::{NSView, NSWindowAnimationBehavior};
    use raw_window_handle::{HasWindowHandle, RawWindowHandle};
    use winit::window::Window;

    /// NSFloatingWindowLevel
    const FLOATING_WINDOW_LEVEL: isize = 5;

    pub fn suppress_window_animations(window: &Window) {
        let handle = match window.window_handle() {
            Ok(h) => h.as_raw(),
            Err(e) => {
                log::warn!("no native window handle: {e}");
                return;
            }
        };
        let RawWindowHandle::AppKit(handle) = handle else {
            return;
        };
        // The AppKit handle carries the content NSView; its window gives us
        // the NSWindow to reconfigure.
        let view = unsafe { &*(handle.ns_view.as_ptr() as *const NSView) };
        let Some(ns_window) = view.window() else {
            log::warn!("NSView has no window");
            return;
        };
        ns_window.setAnimationBehavior(NSWindowAnimationBehavior::None);
        ns_window.setHasShadow(false);
        ns_window.setLevel(FLOATING_WINDOW_LEVEL);
    }
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
mod imp {
    use winit::window::Window;

    // Override-redirect windows never enter the window manager's map
    // animation path, so there is nothing to disable.
    pub fn suppress_window_animations(_window: &Window) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_is_fixed_per_platform() {
        let strategy = host_strategy();
        if cfg!(all(unix, not(target_os = "macos"))) {
            assert_eq!(strategy, HostStrategy::Bypass);
        } else {
            assert_eq!(strategy, HostStrategy::Fullscreen);
        }
    }
}

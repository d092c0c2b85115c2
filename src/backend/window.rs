// Render window - Win32 window and message queue
//
// Class registration is idempotent, the outer rectangle is adjusted so the
// client area matches the requested size, and the message loop is a
// non-blocking peek-and-dispatch pump.

use crate::config::WindowConfig;
use crate::error::{PlatformError, Stage};

/// Win32 error raised when the class name is already registered in this
/// process. The first registration stands, so this is not a failure.
pub const CLASS_ALREADY_EXISTS: u32 = 0x0000_0582;

/// Classify a class-registration outcome: a zero atom is fatal only when
/// the reported error is something other than the class already existing.
pub fn classify_registration(atom: u16, error: u32) -> Result<(), PlatformError> {
    if atom != 0 || error == CLASS_ALREADY_EXISTS {
        return Ok(());
    }
    // HRESULT_FROM_WIN32, so the code field stays an HRESULT everywhere.
    let code = 0x8007_0000 | (error & 0xFFFF);
    Err(PlatformError::new(Stage::Window, code, "RegisterClassW"))
}

/// Requested window attributes. Sizes are for the *client* area; the outer
/// window is larger to account for borders and the title bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowDesc {
    pub title: String,
    pub client_width: u32,
    pub client_height: u32,
    pub fullscreen: bool,
}

impl Default for WindowDesc {
    fn default() -> Self {
        Self {
            title: "Kindling".to_string(),
            client_width: 1024,
            client_height: 768,
            fullscreen: false,
        }
    }
}

impl From<&WindowConfig> for WindowDesc {
    fn from(config: &WindowConfig) -> Self {
        Self {
            title: config.title.clone(),
            client_width: config.width,
            client_height: config.height,
            fullscreen: config.fullscreen,
        }
    }
}

#[cfg(windows)]
pub use self::win32::Win32Window;

#[cfg(windows)]
mod win32 {
    use std::cell::Cell;
    use std::ffi::c_void;

    use windows::core::{w, HSTRING, PCWSTR};
    use windows::Win32::Foundation::{
        GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM,
    };
    use windows::Win32::Graphics::Gdi::{
        GetMonitorInfoW, MonitorFromWindow, UpdateWindow, MONITORINFO, MONITOR_DEFAULTTOPRIMARY,
    };
    use windows::Win32::UI::Input::KeyboardAndMouse::VK_ESCAPE;
    use windows::Win32::UI::WindowsAndMessaging::{
        AdjustWindowRect, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
        GetWindowLongPtrW, LoadCursorW, PeekMessageW, PostQuitMessage, RegisterClassW,
        SetWindowLongPtrW, SetWindowPos, ShowWindow, TranslateMessage, UnregisterClassW,
        CREATESTRUCTW, CS_HREDRAW, CS_OWNDC, CS_VREDRAW, CW_USEDEFAULT, GWLP_USERDATA,
        GWL_STYLE, HWND_TOP, IDC_ARROW, MSG, PM_NOREMOVE, PM_REMOVE, SWP_FRAMECHANGED,
        SWP_NOOWNERZORDER, SW_SHOWDEFAULT, WINDOW_EX_STYLE, WINDOW_STYLE, WM_CLOSE, WM_DESTROY,
        WM_KEYUP, WM_NCCREATE, WM_NCDESTROY, WM_QUIT, WNDCLASSW, WS_CLIPCHILDREN,
        WS_CLIPSIBLINGS, WS_OVERLAPPEDWINDOW, WS_VISIBLE,
    };

    use super::WindowDesc;
    use crate::error::{PlatformError, Stage};

    const CLASS_NAME: PCWSTR = w!("KindlingWindow");
    const STYLE: WINDOW_STYLE = WINDOW_STYLE(
        WS_VISIBLE.0 | WS_CLIPCHILDREN.0 | WS_CLIPSIBLINGS.0 | WS_OVERLAPPEDWINDOW.0,
    );

    /// Per-window state reached from the window procedure through the
    /// GWLP_USERDATA slot.
    #[derive(Default)]
    struct WindowState {
        quit_requested: Cell<bool>,
    }

    /// A created Win32 window. Valid between `create` and `destroy`.
    pub struct Win32Window {
        hwnd: HWND,
        hinstance: HINSTANCE,
        state: Box<WindowState>,
    }

    impl Win32Window {
        /// Register the class, create the window, optionally cover the
        /// owning monitor, and show it.
        pub fn create(hinstance: HINSTANCE, desc: &WindowDesc) -> Result<Self, PlatformError> {
            register_class(hinstance)?;

            // Grow the outer rect so the client area matches the request.
            let mut rect = RECT {
                left: 0,
                top: 0,
                right: desc.client_width as i32,
                bottom: desc.client_height as i32,
            };
            unsafe { AdjustWindowRect(&mut rect, WS_OVERLAPPEDWINDOW, false) }
                .map_err(|e| PlatformError::from_platform(Stage::Window, "AdjustWindowRect", &e))?;

            let state = Box::new(WindowState::default());
            let title = HSTRING::from(desc.title.as_str());
            let hwnd = unsafe {
                CreateWindowExW(
                    WINDOW_EX_STYLE::default(),
                    CLASS_NAME,
                    &title,
                    STYLE,
                    CW_USEDEFAULT,
                    CW_USEDEFAULT,
                    rect.right - rect.left,
                    rect.bottom - rect.top,
                    None,
                    None,
                    Some(hinstance),
                    Some(&*state as *const WindowState as *const c_void),
                )
            }
            .map_err(|e| PlatformError::from_platform(Stage::Window, "CreateWindowExW", &e))?;

            let window = Self {
                hwnd,
                hinstance,
                state,
            };

            if desc.fullscreen {
                window.enter_fullscreen()?;
            }

            unsafe {
                let _ = ShowWindow(window.hwnd, SW_SHOWDEFAULT);
                let _ = UpdateWindow(window.hwnd);
            }

            log::info!(
                "Created window '{}' with client area {}x{}",
                desc.title,
                desc.client_width,
                desc.client_height
            );

            Ok(window)
        }

        pub fn hwnd(&self) -> HWND {
            self.hwnd
        }

        /// Switch to borderless fullscreen covering the owning monitor.
        fn enter_fullscreen(&self) -> Result<(), PlatformError> {
            let monitor = unsafe { MonitorFromWindow(self.hwnd, MONITOR_DEFAULTTOPRIMARY) };
            let mut info = MONITORINFO {
                cbSize: std::mem::size_of::<MONITORINFO>() as u32,
                ..Default::default()
            };
            unsafe { GetMonitorInfoW(monitor, &mut info) }
                .ok()
                .map_err(|e| PlatformError::from_platform(Stage::Window, "GetMonitorInfoW", &e))?;

            unsafe {
                let style = GetWindowLongPtrW(self.hwnd, GWL_STYLE);
                SetWindowLongPtrW(self.hwnd, GWL_STYLE, style & !(WS_OVERLAPPEDWINDOW.0 as isize));
                SetWindowPos(
                    self.hwnd,
                    Some(HWND_TOP),
                    info.rcMonitor.left,
                    info.rcMonitor.top,
                    info.rcMonitor.right - info.rcMonitor.left,
                    info.rcMonitor.bottom - info.rcMonitor.top,
                    SWP_NOOWNERZORDER | SWP_FRAMECHANGED,
                )
                .map_err(|e| PlatformError::from_platform(Stage::Window, "SetWindowPos", &e))?;
            }

            log::info!("Entered fullscreen");
            Ok(())
        }

        /// Drain pending messages without blocking; when none are pending,
        /// yield to the per-frame hook. Returns once quit is observed.
        pub fn message_loop(&mut self) {
            let mut msg = MSG::default();
            unsafe {
                let _ = PeekMessageW(&mut msg, None, 0, 0, PM_NOREMOVE);
            }

            while msg.message != WM_QUIT && !self.state.quit_requested.get() {
                let received = unsafe { PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE) }.as_bool();
                if received {
                    unsafe {
                        let _ = TranslateMessage(&msg);
                        DispatchMessageW(&msg);
                    }
                } else {
                    // Per-frame update/render hook goes here once there is
                    // something to render.
                }
            }

            log::info!("Message loop finished");
        }

        /// Destroy the window and unregister the class. Best-effort.
        pub fn destroy(self) {
            unsafe {
                if let Err(e) = DestroyWindow(self.hwnd) {
                    log::warn!("DestroyWindow failed: {e}");
                }
                if let Err(e) = UnregisterClassW(CLASS_NAME, Some(self.hinstance)) {
                    log::warn!("UnregisterClassW failed: {e}");
                }
            }
        }
    }

    fn register_class(hinstance: HINSTANCE) -> Result<(), PlatformError> {
        let class = WNDCLASSW {
            style: CS_HREDRAW | CS_VREDRAW | CS_OWNDC,
            lpfnWndProc: Some(wndproc),
            hInstance: hinstance,
            hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }.unwrap_or_default(),
            lpszClassName: CLASS_NAME,
            ..Default::default()
        };

        let atom = unsafe { RegisterClassW(&class) };
        let error = if atom == 0 { unsafe { GetLastError() }.0 } else { 0 };
        super::classify_registration(atom, error)
    }

    unsafe fn request_quit(hwnd: HWND) {
        let state = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const WindowState;
        if let Some(state) = state.as_ref() {
            state.quit_requested.set(true);
        }
        PostQuitMessage(0);
    }

    unsafe extern "system" fn wndproc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        match msg {
            WM_NCCREATE => {
                // Bind the per-window state handed through CreateWindowExW.
                let create = lparam.0 as *const CREATESTRUCTW;
                if let Some(create) = create.as_ref() {
                    SetWindowLongPtrW(hwnd, GWLP_USERDATA, create.lpCreateParams as isize);
                }
                DefWindowProcW(hwnd, msg, wparam, lparam)
            }
            WM_NCDESTROY => {
                SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
                DefWindowProcW(hwnd, msg, wparam, lparam)
            }
            WM_KEYUP => {
                if wparam.0 as u16 == VK_ESCAPE.0 {
                    request_quit(hwnd);
                }
                LRESULT(0)
            }
            WM_CLOSE | WM_DESTROY => {
                request_quit(hwnd);
                LRESULT(0)
            }
            _ => DefWindowProcW(hwnd, msg, wparam, lparam),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_client_area_is_1024_by_768() {
        let desc = WindowDesc::default();
        assert_eq!(desc.client_width, 1024);
        assert_eq!(desc.client_height, 768);
        assert!(!desc.fullscreen);
    }

    #[test]
    fn registering_the_class_twice_is_not_fatal() {
        // First registration succeeds with a non-zero atom.
        assert!(classify_registration(0x1234, 0).is_ok());
        // A repeat registration fails with ERROR_CLASS_ALREADY_EXISTS.
        assert!(classify_registration(0, CLASS_ALREADY_EXISTS).is_ok());
    }

    #[test]
    fn any_other_registration_failure_is_fatal() {
        const ERROR_INVALID_PARAMETER: u32 = 0x57;
        let err = classify_registration(0, ERROR_INVALID_PARAMETER).unwrap_err();
        assert_eq!(err.stage, Stage::Window);
        assert_eq!(err.code, 0x8007_0057);
    }

    #[test]
    fn desc_mirrors_window_config() {
        let config = WindowConfig {
            title: "demo".to_string(),
            width: 640,
            height: 480,
            fullscreen: true,
        };
        let desc = WindowDesc::from(&config);
        assert_eq!(desc.title, "demo");
        assert_eq!(desc.client_width, 640);
        assert_eq!(desc.client_height, 480);
        assert!(desc.fullscreen);
    }
}

use displayhop_core::platform::{PositionMode, WindowManager};
use displayhop_core::{PlatformError, Rect, WindowHandle, WindowState};

use windows::Win32::Foundation::{
    E_ACCESSDENIED, ERROR_INVALID_WINDOW_HANDLE, HWND, POINT, RECT,
};
use windows::Win32::Graphics::Gdi::{
    GetMonitorInfoW, MonitorFromPoint, MONITORINFO, MONITOR_DEFAULTTOPRIMARY,
};
use windows::Win32::UI::Input::KeyboardAndMouse::IsWindowEnabled;
use windows::Win32::UI::WindowsAndMessaging::*;

/// Windows 窗口管理器（基于 Win32 API）
pub struct WinWindowManager;

impl Default for WinWindowManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WinWindowManager {
    pub fn new() -> Self {
        Self
    }
}

fn hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.raw() as *mut _)
}

fn to_rect(rect: &RECT) -> Rect {
    Rect::new(
        rect.left,
        rect.top,
        rect.right - rect.left,
        rect.bottom - rect.top,
    )
}

fn to_win_rect(rect: &Rect) -> RECT {
    RECT {
        left: rect.x,
        top: rect.y,
        right: rect.right(),
        bottom: rect.bottom(),
    }
}

/// 把 windows-rs 的错误归类为平台错误
fn map_error(err: windows::core::Error) -> PlatformError {
    let code = err.code();
    if code == E_ACCESSDENIED {
        PlatformError::AccessDenied
    } else if code == ERROR_INVALID_WINDOW_HANDLE.to_hresult() {
        PlatformError::WindowGone
    } else {
        PlatformError::Native(err.message())
    }
}

/// 原生调用失败时，把“拒绝访问”和“句柄失效”提升为错误，其余只记录日志
fn advisory(op: &str, result: windows::core::Result<()>) -> Result<bool, PlatformError> {
    match result {
        Ok(()) => Ok(true),
        Err(err) => match map_error(err) {
            PlatformError::Native(message) => {
                log::debug!("{op} 返回失败: {message}");
                Ok(false)
            }
            terminal => Err(terminal),
        },
    }
}

fn read_placement(hwnd: HWND) -> Option<WINDOWPLACEMENT> {
    let mut placement = WINDOWPLACEMENT {
        length: std::mem::size_of::<WINDOWPLACEMENT>() as u32,
        ..Default::default()
    };
    unsafe { GetWindowPlacement(hwnd, &mut placement).ok()? };
    Some(placement)
}

/// WINDOWPLACEMENT 使用工作区坐标（以主显示器工作区为原点），
/// 返回工作区坐标到屏幕坐标的偏移。工具窗口使用屏幕坐标，偏移为 0。
fn workspace_offset(hwnd: HWND) -> (i32, i32) {
    unsafe {
        let ex_style = GetWindowLongW(hwnd, GWL_EXSTYLE) as u32;
        if ex_style & WS_EX_TOOLWINDOW.0 != 0 {
            return (0, 0);
        }

        let primary = MonitorFromPoint(POINT { x: 0, y: 0 }, MONITOR_DEFAULTTOPRIMARY);
        let mut info = MONITORINFO {
            cbSize: std::mem::size_of::<MONITORINFO>() as u32,
            ..Default::default()
        };
        if !GetMonitorInfoW(primary, &mut info).as_bool() {
            return (0, 0);
        }
        (
            info.rcWork.left - info.rcMonitor.left,
            info.rcWork.top - info.rcMonitor.top,
        )
    }
}

fn read_text(hwnd: HWND, class: bool) -> String {
    let mut buf = [0u16; 512];
    let len = unsafe {
        if class {
            GetClassNameW(hwnd, &mut buf)
        } else {
            GetWindowTextW(hwnd, &mut buf)
        }
    };
    if len <= 0 {
        return String::new();
    }
    String::from_utf16_lossy(&buf[..len as usize])
}

impl WindowManager for WinWindowManager {
    fn foreground_window(&self) -> Option<WindowHandle> {
        let hwnd = unsafe { GetForegroundWindow() };
        if hwnd.0.is_null() {
            return None;
        }
        Some(WindowHandle::from_raw(hwnd.0 as isize))
    }

    fn is_window_valid(&self, handle: WindowHandle) -> bool {
        unsafe { IsWindow(hwnd(handle)).as_bool() }
    }

    fn is_window_movable(&self, handle: WindowHandle) -> bool {
        let hwnd = hwnd(handle);
        unsafe {
            let style = GetWindowLongW(hwnd, GWL_STYLE) as u32;
            style & WS_CHILD.0 == 0 && IsWindowEnabled(hwnd).as_bool()
        }
    }

    fn window_rect(&self, handle: WindowHandle) -> Option<Rect> {
        let mut rect = RECT::default();
        unsafe { GetWindowRect(hwnd(handle), &mut rect).ok()? };
        Some(to_rect(&rect))
    }

    fn window_state(&self, handle: WindowHandle) -> Option<WindowState> {
        let hwnd = hwnd(handle);
        if !self.is_window_valid(handle) {
            return None;
        }
        unsafe {
            Some(WindowState {
                maximized: IsZoomed(hwnd).as_bool(),
                minimized: IsIconic(hwnd).as_bool(),
            })
        }
    }

    fn window_title(&self, handle: WindowHandle) -> String {
        read_text(hwnd(handle), false)
    }

    fn window_class(&self, handle: WindowHandle) -> String {
        read_text(hwnd(handle), true)
    }

    fn restored_rect(&self, handle: WindowHandle) -> Option<Rect> {
        let hwnd = hwnd(handle);
        let placement = read_placement(hwnd)?;
        let (dx, dy) = workspace_offset(hwnd);
        let rect = to_rect(&placement.rcNormalPosition);
        Some(Rect::new(rect.x + dx, rect.y + dy, rect.width, rect.height))
    }

    fn set_window_position(
        &self,
        handle: WindowHandle,
        rect: Rect,
        mode: PositionMode,
    ) -> Result<bool, PlatformError> {
        let mut flags = SWP_NOZORDER | SWP_NOACTIVATE;
        if mode == PositionMode::PositionOnly {
            flags |= SWP_NOSIZE;
        }
        let result = unsafe {
            SetWindowPos(
                hwnd(handle),
                HWND_TOP,
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                flags,
            )
        };
        advisory("SetWindowPos", result)
    }

    fn move_window(&self, handle: WindowHandle, rect: Rect) -> Result<bool, PlatformError> {
        let result = unsafe {
            MoveWindow(
                hwnd(handle),
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                true,
            )
        };
        advisory("MoveWindow", result)
    }

    fn rewrite_maximized_placement(
        &self,
        handle: WindowHandle,
        restored: Rect,
    ) -> Result<bool, PlatformError> {
        let hwnd = hwnd(handle);
        let Some(mut placement) = read_placement(hwnd) else {
            return Err(PlatformError::WindowGone);
        };

        let (dx, dy) = workspace_offset(hwnd);
        placement.rcNormalPosition = to_win_rect(&Rect::new(
            restored.x - dx,
            restored.y - dy,
            restored.width,
            restored.height,
        ));
        placement.showCmd = SW_SHOWMAXIMIZED.0 as u32;

        let written = advisory("SetWindowPlacement", unsafe {
            SetWindowPlacement(hwnd, &placement)
        })?;

        // 强制按新的还原位置重新布局
        let relayout = advisory("SetWindowPos", unsafe {
            SetWindowPos(
                hwnd,
                HWND_TOP,
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE | SWP_FRAMECHANGED,
            )
        })?;

        Ok(written && relayout)
    }

    fn restore_window(&self, handle: WindowHandle) -> Result<(), PlatformError> {
        if !self.is_window_valid(handle) {
            return Err(PlatformError::WindowGone);
        }
        unsafe {
            let _ = ShowWindow(hwnd(handle), SW_RESTORE);
        }
        Ok(())
    }

    fn maximize_window(&self, handle: WindowHandle) -> Result<(), PlatformError> {
        if !self.is_window_valid(handle) {
            return Err(PlatformError::WindowGone);
        }
        unsafe {
            let _ = ShowWindow(hwnd(handle), SW_MAXIMIZE);
        }
        Ok(())
    }
}

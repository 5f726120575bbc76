pub mod hotkey;
pub mod monitor;
pub mod window;

use displayhop_core::platform::{MonitorManager, PositionMode, WindowManager};
use displayhop_core::{DisplayDevice, Dpi, PlatformError, Rect, WindowHandle, WindowState};

/// Windows 平台实现集合
pub struct WinPlatform {
    pub window_manager: window::WinWindowManager,
    pub monitor_manager: monitor::WinMonitorManager,
}

impl Default for WinPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl WinPlatform {
    pub fn new() -> Self {
        Self {
            window_manager: window::WinWindowManager::new(),
            monitor_manager: monitor::WinMonitorManager::new(),
        }
    }
}

/// 进程设为每显示器 DPI 感知（V2），窗口坐标才是物理像素
pub fn set_dpi_awareness() -> bool {
    unsafe {
        use windows::Win32::UI::HiDpi::{
            SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
        };
        SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2).is_ok()
    }
}

impl MonitorManager for WinPlatform {
    fn enumerate_monitors(&self) -> Result<Vec<DisplayDevice>, PlatformError> {
        self.monitor_manager.enumerate_monitors()
    }

    fn query_monitor_dpi(&self, device: &DisplayDevice) -> Option<Dpi> {
        self.monitor_manager.query_monitor_dpi(device)
    }

    fn query_device_dpi(&self, device: &DisplayDevice) -> Option<Dpi> {
        self.monitor_manager.query_device_dpi(device)
    }
}

impl WindowManager for WinPlatform {
    fn foreground_window(&self) -> Option<WindowHandle> {
        self.window_manager.foreground_window()
    }

    fn is_window_valid(&self, handle: WindowHandle) -> bool {
        self.window_manager.is_window_valid(handle)
    }

    fn is_window_movable(&self, handle: WindowHandle) -> bool {
        self.window_manager.is_window_movable(handle)
    }

    fn window_rect(&self, handle: WindowHandle) -> Option<Rect> {
        self.window_manager.window_rect(handle)
    }

    fn window_state(&self, handle: WindowHandle) -> Option<WindowState> {
        self.window_manager.window_state(handle)
    }

    fn window_title(&self, handle: WindowHandle) -> String {
        self.window_manager.window_title(handle)
    }

    fn window_class(&self, handle: WindowHandle) -> String {
        self.window_manager.window_class(handle)
    }

    fn restored_rect(&self, handle: WindowHandle) -> Option<Rect> {
        self.window_manager.restored_rect(handle)
    }

    fn set_window_position(
        &self,
        handle: WindowHandle,
        rect: Rect,
        mode: PositionMode,
    ) -> Result<bool, PlatformError> {
        self.window_manager.set_window_position(handle, rect, mode)
    }

    fn move_window(&self, handle: WindowHandle, rect: Rect) -> Result<bool, PlatformError> {
        self.window_manager.move_window(handle, rect)
    }

    fn rewrite_maximized_placement(
        &self,
        handle: WindowHandle,
        restored: Rect,
    ) -> Result<bool, PlatformError> {
        self.window_manager.rewrite_maximized_placement(handle, restored)
    }

    fn restore_window(&self, handle: WindowHandle) -> Result<(), PlatformError> {
        self.window_manager.restore_window(handle)
    }

    fn maximize_window(&self, handle: WindowHandle) -> Result<(), PlatformError> {
        self.window_manager.maximize_window(handle)
    }
}

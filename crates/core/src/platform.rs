//! 平台边界：引擎只通过这两个 trait 访问原生窗口系统。
//!
//! 所有修改窗口的调用都返回 `Result<bool, PlatformError>`，其中的 `bool`
//! 仅供日志参考。原生接口经常误报成功或失败，是否到位一律以回读的窗口
//! 矩形为准。

use crate::{DisplayDevice, Dpi, PlatformError, Rect, WindowHandle, WindowState};

/// 定位调用的模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionMode {
    /// 只移动，不改变尺寸
    PositionOnly,
    /// 一次调用同时设置位置和尺寸
    PositionAndSize,
}

/// 显示器管理 trait
pub trait MonitorManager {
    /// 按系统枚举顺序返回所有显示器
    fn enumerate_monitors(&self) -> Result<Vec<DisplayDevice>, PlatformError>;

    /// 每显示器 DPI 接口
    fn query_monitor_dpi(&self, device: &DisplayDevice) -> Option<Dpi>;

    /// 设备上下文像素密度
    fn query_device_dpi(&self, device: &DisplayDevice) -> Option<Dpi>;
}

/// 窗口管理 trait
pub trait WindowManager {
    /// 当前前台窗口
    fn foreground_window(&self) -> Option<WindowHandle>;

    /// 句柄是否仍然有效（未被销毁）
    fn is_window_valid(&self, handle: WindowHandle) -> bool;

    /// 窗口是否允许移动（非子窗口、未禁用）
    fn is_window_movable(&self, handle: WindowHandle) -> bool;

    /// 窗口当前的实际矩形（物理像素）
    fn window_rect(&self, handle: WindowHandle) -> Option<Rect>;

    fn window_state(&self, handle: WindowHandle) -> Option<WindowState>;

    fn window_title(&self, handle: WindowHandle) -> String;

    fn window_class(&self, handle: WindowHandle) -> String;

    /// 最大化之前的还原矩形（屏幕坐标）
    fn restored_rect(&self, handle: WindowHandle) -> Option<Rect>;

    /// 通用定位调用
    fn set_window_position(
        &self,
        handle: WindowHandle,
        rect: Rect,
        mode: PositionMode,
    ) -> Result<bool, PlatformError>;

    /// 独立于通用定位的移动原语
    fn move_window(&self, handle: WindowHandle, rect: Rect) -> Result<bool, PlatformError>;

    /// 不还原窗口，直接改写保存的还原矩形并保持最大化，然后强制重新布局
    fn rewrite_maximized_placement(
        &self,
        handle: WindowHandle,
        restored: Rect,
    ) -> Result<bool, PlatformError>;

    fn restore_window(&self, handle: WindowHandle) -> Result<(), PlatformError>;

    fn maximize_window(&self, handle: WindowHandle) -> Result<(), PlatformError>;
}

pub mod config;
pub mod error;
pub mod executor;
pub mod geometry;
pub mod hotkey;
pub mod maximized;
pub mod monitor;
pub mod platform;
pub mod relocate;

#[cfg(test)]
pub(crate) mod fake;

pub use error::{PlatformError, RelocateError};

/// 矩形区域（设备像素，整数坐标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// 与另一个矩形的相交面积，不相交时为 0
    pub fn intersection_area(&self, other: &Rect) -> i64 {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if left < right && top < bottom {
            i64::from(right - left) * i64::from(bottom - top)
        } else {
            0
        }
    }

    /// 是否完全覆盖另一个矩形
    pub fn covers(&self, other: &Rect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && self.right() >= other.right()
            && self.bottom() >= other.bottom()
    }

    /// 四个分量逐一比较，偏差都不超过 `tolerance` 即视为一致
    pub fn within_tolerance(&self, other: &Rect, tolerance: i32) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{}) {}x{}", self.x, self.y, self.width, self.height)
    }
}

/// DPI 缩放比例，1.0 对应 96 DPI
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

impl Scale {
    pub const IDENTITY: Scale = Scale { x: 1.0, y: 1.0 };

    pub fn from_dpi(dpi: Dpi) -> Self {
        Self {
            x: f64::from(dpi.x) / BASE_DPI,
            y: f64::from(dpi.y) / BASE_DPI,
        }
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// 100% 缩放对应的 DPI
pub const BASE_DPI: f64 = 96.0;

/// 原始 DPI 读数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dpi {
    pub x: u32,
    pub y: u32,
}

impl Dpi {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn uniform(dpi: u32) -> Self {
        Self { x: dpi, y: dpi }
    }
}

/// DPI 来源（按优先级）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DpiSource {
    /// 每显示器 DPI 接口
    MonitorApi,
    /// 设备上下文像素密度
    DeviceContext,
    /// 按分辨率估算
    ResolutionHeuristic,
}

/// 平台枚举得到的原始显示器记录
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayDevice {
    /// 平台原生句柄（Windows 上为 HMONITOR）
    pub native_id: isize,
    /// 显示器完整区域（包含任务栏）
    pub full_rect: Rect,
    /// 可用工作区域（排除任务栏）
    pub work_area: Rect,
    pub is_primary: bool,
    /// 设备名，如 `\\.\DISPLAY1`
    pub device_name: String,
}

/// 显示器快照
///
/// 只在一次枚举结果内有效，`index` 跨枚举不保证稳定。
#[derive(Debug, Clone, PartialEq)]
pub struct Monitor {
    pub index: usize,
    pub device_name: String,
    pub full_rect: Rect,
    pub work_area: Rect,
    pub is_primary: bool,
    pub scale: Scale,
    pub dpi_source: DpiSource,
}

/// 窗口句柄（平台无关的包装）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(isize);

impl WindowHandle {
    pub fn from_raw(raw: isize) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> isize {
        self.0
    }
}

impl std::fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// 窗口显示状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowState {
    pub maximized: bool,
    pub minimized: bool,
}

/// 一次移动开始时采集的窗口信息，整个移动过程中只读
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSnapshot {
    pub handle: WindowHandle,
    pub rect: Rect,
    pub is_maximized: bool,
    pub is_minimized: bool,
    pub title: String,
    pub class_name: String,
}

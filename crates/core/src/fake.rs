//! 测试用的内存桌面：实现两个平台 trait，可以模拟原生接口的各种异常行为。

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::monitor::Clock;
use crate::platform::{MonitorManager, PositionMode, WindowManager};
use crate::{DisplayDevice, Dpi, PlatformError, Rect, WindowHandle, WindowState};

/// 最大化窗口超出工作区的边框宽度
pub(crate) const MAXIMIZED_BORDER: i32 = 8;

/// 手动推进的时钟
pub(crate) struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub(crate) fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().unwrap()
    }
}

/// 记录下来的修改类调用
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    SetPosition(Rect, PositionMode),
    MoveWindow(Rect),
    Rewrite(Rect),
    Restore,
    Maximize,
}

/// 窗口对原生调用的反应
#[derive(Debug, Clone, Default)]
pub(crate) struct Behavior {
    /// 原生调用固定返回的值，`None` 表示如实返回
    pub reported: Option<bool>,
    pub ignore_set_position: bool,
    pub ignore_move_window: bool,
    pub ignore_rewrite: bool,
    /// 超过这个距离的单次跳跃会被忽略
    pub max_jump: Option<i32>,
    /// 每次定位的实际结果都偏移这么多像素
    pub drift: i32,
    /// 前 N 次最大化会弹回原来的显示器
    pub maximize_snaps_back: u32,
    pub deny_access: bool,
    /// 第 N 次修改调用之后窗口被销毁
    pub vanish_after: Option<usize>,
}

#[derive(Debug, Clone)]
pub(crate) struct FakeWindow {
    pub rect: Rect,
    pub restored: Rect,
    pub maximized: bool,
    pub minimized: bool,
    pub title: String,
    pub class_name: String,
    pub valid: bool,
    pub movable: bool,
    pub behavior: Behavior,
    home: Rect,
}

impl FakeWindow {
    pub(crate) fn normal(rect: Rect) -> Self {
        Self {
            rect,
            restored: rect,
            maximized: false,
            minimized: false,
            title: "Untitled - Notepad".into(),
            class_name: "Notepad".into(),
            valid: true,
            movable: true,
            behavior: Behavior::default(),
            home: rect,
        }
    }

    pub(crate) fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }
}

struct State {
    devices: Vec<DisplayDevice>,
    monitor_dpi: Vec<Option<Dpi>>,
    device_dpi: Vec<Option<Dpi>>,
    windows: HashMap<isize, FakeWindow>,
    foreground: Option<WindowHandle>,
    calls: Vec<Call>,
}

pub(crate) struct FakeDesktop {
    state: RefCell<State>,
    enumerations: Cell<usize>,
    next_handle: Cell<isize>,
}

impl FakeDesktop {
    pub(crate) fn dual_devices() -> Vec<DisplayDevice> {
        vec![
            device(0, Rect::new(0, 0, 1920, 1080), Rect::new(0, 0, 1920, 1040)),
            device(1, Rect::new(1920, 0, 2560, 1440), Rect::new(1920, 0, 2560, 1400)),
        ]
    }

    /// 两块并排的 100% 缩放显示器
    pub(crate) fn dual() -> Self {
        Self::with_devices(Self::dual_devices())
    }

    pub(crate) fn with_devices(devices: Vec<DisplayDevice>) -> Self {
        let count = devices.len();
        Self {
            state: RefCell::new(State {
                devices,
                monitor_dpi: vec![Some(Dpi::uniform(96)); count],
                device_dpi: vec![None; count],
                windows: HashMap::new(),
                foreground: None,
                calls: Vec::new(),
            }),
            enumerations: Cell::new(0),
            next_handle: Cell::new(0x1000),
        }
    }

    pub(crate) fn set_monitor_dpi(&self, index: usize, dpi: Option<Dpi>) {
        self.state.borrow_mut().monitor_dpi[index] = dpi;
    }

    pub(crate) fn set_device_dpi(&self, index: usize, dpi: Option<Dpi>) {
        self.state.borrow_mut().device_dpi[index] = dpi;
    }

    pub(crate) fn enumeration_count(&self) -> usize {
        self.enumerations.get()
    }

    pub(crate) fn add_window(&self, window: FakeWindow) -> WindowHandle {
        let raw = self.next_handle.get();
        self.next_handle.set(raw + 0x10);
        self.state.borrow_mut().windows.insert(raw, window);
        WindowHandle::from_raw(raw)
    }

    /// 添加窗口并设为前台窗口
    pub(crate) fn focus_window(&self, window: FakeWindow) -> WindowHandle {
        let handle = self.add_window(window);
        self.state.borrow_mut().foreground = Some(handle);
        handle
    }

    /// 添加一个最大化在 `restored` 所在显示器上的窗口并设为前台
    pub(crate) fn focus_maximized(&self, restored: Rect, behavior: Behavior) -> WindowHandle {
        let mut window = FakeWindow::normal(restored).with_behavior(behavior);
        window.rect = self.maximized_rect_for(&restored);
        window.maximized = true;
        self.focus_window(window)
    }

    pub(crate) fn window(&self, handle: WindowHandle) -> FakeWindow {
        self.state.borrow().windows[&handle.raw()].clone()
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    /// 窗口在某显示器上最大化后的矩形（含边框）
    pub(crate) fn maximized_rect_for(&self, rect: &Rect) -> Rect {
        let state = self.state.borrow();
        let work = state
            .devices
            .iter()
            .max_by_key(|d| (rect.intersection_area(&d.work_area), -(d.native_id as i64)))
            .map(|d| d.work_area)
            .unwrap_or_default();
        Rect::new(
            work.x - MAXIMIZED_BORDER,
            work.y - MAXIMIZED_BORDER,
            work.width + 2 * MAXIMIZED_BORDER,
            work.height + 2 * MAXIMIZED_BORDER,
        )
    }

    /// 记录一次修改调用，并按脚本判断窗口是否在此之后消失
    fn record(&self, handle: WindowHandle, call: Call) -> Result<(), PlatformError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        let count = state.calls.len();
        let window = state
            .windows
            .get_mut(&handle.raw())
            .ok_or(PlatformError::WindowGone)?;
        if !window.valid {
            return Err(PlatformError::WindowGone);
        }
        if window.behavior.deny_access {
            return Err(PlatformError::AccessDenied);
        }
        if window.behavior.vanish_after.is_some_and(|n| count > n) {
            window.valid = false;
            return Err(PlatformError::WindowGone);
        }
        Ok(())
    }

    fn reported(&self, handle: WindowHandle, moved: bool) -> bool {
        self.state.borrow().windows[&handle.raw()]
            .behavior
            .reported
            .unwrap_or(moved)
    }

    /// 按窗口行为应用一次定位，返回是否真的移动了
    fn apply_rect(&self, handle: WindowHandle, rect: Rect, ignored: bool) -> bool {
        let mut state = self.state.borrow_mut();
        let window = state.windows.get_mut(&handle.raw()).expect("unknown window");
        let jump = (rect.x - window.rect.x).abs().max((rect.y - window.rect.y).abs());
        if ignored || window.behavior.max_jump.is_some_and(|max| jump > max) {
            return false;
        }
        let drift = window.behavior.drift;
        window.rect = Rect::new(rect.x + drift, rect.y + drift, rect.width, rect.height);
        window.restored = window.rect;
        window.maximized = false;
        true
    }
}

fn device(index: usize, full_rect: Rect, work_area: Rect) -> DisplayDevice {
    DisplayDevice {
        native_id: index as isize,
        full_rect,
        work_area,
        is_primary: index == 0,
        device_name: format!("\\\\.\\DISPLAY{}", index + 1),
    }
}

impl MonitorManager for FakeDesktop {
    fn enumerate_monitors(&self) -> Result<Vec<DisplayDevice>, PlatformError> {
        self.enumerations.set(self.enumerations.get() + 1);
        Ok(self.state.borrow().devices.clone())
    }

    fn query_monitor_dpi(&self, device: &DisplayDevice) -> Option<Dpi> {
        self.state.borrow().monitor_dpi[device.native_id as usize]
    }

    fn query_device_dpi(&self, device: &DisplayDevice) -> Option<Dpi> {
        self.state.borrow().device_dpi[device.native_id as usize]
    }
}

impl WindowManager for FakeDesktop {
    fn foreground_window(&self) -> Option<WindowHandle> {
        self.state.borrow().foreground
    }

    fn is_window_valid(&self, handle: WindowHandle) -> bool {
        self.state
            .borrow()
            .windows
            .get(&handle.raw())
            .is_some_and(|w| w.valid)
    }

    fn is_window_movable(&self, handle: WindowHandle) -> bool {
        self.state
            .borrow()
            .windows
            .get(&handle.raw())
            .is_some_and(|w| w.movable)
    }

    fn window_rect(&self, handle: WindowHandle) -> Option<Rect> {
        let state = self.state.borrow();
        let window = state.windows.get(&handle.raw())?;
        window.valid.then_some(window.rect)
    }

    fn window_state(&self, handle: WindowHandle) -> Option<WindowState> {
        let state = self.state.borrow();
        let window = state.windows.get(&handle.raw())?;
        Some(WindowState {
            maximized: window.maximized,
            minimized: window.minimized,
        })
    }

    fn window_title(&self, handle: WindowHandle) -> String {
        self.state
            .borrow()
            .windows
            .get(&handle.raw())
            .map(|w| w.title.clone())
            .unwrap_or_default()
    }

    fn window_class(&self, handle: WindowHandle) -> String {
        self.state
            .borrow()
            .windows
            .get(&handle.raw())
            .map(|w| w.class_name.clone())
            .unwrap_or_default()
    }

    fn restored_rect(&self, handle: WindowHandle) -> Option<Rect> {
        self.state
            .borrow()
            .windows
            .get(&handle.raw())
            .map(|w| w.restored)
    }

    fn set_window_position(
        &self,
        handle: WindowHandle,
        rect: Rect,
        mode: PositionMode,
    ) -> Result<bool, PlatformError> {
        self.record(handle, Call::SetPosition(rect, mode))?;
        let ignored = self.window(handle).behavior.ignore_set_position;
        let rect = match mode {
            PositionMode::PositionAndSize => rect,
            PositionMode::PositionOnly => {
                let current = self.window(handle).rect;
                Rect::new(rect.x, rect.y, current.width, current.height)
            }
        };
        let moved = self.apply_rect(handle, rect, ignored);
        Ok(self.reported(handle, moved))
    }

    fn move_window(&self, handle: WindowHandle, rect: Rect) -> Result<bool, PlatformError> {
        self.record(handle, Call::MoveWindow(rect))?;
        let ignored = self.window(handle).behavior.ignore_move_window;
        let moved = self.apply_rect(handle, rect, ignored);
        Ok(self.reported(handle, moved))
    }

    fn rewrite_maximized_placement(
        &self,
        handle: WindowHandle,
        restored: Rect,
    ) -> Result<bool, PlatformError> {
        self.record(handle, Call::Rewrite(restored))?;
        let window = self.window(handle);
        if window.behavior.ignore_rewrite {
            return Ok(self.reported(handle, false));
        }
        let maximized = self.maximized_rect_for(&restored);
        {
            let mut state = self.state.borrow_mut();
            let window = state.windows.get_mut(&handle.raw()).expect("unknown window");
            window.restored = restored;
            window.rect = maximized;
            window.maximized = true;
        }
        Ok(self.reported(handle, true))
    }

    fn restore_window(&self, handle: WindowHandle) -> Result<(), PlatformError> {
        self.record(handle, Call::Restore)?;
        let mut state = self.state.borrow_mut();
        let window = state.windows.get_mut(&handle.raw()).expect("unknown window");
        if window.maximized {
            window.rect = window.restored;
            window.maximized = false;
        }
        Ok(())
    }

    fn maximize_window(&self, handle: WindowHandle) -> Result<(), PlatformError> {
        self.record(handle, Call::Maximize)?;
        let window = self.window(handle);
        let basis = if window.behavior.maximize_snaps_back > 0 {
            window.home
        } else {
            window.restored
        };
        let maximized = self.maximized_rect_for(&basis);
        let mut state = self.state.borrow_mut();
        let window = state.windows.get_mut(&handle.raw()).expect("unknown window");
        window.behavior.maximize_snaps_back = window.behavior.maximize_snaps_back.saturating_sub(1);
        window.rect = maximized;
        window.maximized = true;
        Ok(())
    }
}

use std::time::Duration;

use crate::error::ExclusionReason;
use crate::executor::{PlacementExecutor, PlacementResult, DEFAULT_STAGED_SETTLE, DEFAULT_TOLERANCE};
use crate::geometry::{compute_target, PlacementStrategy};
use crate::maximized::{MaximizeTimings, MaximizedWindowHandler, DEFAULT_MAXIMIZED_X_TOLERANCE};
use crate::monitor::{find_monitor_for_rect, next_monitor, MonitorRegistry};
use crate::platform::{MonitorManager, WindowManager};
use crate::{Monitor, Rect, RelocateError, WindowHandle, WindowSnapshot};

/// 不参与移动的系统窗口类名
pub const SYSTEM_WINDOW_CLASSES: [&str; 4] = [
    "Shell_TrayWnd",  // 任务栏
    "DV2ControlHost", // 开始菜单
    "WorkerW",        // 桌面
    "Progman",
];

/// 引擎使用的配置
#[derive(Debug, Clone, PartialEq)]
pub struct RelocateSettings {
    pub strategy: PlacementStrategy,
    pub tolerance_px: i32,
    pub maximized_x_tolerance_px: i32,
    pub exclude_fullscreen: bool,
    pub staged_settle: Duration,
    pub maximize_timings: MaximizeTimings,
}

impl Default for RelocateSettings {
    fn default() -> Self {
        Self {
            strategy: PlacementStrategy::default(),
            tolerance_px: DEFAULT_TOLERANCE,
            maximized_x_tolerance_px: DEFAULT_MAXIMIZED_X_TOLERANCE,
            exclude_fullscreen: true,
            staged_settle: DEFAULT_STAGED_SETTLE,
            maximize_timings: MaximizeTimings::default(),
        }
    }
}

/// 一次成功的移动
#[derive(Debug, Clone, PartialEq)]
pub struct Relocation {
    pub title: String,
    pub from_monitor: usize,
    pub to_monitor: usize,
    /// 计算出的目标矩形（最大化窗口为还原矩形）
    pub target_rect: Rect,
    pub placement: PlacementResult,
}

/// 窗口移动服务：把前台窗口移动到下一个显示器
pub struct RelocationService<P> {
    platform: P,
    registry: MonitorRegistry,
    settings: RelocateSettings,
    executor: PlacementExecutor,
    maximized: MaximizedWindowHandler,
}

impl<P> RelocationService<P>
where
    P: WindowManager + MonitorManager,
{
    pub fn new(platform: P, registry: MonitorRegistry, settings: RelocateSettings) -> Self {
        let executor = PlacementExecutor::new(settings.tolerance_px, settings.staged_settle);
        let maximized = MaximizedWindowHandler::new(
            settings.maximized_x_tolerance_px,
            settings.maximize_timings,
        );
        Self {
            platform,
            registry,
            settings,
            executor,
            maximized,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn settings(&self) -> &RelocateSettings {
        &self.settings
    }

    /// 当前显示器列表（可能来自缓存）
    pub fn list_monitors(&self) -> Result<Vec<Monitor>, RelocateError> {
        self.registry.list_monitors(&self.platform)
    }

    /// 强制重新枚举显示器
    pub fn refresh_monitors(&self) -> Result<Vec<Monitor>, RelocateError> {
        self.registry.refresh(&self.platform)
    }

    /// 把前台窗口移动到下一个显示器
    pub fn relocate_active_window(&self) -> Result<Relocation, RelocateError> {
        let handle = self
            .platform
            .foreground_window()
            .filter(|&h| self.platform.is_window_valid(h))
            .ok_or(RelocateError::NoActiveWindow)?;

        let snapshot = self.capture(handle)?;
        log::debug!(
            "前台窗口: {} ({}) {} 最大化={}",
            snapshot.title,
            snapshot.class_name,
            snapshot.rect,
            snapshot.is_maximized
        );

        if let Some(reason) = basic_exclusion(&snapshot) {
            return Err(RelocateError::WindowExcluded(reason));
        }

        let monitors = self.list_monitors()?;
        let current = find_monitor_for_rect(&snapshot.rect, &monitors)
            .ok_or_else(|| RelocateError::DisplayConfig("无法确定窗口所在显示器".into()))?;

        if self.settings.exclude_fullscreen && is_fullscreen(&snapshot, &monitors[current]) {
            return Err(RelocateError::WindowExcluded(ExclusionReason::Fullscreen));
        }

        let next = next_monitor(current, monitors.len())
            .ok_or_else(|| RelocateError::DisplayConfig("未检测到显示器".into()))?;
        if next == current {
            return Err(RelocateError::SingleMonitor);
        }

        let (source, target) = (&monitors[current], &monitors[next]);
        let relocation = if snapshot.is_maximized {
            self.relocate_maximized(&snapshot, source, target)?
        } else {
            let target_rect = compute_target(
                &snapshot.rect,
                source,
                target,
                self.settings.strategy,
                source.scale,
                target.scale,
            );
            log::debug!("移动窗口: {} -> {target_rect}", snapshot.rect);
            let placement = self
                .executor
                .place(&self.platform, handle, target_rect)?
                .into_verified()?;
            Relocation {
                title: snapshot.title,
                from_monitor: current,
                to_monitor: next,
                target_rect,
                placement,
            }
        };

        log::info!(
            "已将窗口 '{}' 从显示器 {} 移动到显示器 {}，位置 {}",
            relocation.title,
            relocation.from_monitor,
            relocation.to_monitor,
            relocation.placement.final_rect,
        );
        Ok(relocation)
    }

    fn relocate_maximized(
        &self,
        snapshot: &WindowSnapshot,
        source: &Monitor,
        target: &Monitor,
    ) -> Result<Relocation, RelocateError> {
        // 最大化时的矩形是整个工作区，相对尺寸要以还原矩形为准
        let restored = self
            .platform
            .restored_rect(snapshot.handle)
            .unwrap_or_else(|| {
                log::warn!("无法读取窗口 {} 的还原位置，使用当前矩形", snapshot.handle);
                snapshot.rect
            });

        let target_rect = compute_target(
            &restored,
            source,
            target,
            self.settings.strategy,
            source.scale,
            target.scale,
        );
        log::debug!("最大化窗口: 还原矩形 {restored} -> {target_rect}");

        let placement = self
            .maximized
            .relocate(
                &self.platform,
                snapshot.handle,
                target_rect,
                &source.work_area,
                &target.work_area,
            )?
            .into_verified()?;

        Ok(Relocation {
            title: snapshot.title.clone(),
            from_monitor: source.index,
            to_monitor: target.index,
            target_rect,
            placement,
        })
    }

    fn capture(&self, handle: WindowHandle) -> Result<WindowSnapshot, RelocateError> {
        let rect = self
            .platform
            .window_rect(handle)
            .ok_or(RelocateError::NoActiveWindow)?;
        let state = self.platform.window_state(handle).unwrap_or_default();

        Ok(WindowSnapshot {
            handle,
            rect,
            is_maximized: state.maximized,
            is_minimized: state.minimized,
            title: self.platform.window_title(handle),
            class_name: self.platform.window_class(handle),
        })
    }
}

/// 不依赖显示器信息的排除规则
fn basic_exclusion(snapshot: &WindowSnapshot) -> Option<ExclusionReason> {
    if snapshot.is_minimized {
        Some(ExclusionReason::Minimized)
    } else if SYSTEM_WINDOW_CLASSES.contains(&snapshot.class_name.as_str()) {
        Some(ExclusionReason::SystemWindow)
    } else if snapshot.title.trim().is_empty() {
        Some(ExclusionReason::Untitled)
    } else {
        None
    }
}

/// 未最大化却覆盖整个显示器的窗口视为全屏
fn is_fullscreen(snapshot: &WindowSnapshot, monitor: &Monitor) -> bool {
    !snapshot.is_maximized && snapshot.rect.covers(&monitor.full_rect)
}

use std::time::Duration;

use crate::executor::{ensure_movable, read_rect, settle, Attempt, PlacementResult};
use crate::platform::{PositionMode, WindowManager};
use crate::{PlatformError, Rect, RelocateError, WindowHandle};

/// 最大化窗口校验 x 原点时的默认容差
///
/// 重新最大化后部分系统上报告的 y、宽、高并不可靠，所以这里只检查 x
/// 原点是否落在目标显示器的范围内，与普通定位的容差是两回事。
pub const DEFAULT_MAXIMIZED_X_TOLERANCE: i32 = 20;

/// 保守策略中间定位时的尺寸上限
pub const CONSERVATIVE_MAX_WIDTH: i32 = 800;
pub const CONSERVATIVE_MAX_HEIGHT: i32 = 600;

/// 最大化窗口移动的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Maximized,
    Restoring,
    Positioning,
    ReMaximizing,
    Verified,
    Failed,
}

/// 各个阶段之间的停顿
///
/// 还原后立即最大化很容易和窗口管理器抢跑，窗口会弹回原来的显示器。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaximizeTimings {
    pub fast_restore: Duration,
    pub fast_position: Duration,
    pub fast_maximize: Duration,
    pub conservative_restore: Duration,
    pub conservative_position: Duration,
    pub conservative_maximize: Duration,
}

impl Default for MaximizeTimings {
    fn default() -> Self {
        Self {
            fast_restore: Duration::from_millis(50),
            fast_position: Duration::from_millis(30),
            fast_maximize: Duration::from_millis(50),
            conservative_restore: Duration::from_millis(150),
            conservative_position: Duration::from_millis(150),
            conservative_maximize: Duration::from_millis(300),
        }
    }
}

impl MaximizeTimings {
    /// 不停顿，用于测试
    pub fn immediate() -> Self {
        Self {
            fast_restore: Duration::ZERO,
            fast_position: Duration::ZERO,
            fast_maximize: Duration::ZERO,
            conservative_restore: Duration::ZERO,
            conservative_position: Duration::ZERO,
            conservative_maximize: Duration::ZERO,
        }
    }
}

struct PhaseTracker {
    handle: WindowHandle,
    attempt: Attempt,
    phase: Phase,
}

impl PhaseTracker {
    fn new(handle: WindowHandle, attempt: Attempt) -> Self {
        Self {
            handle,
            attempt,
            phase: Phase::Maximized,
        }
    }

    fn enter(&mut self, next: Phase) {
        log::debug!(
            "窗口 {} [{:?}]: {:?} -> {:?}",
            self.handle,
            self.attempt,
            self.phase,
            next
        );
        self.phase = next;
    }
}

/// 原生返回值只记日志；权限和窗口销毁之外的错误也按“可能没生效”处理，
/// 交给最后的校验判断
fn advisory(step: &str, result: Result<bool, PlatformError>) -> Result<(), PlatformError> {
    match result {
        Ok(reported) => {
            log::debug!("{step}: 原生返回 {reported}");
            Ok(())
        }
        Err(PlatformError::Native(msg)) => {
            log::debug!("{step}: 原生调用失败 {msg}");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

trait MaximizeStrategy {
    fn attempt(&self) -> Attempt;

    fn run(
        &self,
        wm: &dyn WindowManager,
        handle: WindowHandle,
        target: Rect,
        tracker: &mut PhaseTracker,
    ) -> Result<(), PlatformError>;
}

/// 不还原窗口，直接改写保存的还原位置，没有闪烁
struct InPlaceRewrite;

impl MaximizeStrategy for InPlaceRewrite {
    fn attempt(&self) -> Attempt {
        Attempt::InPlaceRewrite
    }

    fn run(
        &self,
        wm: &dyn WindowManager,
        handle: WindowHandle,
        target: Rect,
        tracker: &mut PhaseTracker,
    ) -> Result<(), PlatformError> {
        tracker.enter(Phase::Positioning);
        advisory("改写还原位置", wm.rewrite_maximized_placement(handle, target))?;
        tracker.enter(Phase::ReMaximizing);
        Ok(())
    }
}

/// 还原 → 移动 → 最大化；`cap` 为中间定位时的尺寸上限
struct RestoreMoveMaximize {
    attempt: Attempt,
    restore_delay: Duration,
    position_delay: Duration,
    maximize_delay: Duration,
    cap: Option<(i32, i32)>,
}

impl MaximizeStrategy for RestoreMoveMaximize {
    fn attempt(&self) -> Attempt {
        self.attempt
    }

    fn run(
        &self,
        wm: &dyn WindowManager,
        handle: WindowHandle,
        target: Rect,
        tracker: &mut PhaseTracker,
    ) -> Result<(), PlatformError> {
        tracker.enter(Phase::Restoring);
        advisory("还原", wm.restore_window(handle).map(|()| true))?;
        settle(self.restore_delay);

        tracker.enter(Phase::Positioning);
        if let Some((max_width, max_height)) = self.cap {
            let capped = Rect::new(
                target.x,
                target.y,
                target.width.min(max_width),
                target.height.min(max_height),
            );
            advisory(
                "限制尺寸定位",
                wm.set_window_position(handle, capped, PositionMode::PositionAndSize),
            )?;
            settle(self.position_delay);
        }
        advisory(
            "定位",
            wm.set_window_position(handle, target, PositionMode::PositionAndSize),
        )?;
        settle(self.position_delay);

        tracker.enter(Phase::ReMaximizing);
        advisory("最大化", wm.maximize_window(handle).map(|()| true))?;
        settle(self.maximize_delay);
        Ok(())
    }
}

/// 最大化窗口处理器
///
/// 几何计算以窗口的还原矩形为输入，这里只负责把最大化窗口搬到目标显示器
/// 上并保持最大化。三种方式依次尝试，第一个通过校验的生效。
pub struct MaximizedWindowHandler {
    x_tolerance: i32,
    ladder: Vec<Box<dyn MaximizeStrategy + Send + Sync>>,
}

impl Default for MaximizedWindowHandler {
    fn default() -> Self {
        Self::new(DEFAULT_MAXIMIZED_X_TOLERANCE, MaximizeTimings::default())
    }
}

impl MaximizedWindowHandler {
    pub fn new(x_tolerance: i32, timings: MaximizeTimings) -> Self {
        Self {
            x_tolerance,
            ladder: vec![
                Box::new(InPlaceRewrite),
                Box::new(RestoreMoveMaximize {
                    attempt: Attempt::FastRestore,
                    restore_delay: timings.fast_restore,
                    position_delay: timings.fast_position,
                    maximize_delay: timings.fast_maximize,
                    cap: None,
                }),
                Box::new(RestoreMoveMaximize {
                    attempt: Attempt::ConservativeRestore,
                    restore_delay: timings.conservative_restore,
                    position_delay: timings.conservative_position,
                    maximize_delay: timings.conservative_maximize,
                    cap: Some((CONSERVATIVE_MAX_WIDTH, CONSERVATIVE_MAX_HEIGHT)),
                }),
            ],
        }
    }

    /// 把最大化窗口从 `source_work_area` 所在的显示器移到 `target_work_area`
    /// 所在的显示器，`restored_target` 是计算好的还原矩形
    pub fn relocate(
        &self,
        wm: &dyn WindowManager,
        handle: WindowHandle,
        restored_target: Rect,
        source_work_area: &Rect,
        target_work_area: &Rect,
    ) -> Result<PlacementResult, RelocateError> {
        ensure_movable(wm, handle)?;

        let mut observed = read_rect(wm, handle)?;
        let mut attempts = Vec::with_capacity(self.ladder.len());

        for strategy in &self.ladder {
            let attempt = strategy.attempt();
            attempts.push(attempt);

            let mut tracker = PhaseTracker::new(handle, attempt);
            if let Err(err) = strategy.run(wm, handle, restored_target, &mut tracker) {
                if let Some(terminal) = err.into_terminal(handle) {
                    return Err(terminal);
                }
            }

            observed = read_rect(wm, handle)?;
            if self.moved_to(&observed, source_work_area, target_work_area) {
                tracker.enter(Phase::Verified);
                return Ok(PlacementResult {
                    final_rect: observed,
                    verified: true,
                    attempts,
                });
            }
            tracker.enter(Phase::Failed);
            log::debug!("{attempt:?}: 实际 {observed} 不在目标显示器 {target_work_area} 上");
        }

        // 全部失败时至少保持最大化状态
        if let Err(err) = wm.maximize_window(handle) {
            log::warn!("恢复最大化失败: {err}");
        }
        let final_rect = wm.window_rect(handle).unwrap_or(observed);
        log::warn!("最大化窗口 {handle} 未能移到目标显示器，实际 {final_rect}");

        Ok(PlacementResult {
            final_rect,
            verified: false,
            attempts,
        })
    }

    /// x 原点落在目标显示器上，并且窗口与目标工作区的重叠多于源工作区。
    /// 上下排列的显示器 x 范围可能重叠，只看 x 原点会把没动的窗口判为成功。
    fn moved_to(&self, observed: &Rect, source: &Rect, target: &Rect) -> bool {
        self.lands_on(observed, target)
            && observed.intersection_area(target) > observed.intersection_area(source)
    }

    /// x 原点是否落在 `[work.x - tol, work.right - tol)` 内
    fn lands_on(&self, observed: &Rect, work_area: &Rect) -> bool {
        observed.x >= work_area.x - self.x_tolerance
            && observed.x < work_area.right() - self.x_tolerance
    }
}

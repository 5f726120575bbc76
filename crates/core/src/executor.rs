use std::time::Duration;

use crate::platform::{PositionMode, WindowManager};
use crate::{PlatformError, Rect, RelocateError, WindowHandle};

/// 定位校验的默认容差（每个分量，设备像素）
pub const DEFAULT_TOLERANCE: i32 = 10;

/// 分段移动中间停顿的默认时长
pub const DEFAULT_STAGED_SETTLE: Duration = Duration::from_millis(40);

/// 引擎尝试过的策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// 只移动，不改尺寸
    PositionOnly,
    /// 一次调用同时设置位置和尺寸
    PositionAndSize,
    /// 独立的移动原语
    AlternateMove,
    /// 先移动到中间位置，停顿后再移动到目标
    Staged,
    /// 直接改写最大化窗口保存的还原位置
    InPlaceRewrite,
    /// 还原、移动、重新最大化（短停顿）
    FastRestore,
    /// 还原、限制尺寸移动、重新最大化（长停顿）
    ConservativeRestore,
}

/// 一次定位的结果
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementResult {
    /// 最后一次回读到的实际矩形
    pub final_rect: Rect,
    pub verified: bool,
    /// 按顺序记录的尝试过的策略
    pub attempts: Vec<Attempt>,
}

impl PlacementResult {
    /// 未通过校验时转换为 `PlacementUnverified`
    pub fn into_verified(self) -> Result<Self, RelocateError> {
        if self.verified {
            Ok(self)
        } else {
            Err(RelocateError::PlacementUnverified(self))
        }
    }
}

/// 一种定位方式。返回值是原生调用自己报告的结果，仅用于日志
trait MoveStrategy {
    fn attempt(&self) -> Attempt;

    fn apply(
        &self,
        wm: &dyn WindowManager,
        handle: WindowHandle,
        current: Rect,
        target: Rect,
    ) -> Result<bool, PlatformError>;
}

struct PositionOnly;

impl MoveStrategy for PositionOnly {
    fn attempt(&self) -> Attempt {
        Attempt::PositionOnly
    }

    fn apply(
        &self,
        wm: &dyn WindowManager,
        handle: WindowHandle,
        _current: Rect,
        target: Rect,
    ) -> Result<bool, PlatformError> {
        wm.set_window_position(handle, target, PositionMode::PositionOnly)
    }
}

struct PositionAndSize;

impl MoveStrategy for PositionAndSize {
    fn attempt(&self) -> Attempt {
        Attempt::PositionAndSize
    }

    fn apply(
        &self,
        wm: &dyn WindowManager,
        handle: WindowHandle,
        _current: Rect,
        target: Rect,
    ) -> Result<bool, PlatformError> {
        wm.set_window_position(handle, target, PositionMode::PositionAndSize)
    }
}

struct AlternateMove;

impl MoveStrategy for AlternateMove {
    fn attempt(&self) -> Attempt {
        Attempt::AlternateMove
    }

    fn apply(
        &self,
        wm: &dyn WindowManager,
        handle: WindowHandle,
        _current: Rect,
        target: Rect,
    ) -> Result<bool, PlatformError> {
        wm.move_window(handle, target)
    }
}

/// 有些窗口会忽略单次的大跨度移动（例如跨越 DPI 边界），分两段完成
struct Staged {
    settle: Duration,
}

impl MoveStrategy for Staged {
    fn attempt(&self) -> Attempt {
        Attempt::Staged
    }

    fn apply(
        &self,
        wm: &dyn WindowManager,
        handle: WindowHandle,
        current: Rect,
        target: Rect,
    ) -> Result<bool, PlatformError> {
        let midway = midpoint(&current, &target);
        log::debug!("分段移动: 中间位置 {midway}");
        wm.set_window_position(handle, midway, PositionMode::PositionAndSize)?;
        settle(self.settle);
        wm.set_window_position(handle, target, PositionMode::PositionAndSize)
    }
}

fn midpoint(from: &Rect, to: &Rect) -> Rect {
    let mid = |a: i32, b: i32| a + (b - a) / 2;
    Rect::new(
        mid(from.x, to.x),
        mid(from.y, to.y),
        mid(from.width, to.width),
        mid(from.height, to.height),
    )
}

/// 阻塞当前线程等待窗口管理器处理完上一步
pub(crate) fn settle(duration: Duration) {
    if !duration.is_zero() {
        std::thread::sleep(duration);
    }
}

/// 移动前检查句柄仍然有效且窗口允许移动
pub(crate) fn ensure_movable(
    wm: &dyn WindowManager,
    handle: WindowHandle,
) -> Result<(), RelocateError> {
    if !wm.is_window_valid(handle) {
        return Err(RelocateError::InvalidWindow(format!("窗口 {handle} 已不存在")));
    }
    if !wm.is_window_movable(handle) {
        return Err(RelocateError::InvalidWindow(format!(
            "窗口 {handle} 是系统窗口或已禁用"
        )));
    }
    Ok(())
}

/// 回读窗口实际矩形，读不到说明窗口在移动过程中被销毁
pub(crate) fn read_rect(wm: &dyn WindowManager, handle: WindowHandle) -> Result<Rect, RelocateError> {
    wm.window_rect(handle)
        .ok_or_else(|| RelocateError::InvalidWindow(format!("无法读取窗口 {handle} 的位置")))
}

/// 定位执行器
///
/// 原生定位调用的返回值不可信，每次尝试后都回读实际矩形，在容差内即视为
/// 成功；否则按固定顺序换下一种方式重试。
pub struct PlacementExecutor {
    tolerance: i32,
    ladder: Vec<Box<dyn MoveStrategy + Send + Sync>>,
}

impl Default for PlacementExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE, DEFAULT_STAGED_SETTLE)
    }
}

impl PlacementExecutor {
    pub fn new(tolerance: i32, staged_settle: Duration) -> Self {
        Self {
            tolerance,
            ladder: vec![
                Box::new(PositionOnly),
                Box::new(PositionAndSize),
                Box::new(AlternateMove),
                Box::new(Staged {
                    settle: staged_settle,
                }),
            ],
        }
    }

    pub fn tolerance(&self) -> i32 {
        self.tolerance
    }

    /// 把窗口放到 `target`，直到某种方式通过校验或全部失败
    pub fn place(
        &self,
        wm: &dyn WindowManager,
        handle: WindowHandle,
        target: Rect,
    ) -> Result<PlacementResult, RelocateError> {
        ensure_movable(wm, handle)?;

        let mut current = read_rect(wm, handle)?;
        let mut attempts = Vec::with_capacity(self.ladder.len());

        for strategy in &self.ladder {
            let attempt = strategy.attempt();
            attempts.push(attempt);

            let reported = match strategy.apply(wm, handle, current, target) {
                Ok(reported) => Some(reported),
                Err(err) => match err.into_terminal(handle) {
                    Some(terminal) => return Err(terminal),
                    None => None,
                },
            };

            current = read_rect(wm, handle)?;
            let verified = current.within_tolerance(&target, self.tolerance);
            log::debug!(
                "{attempt:?}: 原生返回 {reported:?}，实际 {current}，目标 {target}，校验{}",
                if verified { "通过" } else { "失败" }
            );

            if verified {
                return Ok(PlacementResult {
                    final_rect: current,
                    verified: true,
                    attempts,
                });
            }
        }

        log::warn!("所有定位方式都未能把窗口 {handle} 移到 {target}，实际 {current}");
        Ok(PlacementResult {
            final_rect: current,
            verified: false,
            attempts,
        })
    }
}

use thiserror::Error;

use crate::executor::PlacementResult;

/// 窗口被排除的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    Minimized,
    SystemWindow,
    Untitled,
    Fullscreen,
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Minimized => "窗口已最小化",
            Self::SystemWindow => "系统窗口",
            Self::Untitled => "窗口没有标题",
            Self::Fullscreen => "全屏窗口",
        };
        f.write_str(text)
    }
}

/// 窗口移动失败的原因
#[derive(Debug, Error)]
pub enum RelocateError {
    #[error("没有可移动的活动窗口")]
    NoActiveWindow,

    #[error("窗口被排除: {0}")]
    WindowExcluded(ExclusionReason),

    #[error("只有一个显示器，没有可用的目标")]
    SingleMonitor,

    #[error("显示器配置异常: {0}")]
    DisplayConfig(String),

    #[error("窗口无效或不可移动: {0}")]
    InvalidWindow(String),

    #[error("尝试 {} 种策略后仍未到达目标位置，最终位置 {}", .0.attempts.len(), .0.final_rect)]
    PlacementUnverified(PlacementResult),

    #[error("权限不足: {0}")]
    PermissionDenied(String),
}

impl RelocateError {
    /// 前置条件不满足属于正常结果，调用方无需当作错误处理
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NoActiveWindow | Self::WindowExcluded(_) | Self::SingleMonitor
        )
    }
}

/// 平台调用错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// 权限不足（例如目标是管理员权限进程的窗口）
    #[error("访问被拒绝")]
    AccessDenied,

    #[error("窗口已销毁")]
    WindowGone,

    #[error("{0}")]
    Native(String),
}

impl PlatformError {
    /// 将致命的平台错误转换为移动错误，其余错误返回 `None` 交给重试逻辑
    pub(crate) fn into_terminal(self, handle: crate::WindowHandle) -> Option<RelocateError> {
        match self {
            Self::AccessDenied => Some(RelocateError::PermissionDenied(format!(
                "窗口 {handle} 拒绝了移动请求"
            ))),
            Self::WindowGone => Some(RelocateError::InvalidWindow(format!(
                "窗口 {handle} 已销毁"
            ))),
            Self::Native(_) => None,
        }
    }
}

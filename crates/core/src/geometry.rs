use crate::{Monitor, Rect, Scale};

/// Smart 策略的默认阈值
pub const DEFAULT_SMART_THRESHOLD: f64 = 0.80;

/// 窗口最小可用宽度
pub const MIN_WINDOW_WIDTH: i32 = 100;
/// 窗口最小可用高度
pub const MIN_WINDOW_HEIGHT: i32 = 50;

/// 目标位置的计算策略
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementStrategy {
    /// 在目标工作区居中
    Center,
    /// 保持相对位置
    Relative,
    /// 窗口任一边占比超过阈值时居中，否则保持相对位置
    Smart(f64),
}

impl Default for PlacementStrategy {
    fn default() -> Self {
        Self::Smart(DEFAULT_SMART_THRESHOLD)
    }
}

impl PlacementStrategy {
    /// 将 Smart 化简为 Center 或 Relative
    pub fn resolve(self, frame: &RelativeFrame) -> Self {
        match self {
            Self::Smart(threshold) if frame.width > threshold || frame.height > threshold => {
                Self::Center
            }
            Self::Smart(_) => Self::Relative,
            other => other,
        }
    }
}

/// 窗口相对于工作区的比例（位置与尺寸）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeFrame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RelativeFrame {
    /// 以工作区为参照计算相对比例。工作区某一维为 0 时该维比例取 0.5
    pub fn measure(window: &Rect, work_area: &Rect) -> Self {
        let (x, width) = ratios(window.x, window.width, work_area.x, work_area.width);
        let (y, height) = ratios(window.y, window.height, work_area.y, work_area.height);
        Self { x, y, width, height }
    }
}

fn ratios(pos: i32, len: i32, origin: i32, extent: i32) -> (f64, f64) {
    if extent <= 0 {
        return (0.5, 0.5);
    }
    let extent = f64::from(extent);
    (f64::from(pos - origin) / extent, f64::from(len) / extent)
}

/// 计算窗口移动到目标显示器后的矩形
///
/// 相对比例在源工作区中计算，尺寸按两块屏幕的缩放差修正，以保持物理
/// 占比。最后一步先把尺寸收缩到目标工作区以内，再在目标工作区自己的
/// 坐标范围内夹紧位置；目标原点可以是负数。
pub fn compute_target(
    window: &Rect,
    source: &Monitor,
    target: &Monitor,
    strategy: PlacementStrategy,
    source_scale: Scale,
    target_scale: Scale,
) -> Rect {
    let frame = RelativeFrame::measure(window, &source.work_area);
    let work = &target.work_area;
    let (tx, ty) = (f64::from(work.x), f64::from(work.y));
    let (tw, th) = (f64::from(work.width.max(0)), f64::from(work.height.max(0)));

    let mut width = tw * frame.width * (source_scale.x / target_scale.x);
    let mut height = th * frame.height * (source_scale.y / target_scale.y);

    // 不小于最小可用尺寸，也不超过目标工作区
    width = width.max(f64::from(MIN_WINDOW_WIDTH)).min(tw);
    height = height.max(f64::from(MIN_WINDOW_HEIGHT)).min(th);

    let (x, y) = match strategy.resolve(&frame) {
        PlacementStrategy::Center => (tx + (tw - width) / 2.0, ty + (th - height) / 2.0),
        _ => (tx + frame.x * tw, ty + frame.y * th),
    };

    let x = x.max(tx).min(tx + tw - width);
    let y = y.max(ty).min(ty + th - height);

    log::debug!(
        "相对比例 x={:.1}% y={:.1}% w={:.1}% h={:.1}%，目标 ({:.0},{:.0}) {:.0}x{:.0}",
        frame.x * 100.0,
        frame.y * 100.0,
        frame.width * 100.0,
        frame.height * 100.0,
        x,
        y,
        width,
        height,
    );

    Rect::new(
        x.round() as i32,
        y.round() as i32,
        width.round() as i32,
        height.round() as i32,
    )
}

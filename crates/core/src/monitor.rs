use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::platform::MonitorManager;
use crate::{DisplayDevice, Dpi, DpiSource, Monitor, Rect, RelocateError, Scale};

/// 显示器缓存的默认有效期
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5);

/// 时钟抽象，便于测试中控制缓存过期
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// 系统单调时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CachedMonitors {
    taken_at: Instant,
    monitors: Vec<Monitor>,
}

/// 显示器注册表：枚举显示器、解析 DPI、按 TTL 缓存结果
///
/// 缓存是唯一的共享可变状态，由互斥锁保护，可以在监听线程和其他线程
/// 之间共享。
pub struct MonitorRegistry {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    cache: Mutex<Option<CachedMonitors>>,
}

impl Default for MonitorRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl MonitorRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            cache: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 返回显示器列表，缓存未过期时直接返回缓存内容
    pub fn list_monitors<P>(&self, platform: &P) -> Result<Vec<Monitor>, RelocateError>
    where
        P: MonitorManager + ?Sized,
    {
        let now = self.clock.now();
        {
            let cache = self.lock();
            if let Some(cached) = cache.as_ref() {
                if now.saturating_duration_since(cached.taken_at) < self.ttl {
                    return Ok(cached.monitors.clone());
                }
            }
        }
        self.refresh(platform)
    }

    /// 跳过缓存，强制重新枚举
    pub fn refresh<P>(&self, platform: &P) -> Result<Vec<Monitor>, RelocateError>
    where
        P: MonitorManager + ?Sized,
    {
        let monitors = enumerate(platform)?;
        *self.lock() = Some(CachedMonitors {
            taken_at: self.clock.now(),
            monitors: monitors.clone(),
        });
        Ok(monitors)
    }

    /// 丢弃缓存，下次访问时重新枚举
    pub fn invalidate(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> MutexGuard<'_, Option<CachedMonitors>> {
        self.cache.lock().unwrap_or_else(recover_poisoned)
    }
}

fn recover_poisoned<T>(err: PoisonError<T>) -> T {
    log::warn!("显示器缓存锁已中毒，继续使用其中的数据");
    err.into_inner()
}

fn enumerate<P>(platform: &P) -> Result<Vec<Monitor>, RelocateError>
where
    P: MonitorManager + ?Sized,
{
    let devices = platform
        .enumerate_monitors()
        .map_err(|e| RelocateError::DisplayConfig(format!("枚举显示器失败: {e}")))?;

    if devices.is_empty() {
        return Err(RelocateError::DisplayConfig("没有检测到显示器".into()));
    }

    let mut monitors = Vec::with_capacity(devices.len());
    for (index, device) in devices.into_iter().enumerate() {
        if device.work_area.is_empty() || device.full_rect.is_empty() {
            return Err(RelocateError::DisplayConfig(format!(
                "显示器 {} 的区域无效: 完整区域 {}，工作区 {}",
                device.device_name, device.full_rect, device.work_area
            )));
        }

        let (dpi, dpi_source) = resolve_dpi(platform, &device);
        let scale = Scale::from_dpi(dpi);
        log::debug!(
            "显示器 {index} {}: {} DPI ({:.0}% 缩放, 来源 {:?})",
            device.device_name,
            dpi.x,
            scale.x * 100.0,
            dpi_source,
        );

        monitors.push(Monitor {
            index,
            device_name: device.device_name,
            full_rect: device.full_rect,
            work_area: device.work_area,
            is_primary: device.is_primary,
            scale,
            dpi_source,
        });
    }

    log::debug!("共检测到 {} 个显示器", monitors.len());
    Ok(monitors)
}

/// 依次尝试三种 DPI 来源，取第一个有效结果
fn resolve_dpi<P>(platform: &P, device: &DisplayDevice) -> (Dpi, DpiSource)
where
    P: MonitorManager + ?Sized,
{
    let valid = |dpi: &Dpi| dpi.x > 0 && dpi.y > 0;

    if let Some(dpi) = platform.query_monitor_dpi(device).filter(valid) {
        return (dpi, DpiSource::MonitorApi);
    }
    if let Some(dpi) = platform.query_device_dpi(device).filter(valid) {
        return (dpi, DpiSource::DeviceContext);
    }
    (
        heuristic_dpi(&device.full_rect),
        DpiSource::ResolutionHeuristic,
    )
}

/// 按分辨率估算 DPI，只在两个系统接口都不可用时使用
pub fn heuristic_dpi(full_rect: &Rect) -> Dpi {
    let dpi = match (full_rect.width, full_rect.height) {
        (2560, 1440) | (1920, 1080) | (3440, 1440) => 96,
        // 小分辨率通常是高 DPI 缩放后的逻辑尺寸
        (w, h) if w < 1600 && h < 1000 => 168,
        _ => 96,
    };
    Dpi::uniform(dpi)
}

/// 找到与窗口相交面积最大的显示器（按工作区计算），相同时取索引最小者
pub fn find_monitor_for_rect(rect: &Rect, monitors: &[Monitor]) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (position, monitor) in monitors.iter().enumerate() {
        let area = rect.intersection_area(&monitor.work_area);
        match best {
            Some((_, best_area)) if area <= best_area => {}
            _ => best = Some((position, area)),
        }
    }
    best.map(|(position, _)| position)
}

/// 获取下一个显示器的索引（循环），没有显示器时返回 None
pub fn next_monitor(current: usize, total: usize) -> Option<usize> {
    (current + 1).checked_rem(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeDesktop, ManualClock};

    fn make_monitor(index: usize, x: i32, y: i32, w: i32, h: i32) -> Monitor {
        Monitor {
            index,
            device_name: format!("DISPLAY{}", index + 1),
            full_rect: Rect::new(x, y, w, h),
            work_area: Rect::new(x, y, w, h - 40),
            is_primary: index == 0,
            scale: Scale::IDENTITY,
            dpi_source: DpiSource::MonitorApi,
        }
    }

    #[test]
    fn test_next_monitor() {
        assert_eq!(next_monitor(0, 2), Some(1));
        assert_eq!(next_monitor(1, 2), Some(0));
        assert_eq!(next_monitor(2, 3), Some(0));
        assert_eq!(next_monitor(0, 1), Some(0));
        for n in 1..6 {
            for i in 0..n {
                assert_eq!(next_monitor(i, n), Some((i + 1) % n));
            }
        }
    }

    #[test]
    fn test_next_monitor_without_monitors() {
        assert_eq!(next_monitor(0, 0), None);
        assert_eq!(next_monitor(3, 0), None);
    }

    #[test]
    fn test_find_monitor_by_largest_intersection() {
        let monitors = vec![
            make_monitor(0, 0, 0, 1920, 1080),
            make_monitor(1, 1920, 0, 2560, 1440),
        ];

        assert_eq!(
            find_monitor_for_rect(&Rect::new(100, 100, 800, 600), &monitors),
            Some(0)
        );
        // 大部分在第二块屏幕上
        assert_eq!(
            find_monitor_for_rect(&Rect::new(1800, 100, 800, 600), &monitors),
            Some(1)
        );
        // 跨越两块屏幕且面积相同时取索引小的
        assert_eq!(
            find_monitor_for_rect(&Rect::new(1520, 100, 800, 600), &monitors),
            Some(0)
        );
        assert_eq!(find_monitor_for_rect(&Rect::new(0, 0, 10, 10), &[]), None);
    }

    #[test]
    fn test_find_monitor_ignores_taskbar_strip() {
        let monitors = vec![
            make_monitor(0, 0, 0, 1920, 1080),
            make_monitor(1, 0, 1080, 1920, 1080),
        ];

        // 窗口只压在第一块屏幕的任务栏上，工作区相交面积为 0
        let rect = Rect::new(0, 1050, 400, 300);
        assert_eq!(find_monitor_for_rect(&rect, &monitors), Some(1));
    }

    #[test]
    fn test_heuristic_table() {
        assert_eq!(heuristic_dpi(&Rect::new(0, 0, 2560, 1440)), Dpi::uniform(96));
        assert_eq!(heuristic_dpi(&Rect::new(0, 0, 1920, 1080)), Dpi::uniform(96));
        assert_eq!(heuristic_dpi(&Rect::new(0, 0, 3440, 1440)), Dpi::uniform(96));
        assert_eq!(heuristic_dpi(&Rect::new(0, 0, 1463, 914)), Dpi::uniform(168));
        assert_eq!(heuristic_dpi(&Rect::new(0, 0, 1280, 1024)), Dpi::uniform(96));
        assert_eq!(heuristic_dpi(&Rect::new(0, 0, 3840, 2160)), Dpi::uniform(96));
    }

    #[test]
    fn test_dpi_tiers_fall_through() {
        let desktop = FakeDesktop::dual();
        desktop.set_monitor_dpi(0, None);
        desktop.set_device_dpi(0, Some(Dpi::uniform(144)));
        desktop.set_monitor_dpi(1, Some(Dpi::uniform(0)));
        desktop.set_device_dpi(1, None);

        let registry = MonitorRegistry::default();
        let monitors = registry.list_monitors(&desktop).unwrap();

        assert_eq!(monitors[0].dpi_source, DpiSource::DeviceContext);
        assert_eq!(monitors[0].scale, Scale { x: 1.5, y: 1.5 });
        assert_eq!(monitors[1].dpi_source, DpiSource::ResolutionHeuristic);
        assert_eq!(monitors[1].scale, Scale::IDENTITY);
    }

    #[test]
    fn test_cache_respects_ttl() {
        let desktop = FakeDesktop::dual();
        let clock = Arc::new(ManualClock::new());
        let registry = MonitorRegistry::with_clock(Duration::from_secs(5), clock.clone());

        let first = registry.list_monitors(&desktop).unwrap();
        assert_eq!(desktop.enumeration_count(), 1);

        clock.advance(Duration::from_secs(4));
        let second = registry.list_monitors(&desktop).unwrap();
        assert_eq!(desktop.enumeration_count(), 1);
        assert_eq!(first, second);

        clock.advance(Duration::from_secs(1));
        registry.list_monitors(&desktop).unwrap();
        assert_eq!(desktop.enumeration_count(), 2);
    }

    #[test]
    fn test_refresh_and_invalidate_bypass_cache() {
        let desktop = FakeDesktop::dual();
        let clock = Arc::new(ManualClock::new());
        let registry = MonitorRegistry::with_clock(Duration::from_secs(5), clock);

        registry.list_monitors(&desktop).unwrap();
        registry.refresh(&desktop).unwrap();
        assert_eq!(desktop.enumeration_count(), 2);

        registry.invalidate();
        registry.list_monitors(&desktop).unwrap();
        assert_eq!(desktop.enumeration_count(), 3);
    }

    #[test]
    fn test_registry_shared_across_threads() {
        let registry = MonitorRegistry::default();
        let expected = registry.list_monitors(&FakeDesktop::dual()).unwrap();

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let registry = &registry;
                let expected = &expected;
                scope.spawn(move || {
                    // FakeDesktop 不是 Sync，每个线程各用一个
                    let desktop = FakeDesktop::dual();
                    for _ in 0..50 {
                        if worker % 2 == 0 {
                            registry.invalidate();
                        } else {
                            let monitors = registry.list_monitors(&desktop).unwrap();
                            assert_eq!(&monitors, expected);
                        }
                    }
                });
            }
        });

        assert_eq!(registry.list_monitors(&FakeDesktop::dual()).unwrap(), expected);
    }

    #[test]
    fn test_empty_enumeration_is_display_config_error() {
        let desktop = FakeDesktop::with_devices(Vec::new());
        let registry = MonitorRegistry::default();

        let err = registry.list_monitors(&desktop).unwrap_err();
        assert!(matches!(err, RelocateError::DisplayConfig(_)));

        // 失败的枚举不进入缓存
        registry.list_monitors(&desktop).unwrap_err();
        assert_eq!(desktop.enumeration_count(), 2);
    }

    #[test]
    fn test_degenerate_work_area_is_display_config_error() {
        let mut devices = FakeDesktop::dual_devices();
        devices[1].work_area = Rect::new(1920, 0, 0, 1040);
        let desktop = FakeDesktop::with_devices(devices);

        let err = MonitorRegistry::default()
            .list_monitors(&desktop)
            .unwrap_err();
        assert!(matches!(err, RelocateError::DisplayConfig(_)));
    }
}

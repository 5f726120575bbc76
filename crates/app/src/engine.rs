use displayhop_core::config::AppConfig;
use displayhop_core::monitor::MonitorRegistry;
use displayhop_core::platform::{MonitorManager, WindowManager};
use displayhop_core::relocate::{Relocation, RelocationService};
use displayhop_core::{DpiSource, Monitor, RelocateError};

/// 按配置创建移动服务
pub fn build_service<P>(platform: P, config: &AppConfig) -> RelocationService<P>
where
    P: WindowManager + MonitorManager,
{
    RelocationService::new(
        platform,
        MonitorRegistry::new(config.cache_ttl()),
        config.relocate_settings(),
    )
}

/// 处理一次快捷键触发，返回窗口是否已移动
pub fn handle_trigger<P>(service: &RelocationService<P>) -> bool
where
    P: WindowManager + MonitorManager,
{
    report(&service.relocate_active_window())
}

/// 按结果类型记录日志
pub fn report(outcome: &Result<Relocation, RelocateError>) -> bool {
    match outcome {
        Ok(_) => true,
        Err(e) if e.is_precondition() => {
            log::debug!("跳过: {e}");
            false
        }
        Err(RelocateError::PlacementUnverified(result)) => {
            log::warn!(
                "窗口未能到达目标位置，最终位置 {}，已尝试 {:?}",
                result.final_rect,
                result.attempts
            );
            false
        }
        Err(e) => {
            log::error!("移动窗口失败: {e}");
            false
        }
    }
}

/// 启动时检查显示器数量
pub fn check_monitors<P>(service: &RelocationService<P>)
where
    P: WindowManager + MonitorManager,
{
    match service.list_monitors() {
        Ok(monitors) if monitors.len() < 2 => {
            log::warn!("只检测到 {} 个显示器，快捷键暂时不会移动窗口", monitors.len());
        }
        Ok(monitors) => log::info!("检测到 {} 个显示器", monitors.len()),
        Err(e) => log::warn!("读取显示器信息失败: {e}"),
    }
}

/// 一行显示器描述，供 `monitors` 命令输出
pub fn format_monitor(monitor: &Monitor) -> String {
    let source = match monitor.dpi_source {
        DpiSource::MonitorApi => "系统接口",
        DpiSource::DeviceContext => "设备上下文",
        DpiSource::ResolutionHeuristic => "分辨率估算",
    };
    format!(
        "[{}] {}{}  完整区域 {}  工作区 {}  缩放 {:.0}% ({})",
        monitor.index,
        monitor.device_name,
        if monitor.is_primary { " (主)" } else { "" },
        monitor.full_rect,
        monitor.work_area,
        monitor.scale.x * 100.0,
        source,
    )
}

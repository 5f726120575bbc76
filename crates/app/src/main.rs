mod cli;
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
mod engine;

use anyhow::{Context, Result};
use clap::Parser;
use displayhop_core::config::AppConfig;

use cli::Args;

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// 使用 TCP 端口锁实现单实例检测
#[cfg(target_os = "windows")]
fn try_lock_single_instance() -> bool {
    use std::net::TcpListener;

    // 绑定一个固定的本地端口；成功则说明当前是唯一实例
    match TcpListener::bind("127.0.0.1:57833") {
        Ok(listener) => {
            // 把监听器泄露到堆上，让它在进程退出前一直持有端口
            Box::leak(Box::new(listener));
            true
        }
        Err(_) => false, // 端口被占用，说明已有实例在运行
    }
}

fn load_config(args: &Args) -> Result<AppConfig> {
    match &args.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .context("加载配置失败")
}

#[cfg(target_os = "windows")]
fn run(args: &Args, config: AppConfig) -> Result<bool> {
    use cli::Cmd;
    use displayhop_platform::HotkeyListener;

    if !displayhop_platform::windows::set_dpi_awareness() {
        log::warn!("设置 DPI 感知失败，坐标可能按系统缩放");
    }

    let service = engine::build_service(displayhop_platform::create_platform(), &config);

    match args.command() {
        Cmd::Listen => {
            if !try_lock_single_instance() {
                log::warn!("程序已在运行中，退出");
                return Ok(true);
            }
            if !config.enabled {
                log::info!("配置中已禁用快捷键 (enabled = false)，退出");
                return Ok(true);
            }

            engine::check_monitors(&service);
            let hotkey = config.parsed_hotkey()?;
            let mut listener = displayhop_platform::create_hotkey_listener();
            listener.run(&hotkey, || {
                log::debug!("快捷键 {hotkey} 被按下");
                engine::handle_trigger(&service);
            })?;
            Ok(true)
        }
        Cmd::Move => Ok(engine::handle_trigger(&service)),
        Cmd::Monitors => {
            let monitors = service.refresh_monitors()?;
            for monitor in &monitors {
                println!("{}", engine::format_monitor(monitor));
            }
            Ok(true)
        }
    }
}

#[cfg(not(target_os = "windows"))]
fn run(args: &Args, _config: AppConfig) -> Result<bool> {
    ensure_supported(args).map(|()| false)
}

/// 在读取或创建配置文件之前检查平台
#[cfg(target_os = "windows")]
fn ensure_supported(_args: &Args) -> Result<()> {
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn ensure_supported(args: &Args) -> Result<()> {
    anyhow::bail!("当前平台不支持: {:?} 命令需要 Windows", args.command())
}

fn inner_main(args: &Args) -> Result<bool> {
    ensure_supported(args)?;
    let config = load_config(args)?;

    // 配置决定日志级别，所以先加载配置再初始化日志
    let level = if args.verbose || config.debug_mode {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();

    log::info!("DisplayHop v{} 启动中...", APP_VERSION);
    log::debug!("配置已加载: {:?}", config);

    run(args, config)
}

fn main() {
    let args = Args::parse();

    match inner_main(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            // 日志可能尚未初始化，直接输出到 stderr
            eprintln!("displayhop: {e:?}");
            std::process::exit(1);
        }
    }
}

use anyhow::Result;
use displayhop_core::hotkey::Hotkey;

pub use displayhop_core::platform::{MonitorManager, WindowManager};

/// 全局快捷键监听 trait
pub trait HotkeyListener {
    /// 注册快捷键并在当前线程处理消息，每次按下调用一次回调。
    /// 消息循环结束时注销快捷键并返回。
    fn run<F>(&mut self, hotkey: &Hotkey, callback: F) -> Result<()>
    where
        F: FnMut();

    /// 监听是否处于活跃状态
    fn is_active(&self) -> bool;
}

// 平台实现模块
#[cfg(target_os = "windows")]
pub mod windows;

// 平台工厂函数
#[cfg(target_os = "windows")]
pub fn create_platform() -> windows::WinPlatform {
    windows::WinPlatform::new()
}

#[cfg(target_os = "windows")]
pub fn create_hotkey_listener() -> windows::hotkey::WinHotkeyListener {
    windows::hotkey::WinHotkeyListener::new()
}

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use displayhop_core::hotkey::{Hotkey, Key, Modifiers};

use crate::HotkeyListener;

use windows::Win32::Foundation::HWND;
use windows::Win32::UI::Input::KeyboardAndMouse::*;
use windows::Win32::UI::WindowsAndMessaging::{GetMessageW, MSG, WM_HOTKEY};

const HOTKEY_ID: i32 = 1;

/// Windows 全局快捷键监听（基于 RegisterHotKey，消息发送到线程队列）
pub struct WinHotkeyListener {
    active: Arc<AtomicBool>,
}

impl Default for WinHotkeyListener {
    fn default() -> Self {
        Self::new()
    }
}

impl WinHotkeyListener {
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl HotkeyListener for WinHotkeyListener {
    fn run<F>(&mut self, hotkey: &Hotkey, mut callback: F) -> Result<()>
    where
        F: FnMut(),
    {
        let vk = virtual_key(hotkey.key);
        unsafe {
            RegisterHotKey(HWND::default(), HOTKEY_ID, to_win32(&hotkey.modifiers), vk)
                .with_context(|| format!("注册快捷键 {hotkey} 失败，可能已被其他程序占用"))?;
        }

        self.active.store(true, Ordering::SeqCst);
        log::info!("全局快捷键 {hotkey} 已注册");

        let mut msg = MSG::default();
        unsafe {
            // WM_QUIT 时返回 0，出错时返回 -1
            while GetMessageW(&mut msg, HWND::default(), 0, 0).0 > 0 {
                if msg.message == WM_HOTKEY && msg.wParam.0 as i32 == HOTKEY_ID {
                    callback();
                }
            }
            let _ = UnregisterHotKey(HWND::default(), HOTKEY_ID);
        }

        self.active.store(false, Ordering::SeqCst);
        log::info!("全局快捷键 {hotkey} 已注销");
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

fn to_win32(modifiers: &Modifiers) -> HOT_KEY_MODIFIERS {
    // 按住不放时不重复触发
    let mut mods = MOD_NOREPEAT;
    if modifiers.ctrl {
        mods |= MOD_CONTROL;
    }
    if modifiers.alt {
        mods |= MOD_ALT;
    }
    if modifiers.shift {
        mods |= MOD_SHIFT;
    }
    if modifiers.win {
        mods |= MOD_WIN;
    }
    mods
}

/// 按键对应的虚拟键码
fn virtual_key(key: Key) -> u32 {
    let vk = match key {
        // 字母和数字的虚拟键码就是它们的 ASCII 码
        Key::Letter(c) => return c as u32,
        Key::Digit(d) => return u32::from(b'0' + d),
        Key::Function(n) => return u32::from(VK_F1.0) + u32::from(n) - 1,
        Key::Space => VK_SPACE,
        Key::Tab => VK_TAB,
        Key::Enter => VK_RETURN,
        Key::Escape => VK_ESCAPE,
        Key::Delete => VK_DELETE,
        Key::Insert => VK_INSERT,
        Key::Home => VK_HOME,
        Key::End => VK_END,
        Key::PageUp => VK_PRIOR,
        Key::PageDown => VK_NEXT,
    };
    u32::from(vk.0)
}

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// 快捷键解析错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HotkeyError {
    #[error("快捷键为空")]
    Empty,
    #[error("缺少按键: {0}")]
    MissingKey(String),
    #[error("未知的修饰键: {0}")]
    UnknownModifier(String),
    #[error("重复的修饰键: {0}")]
    DuplicateModifier(String),
    #[error("不支持的按键: {0}")]
    UnknownKey(String),
}

/// 修饰键组合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub win: bool,
}

impl Modifiers {
    pub fn is_empty(&self) -> bool {
        !(self.ctrl || self.alt || self.shift || self.win)
    }
}

/// 可以作为快捷键主键的按键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A-Z，存大写字母
    Letter(char),
    /// 0-9
    Digit(u8),
    /// F1-F24
    Function(u8),
    Space,
    Tab,
    Enter,
    Escape,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
}

impl Key {
    fn parse(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();

        let mut chars = upper.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_uppercase() {
                return Some(Key::Letter(c));
            }
            if let Some(d) = c.to_digit(10) {
                return Some(Key::Digit(d as u8));
            }
        }

        if let Some(n) = upper.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
            return (1..=24).contains(&n).then_some(Key::Function(n));
        }

        let key = match upper.as_str() {
            "SPACE" => Key::Space,
            "TAB" => Key::Tab,
            "ENTER" | "RETURN" => Key::Enter,
            "ESC" | "ESCAPE" => Key::Escape,
            "DELETE" | "DEL" => Key::Delete,
            "INSERT" | "INS" => Key::Insert,
            "HOME" => Key::Home,
            "END" => Key::End,
            "PAGEUP" | "PGUP" => Key::PageUp,
            "PAGEDOWN" | "PGDN" => Key::PageDown,
            _ => return None,
        };
        Some(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Letter(c) => write!(f, "{c}"),
            Key::Digit(d) => write!(f, "{d}"),
            Key::Function(n) => write!(f, "F{n}"),
            Key::Space => f.write_str("Space"),
            Key::Tab => f.write_str("Tab"),
            Key::Enter => f.write_str("Enter"),
            Key::Escape => f.write_str("Esc"),
            Key::Delete => f.write_str("Delete"),
            Key::Insert => f.write_str("Insert"),
            Key::Home => f.write_str("Home"),
            Key::End => f.write_str("End"),
            Key::PageUp => f.write_str("PageUp"),
            Key::PageDown => f.write_str("PageDown"),
        }
    }
}

/// 全局快捷键，例如 `F12` 或 `Ctrl+Alt+M`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hotkey {
    pub modifiers: Modifiers,
    pub key: Key,
}

impl Hotkey {
    /// 解析 `+` 分隔的快捷键字符串，修饰键在前、主键在最后，不区分大小写
    pub fn parse(s: &str) -> Result<Self, HotkeyError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(HotkeyError::Empty);
        }

        let parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let (key, mods) = match parts.split_last() {
            Some((key, mods)) if !key.is_empty() => (*key, mods),
            _ => return Err(HotkeyError::MissingKey(s.to_string())),
        };

        let mut modifiers = Modifiers::default();
        for part in mods {
            let slot = match part.to_ascii_uppercase().as_str() {
                "CTRL" | "CONTROL" => &mut modifiers.ctrl,
                "ALT" => &mut modifiers.alt,
                "SHIFT" => &mut modifiers.shift,
                "WIN" | "SUPER" | "META" => &mut modifiers.win,
                "" => return Err(HotkeyError::MissingKey(s.to_string())),
                _ => return Err(HotkeyError::UnknownModifier(part.to_string())),
            };
            if *slot {
                return Err(HotkeyError::DuplicateModifier(part.to_string()));
            }
            *slot = true;
        }

        let key = match Key::parse(key) {
            Some(key) => key,
            // "Ctrl+Alt" 这种只有修饰键的写法
            None if is_modifier(key) => return Err(HotkeyError::MissingKey(s.to_string())),
            None => return Err(HotkeyError::UnknownKey(key.to_string())),
        };

        Ok(Self { modifiers, key })
    }
}

fn is_modifier(name: &str) -> bool {
    matches!(
        name.to_ascii_uppercase().as_str(),
        "CTRL" | "CONTROL" | "ALT" | "SHIFT" | "WIN" | "SUPER" | "META"
    )
}

impl FromStr for Hotkey {
    type Err = HotkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.modifiers;
        for (on, name) in [(m.ctrl, "Ctrl"), (m.alt, "Alt"), (m.shift, "Shift"), (m.win, "Win")] {
            if on {
                write!(f, "{name}+")?;
            }
        }
        write!(f, "{}", self.key)
    }
}

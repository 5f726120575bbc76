use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::executor::DEFAULT_TOLERANCE;
use crate::geometry::{PlacementStrategy, DEFAULT_SMART_THRESHOLD};
use crate::hotkey::Hotkey;
use crate::maximized::DEFAULT_MAXIMIZED_X_TOLERANCE;
use crate::monitor::DEFAULT_CACHE_TTL;
use crate::relocate::RelocateSettings;

/// 配置文件中的定位策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Center,
    Relative,
    #[default]
    Smart,
}

/// 应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 是否启用快捷键
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// 触发移动的快捷键（如 F12、Ctrl+Alt+M）
    #[serde(default = "default_hotkey")]
    pub hotkey: String,

    /// 目标位置策略：center / relative / smart
    #[serde(default)]
    pub strategy: StrategyKind,

    /// smart 策略下窗口宽或高超过工作区这个比例时改为居中
    #[serde(default = "default_smart_threshold")]
    pub smart_threshold: f64,

    /// 位置校验容差（像素）
    #[serde(default = "default_tolerance_px")]
    pub tolerance_px: i32,

    /// 最大化窗口 x 原点的校验容差（像素）
    #[serde(default = "default_maximized_x_tolerance_px")]
    pub maximized_x_tolerance_px: i32,

    /// 是否跳过全屏窗口
    #[serde(default = "default_true")]
    pub exclude_fullscreen: bool,

    /// 调试模式（输出 debug 日志）
    #[serde(default)]
    pub debug_mode: bool,

    /// 显示器信息缓存时间（毫秒）
    #[serde(default = "default_monitor_cache_ttl_ms")]
    pub monitor_cache_ttl_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_hotkey() -> String {
    "F12".to_string()
}

fn default_smart_threshold() -> f64 {
    DEFAULT_SMART_THRESHOLD
}

fn default_tolerance_px() -> i32 {
    DEFAULT_TOLERANCE
}

fn default_maximized_x_tolerance_px() -> i32 {
    DEFAULT_MAXIMIZED_X_TOLERANCE
}

fn default_monitor_cache_ttl_ms() -> u64 {
    DEFAULT_CACHE_TTL.as_millis() as u64
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hotkey: default_hotkey(),
            strategy: StrategyKind::default(),
            smart_threshold: default_smart_threshold(),
            tolerance_px: default_tolerance_px(),
            maximized_x_tolerance_px: default_maximized_x_tolerance_px(),
            exclude_fullscreen: true,
            debug_mode: false,
            monitor_cache_ttl_ms: default_monitor_cache_ttl_ms(),
        }
    }
}

impl AppConfig {
    /// 获取配置文件路径
    /// - Windows: %APPDATA%/displayhop/config.toml
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("无法获取配置目录")?
            .join("displayhop");

        Ok(config_dir.join("config.toml"))
    }

    /// 从默认位置加载，文件不存在时写入并返回默认配置
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// 保存到默认位置
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// 从指定文件加载，文件不存在时写入并返回默认配置
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            log::info!("已创建默认配置: {}", path.display());
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("配置文件格式错误: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// 保存到指定文件
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("无法创建配置目录: {}", dir.display()))?;
        }

        let content = toml::to_string_pretty(self)
            .context("配置序列化失败")?;

        fs::write(path, content)
            .with_context(|| format!("无法写入配置文件: {}", path.display()))?;

        log::debug!("配置已保存到: {}", path.display());
        Ok(())
    }

    /// 检查各项取值是否有效
    pub fn validate(&self) -> Result<()> {
        if !(self.smart_threshold > 0.0 && self.smart_threshold <= 1.0) {
            bail!("smart_threshold 必须在 (0, 1] 之间: {}", self.smart_threshold);
        }
        if self.tolerance_px <= 0 {
            bail!("tolerance_px 必须大于 0: {}", self.tolerance_px);
        }
        if self.maximized_x_tolerance_px <= 0 {
            bail!(
                "maximized_x_tolerance_px 必须大于 0: {}",
                self.maximized_x_tolerance_px
            );
        }
        self.parsed_hotkey()?;
        Ok(())
    }

    pub fn parsed_hotkey(&self) -> Result<Hotkey> {
        Hotkey::parse(&self.hotkey)
            .with_context(|| format!("无效的快捷键: {}", self.hotkey))
    }

    pub fn placement_strategy(&self) -> PlacementStrategy {
        match self.strategy {
            StrategyKind::Center => PlacementStrategy::Center,
            StrategyKind::Relative => PlacementStrategy::Relative,
            StrategyKind::Smart => PlacementStrategy::Smart(self.smart_threshold),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.monitor_cache_ttl_ms)
    }

    /// 转换为引擎使用的设置
    pub fn relocate_settings(&self) -> RelocateSettings {
        RelocateSettings {
            strategy: self.placement_strategy(),
            tolerance_px: self.tolerance_px,
            maximized_x_tolerance_px: self.maximized_x_tolerance_px,
            exclude_fullscreen: self.exclude_fullscreen,
            ..RelocateSettings::default()
        }
    }
}

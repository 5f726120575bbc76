use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "displayhop",
    version,
    about = "按快捷键把当前窗口移动到下一个显示器"
)]
pub struct Args {
    /// 配置文件路径（默认: 系统配置目录/displayhop/config.toml）
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// 输出 debug 日志
    #[arg(short = 'v', long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Option<Cmd>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Cmd {
    /// 注册全局快捷键并常驻（默认）
    Listen,

    /// 立即移动一次当前前台窗口
    Move,

    /// 列出显示器信息
    Monitors,
}

impl Args {
    pub fn command(&self) -> Cmd {
        self.cmd.unwrap_or(Cmd::Listen)
    }
}

//! CLI 命令行参数解析
//!
//! 使用 clap 定义命令行接口并进行参数解析

use crate::settings::Overrides;
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Freeze every thread of a running application for a few seconds
#[derive(Parser, Debug, Clone)]
#[command(name = "gtappl", version, about, long_about = None)]
pub struct Cli {
    /// 目标程序名称（默认 GTA）
    #[arg(short, long, global = true)]
    pub target: Option<String>,

    /// 配置文件路径（默认 ~/.gtappl/config.json）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 日志级别或过滤表达式 (trace, debug, info, warn, error)
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// 挂起目标，倒计时后自动恢复（默认命令）
    Freeze {
        /// 固定冻结秒数，不指定则随机
        #[arg(short, long)]
        seconds: Option<f64>,
    },
    /// 列出目标的进程与线程
    List,
    /// 仅挂起目标（需要之后手动 resume）
    Suspend,
    /// 恢复目标的所有线程
    Resume,
}

impl Cli {
    pub fn parse_command() -> Self {
        Self::parse()
    }

    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args)
    }

    /// 没有子命令时执行 freeze
    pub fn command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Freeze { seconds: None })
    }

    /// 命令行中可覆盖配置的部分
    pub fn overrides(&self) -> Overrides {
        let pause_secs = match &self.command {
            Some(Commands::Freeze { seconds }) => *seconds,
            _ => None,
        };
        Overrides {
            target: self.target.clone(),
            log_level: self.log_level.clone(),
            pause_secs,
        }
    }
}

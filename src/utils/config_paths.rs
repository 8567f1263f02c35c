//! 配置路径管理
//!
//! 管理所有配置文件的路径
//!
//! 设计原则:
//! - 持久化配置保存在 ~/.gtappl/config.json
//! - 运行时数据（日志）保存在系统临时目录 .gtappl/ 下

use crate::config::{APP_DIRECTORY, CONFIG_FILE_NAME, LOG_FILE_NAME};
use crate::error::{errors, FreezeError, FreezeResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 用户配置（从 config.json 读取），所有字段可选
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    /// 目标程序名称（默认 GTA）
    #[serde(default)]
    pub target: Option<String>,
    /// 最短暂停秒数
    #[serde(default)]
    pub min_pause_secs: Option<u64>,
    /// 最长暂停秒数（不含）
    #[serde(default)]
    pub max_pause_secs: Option<u64>,
    /// 倒计时刷新间隔（毫秒）
    #[serde(default)]
    pub refresh_ms: Option<u64>,
    /// 挂起前等待（毫秒）
    #[serde(default)]
    pub lock_delay_ms: Option<u64>,
    /// 日志级别
    #[serde(default)]
    pub log_level: Option<String>,
    /// 是否写日志文件
    #[serde(default)]
    pub log_to_file: Option<bool>,
}

impl UserConfig {
    /// 从配置文件加载；文件不存在时返回默认配置
    pub fn load(config_file: &Path) -> FreezeResult<Self> {
        if !config_file.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_file).map_err(|err| {
            errors::filesystem_error(
                "cannot read config file",
                config_file.display().to_string(),
                Some(Box::new(err)),
            )
        })?;

        serde_json::from_str(&content).map_err(|err| {
            errors::config_error_with_source(
                format!("invalid config file {}", config_file.display()),
                err,
            )
        })
    }
}

/// 配置文件路径集合
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// 持久化配置目录（~/.gtappl/）
    pub config_dir: PathBuf,
    /// 运行时数据目录（临时目录/.gtappl/）
    pub runtime_dir: PathBuf,
    /// 主配置文件
    pub config_file: PathBuf,
    /// 日志文件（保存在运行时目录）
    pub log_file: PathBuf,
}

impl ConfigPaths {
    /// 创建配置路径
    pub fn new() -> FreezeResult<Self> {
        let home_dir =
            dirs::home_dir().ok_or_else(|| errors::config_error("Cannot find home directory"))?;
        Ok(Self::with_roots(&home_dir, &std::env::temp_dir()))
    }

    /// 以指定根目录创建（测试使用）
    pub fn with_roots(home_dir: &Path, temp_dir: &Path) -> Self {
        let config_dir = home_dir.join(APP_DIRECTORY);
        let runtime_dir = temp_dir.join(APP_DIRECTORY);

        Self {
            config_file: config_dir.join(CONFIG_FILE_NAME),
            log_file: runtime_dir.join(LOG_FILE_NAME),
            config_dir,
            runtime_dir,
        }
    }

    /// 使用显式指定的配置文件
    pub fn with_config_file(mut self, config_file: PathBuf) -> Self {
        self.config_file = config_file;
        self
    }

    /// 确保运行时目录存在
    pub fn ensure_runtime_dir(&self) -> Result<(), FreezeError> {
        std::fs::create_dir_all(&self.runtime_dir)?;
        Ok(())
    }
}

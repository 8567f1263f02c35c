//! 工具模块
//!
//! 提供配置路径与日志初始化

pub mod config_paths;
pub mod logger;

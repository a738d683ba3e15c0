//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::time::Duration;

use crate::application::DEFAULT_NAMESPACE;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 阅读会话配置
    #[serde(default)]
    pub session: SessionConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Sled 数据库路径
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// 键前缀
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// 每次写入后同步落盘
    #[serde(default = "default_flush_on_write")]
    pub flush_on_write: bool,
}

fn default_db_path() -> String {
    "data/sumi.sled".to_string()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_flush_on_write() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            namespace: default_namespace(),
            flush_on_write: default_flush_on_write(),
        }
    }
}

/// 阅读会话配置
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// 自动保存间隔（秒）
    #[serde(default = "default_auto_save_interval")]
    pub auto_save_interval_secs: u64,

    /// 计入统计的最短会话时长（毫秒）
    #[serde(default = "default_min_session_ms")]
    pub min_session_ms: i64,
}

fn default_auto_save_interval() -> u64 {
    30
}

fn default_min_session_ms() -> i64 {
    5_000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_save_interval_secs: default_auto_save_interval(),
            min_session_ms: default_min_session_ms(),
        }
    }
}

impl SessionConfig {
    pub fn auto_save_interval(&self) -> Duration {
        Duration::from_secs(self.auto_save_interval_secs)
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// # 环境变量示例
/// - `SUMI_STORAGE__DB_PATH=/var/lib/sumi/state.sled`
/// - `SUMI_STORAGE__FLUSH_ON_WRITE=false`
/// - `SUMI_SESSION__AUTO_SAVE_INTERVAL_SECS=10`
/// - `SUMI_LOG__LEVEL=debug`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// `config_path` 为 None 时搜索默认配置文件（可选）
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    builder = builder
        .set_default("storage.db_path", "data/sumi.sled")?
        .set_default("storage.namespace", "sumi:")?
        .set_default("storage.flush_on_write", true)?
        .set_default("session.auto_save_interval_secs", 30)?
        .set_default("session.min_session_ms", 5_000)?
        .set_default("log.level", "info")?;

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 前缀 SUMI_，层级分隔符 __
    builder = builder.add_source(
        Environment::with_prefix("SUMI")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.storage.db_path.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Storage db_path cannot be empty".to_string(),
        ));
    }

    if config.storage.namespace.is_empty() {
        return Err(ConfigError::ValidationError(
            "Storage namespace cannot be empty".to_string(),
        ));
    }

    if config.session.auto_save_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Session auto-save interval cannot be 0".to_string(),
        ));
    }

    if config.session.min_session_ms < 0 {
        return Err(ConfigError::ValidationError(
            "Minimum session length cannot be negative".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Database: {}", config.storage.db_path);
    tracing::info!("Key Namespace: {}", config.storage.namespace);
    tracing::info!("Flush On Write: {}", config.storage.flush_on_write);
    tracing::info!("Auto-save Interval: {}s", config.session.auto_save_interval_secs);
    tracing::info!("Minimum Session: {}ms", config.session.min_session_ms);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

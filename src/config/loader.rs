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
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `VOCALIQ_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `VOCALIQ_SERVER__PORT=8080`
/// - `VOCALIQ_BACKEND__URL=http://beat-server:10000`
/// - `VOCALIQ_AUTH__ENABLED=true`
/// - `VOCALIQ_AUTH__TOKENS=token-a,token-b`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5070)?
        .set_default("backend.url", "http://localhost:10000")?
        .set_default("backend.timeout_secs", 120)?
        .set_default("backend.fake", false)?
        .set_default("playback.handle_ttl_secs", 3600)?
        .set_default("playback.max_upload_size", 50 * 1024 * 1024)?
        .set_default("auth.enabled", false)?
        .set_default("gc.enabled", true)?
        .set_default("gc.interval_secs", 60)?
        .set_default("log.level", "info")?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: VOCALIQ_BACKEND__URL=http://beat-server:10000
    builder = builder.add_source(
        Environment::with_prefix("VOCALIQ")
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("auth.tokens")
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
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    let url = config.backend.url.trim();
    if url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Backend URL cannot be empty".to_string(),
        ));
    }
    if !config.backend.fake && !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "Backend URL must start with http:// or https://: {}",
            url
        )));
    }

    if config.backend.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Backend timeout cannot be 0".to_string(),
        ));
    }

    if config.playback.handle_ttl_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Playback handle TTL cannot be 0".to_string(),
        ));
    }

    if config.auth.enabled && config.auth.tokens.iter().all(|t| t.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "Auth is enabled but no tokens are configured".to_string(),
        ));
    }

    if config.gc.enabled && config.gc.interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "GC interval cannot be 0 when GC is enabled".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Public Base URL: {}", config.server.public_base_url());
    if config.backend.fake {
        tracing::info!("Backend: built-in demo");
    } else {
        tracing::info!("Backend URL: {}", config.backend.url);
    }
    tracing::info!("Backend Timeout: {}s", config.backend.timeout_secs);
    tracing::info!("Handle TTL: {}s", config.playback.handle_ttl_secs);
    tracing::info!("Max Upload Size: {} bytes", config.playback.max_upload_size);
    tracing::info!("Auth Enabled: {}", config.auth.enabled);
    tracing::info!("GC Enabled: {}", config.gc.enabled);
    if config.gc.enabled {
        tracing::info!("GC Interval: {}s", config.gc.interval_secs);
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

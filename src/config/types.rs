//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::generation::GenerationSettings;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 生成后端配置
    #[serde(default)]
    pub backend: BackendConfig,

    /// 播放句柄配置
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// 鉴权配置
    #[serde(default)]
    pub auth: AuthConfig,

    /// GC 配置
    #[serde(default)]
    pub gc: GcConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,

    /// 默认生成设置
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 公开访问的 Base URL，用于拼接句柄的播放地址
    /// 如果未设置，则使用 http://{host}:{port}
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5070
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 获取公开的 Base URL
    pub fn public_base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| {
            let host = if self.host == "0.0.0.0" {
                "localhost"
            } else {
                &self.host
            };
            format!("http://{}:{}", host, self.port)
        })
    }
}

/// 生成后端配置
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// 生成服务基础 URL
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// 每次网络调用的超时时间（秒）
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,

    /// 使用内置演示后端，不访问 url
    #[serde(default)]
    pub fake: bool,
}

fn default_backend_url() -> String {
    "http://localhost:10000".to_string()
}

fn default_backend_timeout() -> u64 {
    120
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            timeout_secs: default_backend_timeout(),
            fake: false,
        }
    }
}

/// 播放句柄配置
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackConfig {
    /// 句柄存活时间（秒），过期后由 GC 释放
    #[serde(default = "default_handle_ttl")]
    pub handle_ttl_secs: u64,

    /// 请求体最大大小（字节），包含 base64 附件
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

fn default_handle_ttl() -> u64 {
    3600 // 1 小时
}

fn default_max_upload_size() -> u64 {
    50 * 1024 * 1024 // 50 MB
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            handle_ttl_secs: default_handle_ttl(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

/// 鉴权配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// 是否要求 bearer token
    #[serde(default)]
    pub enabled: bool,

    /// 有效的 bearer token 列表
    #[serde(default)]
    pub tokens: Vec<String>,
}

/// GC（垃圾回收）配置
#[derive(Debug, Clone, Deserialize)]
pub struct GcConfig {
    /// 是否启用自动 GC
    #[serde(default = "default_gc_enabled")]
    pub enabled: bool,

    /// GC 间隔时间（秒）
    #[serde(default = "default_gc_interval")]
    pub interval_secs: u64,
}

fn default_gc_enabled() -> bool {
    true
}

fn default_gc_interval() -> u64 {
    60
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            enabled: default_gc_enabled(),
            interval_secs: default_gc_interval(),
        }
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

/// 默认生成设置
///
/// 配置源会把键名转为小写，这里用具名字段承载，发给后端时再转成 camelCase
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_drum_style")]
    pub drum_style: String,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_drum_style() -> String {
    "pop".to_string()
}

fn default_system_prompt() -> String {
    "Generate high-quality audio.".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            drum_style: default_drum_style(),
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
        }
    }
}

impl GenerationConfig {
    /// 转换为请求里的 settings 对象
    pub fn to_settings(&self) -> GenerationSettings {
        let mut map = Map::new();
        map.insert("drumStyle".to_string(), Value::from(self.drum_style.clone()));
        map.insert(
            "systemPrompt".to_string(),
            Value::from(self.system_prompt.clone()),
        );
        map.insert("temperature".to_string(), Value::from(self.temperature));
        GenerationSettings::new(map)
    }
}

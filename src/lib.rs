//! VocalIQ - 伴奏生成请求客户端
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Transfer Codec: base64 编解码
//! - Generation Context: 生成请求、结果、错误分类
//! - Playback Context: Surface、播放句柄及其生命周期
//!
//! 应用层 (application/):
//! - Ports: 端口定义（GenerationBackend, ObjectUrlStore, PlaybackSession, Player, Authorizer）
//! - Gateway: 提交生成请求并解析 beat_path 引用
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket
//! - Memory: ObjectUrlStore, PlaybackManager 内存实现
//! - Worker: GcWorker 过期句柄回收
//! - Adapters: Generation Client, Player, Authorizer
//! - Events: WebSocket 事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};

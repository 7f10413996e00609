//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（GenerationBackend、PlaybackSession、ObjectUrlStore、Player、Authorizer）
//! - gateway: 生成请求编排（内联音频 / 引用解析）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod gateway;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    CloseSurfaceCommand,
    CloseSurfaceResponse,
    GenerateAudioCommand,
    GenerateAudioResponse,
    OpenSurfaceCommand,
    OpenSurfaceResponse,
    PlayPlaybackCommand,
    PlayPlaybackResponse,
    ReleasePlaybackCommand,
    ReleasePlaybackResponse,
    StopPlaybackCommand,
    StopPlaybackResponse,
    // Handlers
    handlers::{
        CloseSurfaceHandler, GenerateAudioHandler, OpenSurfaceHandler, PlayPlaybackHandler,
        ReleasePlaybackHandler, StopPlaybackHandler,
    },
};

pub use error::ApplicationError;
pub use gateway::GenerationGateway;

pub use ports::{
    // Authorization
    AuthContext,
    AuthorizerPort,
    // Generation backend
    GenerationBackendPort,
    UpstreamReply,
    // Object URLs
    ObjectUrlStorePort,
    StoredObject,
    // Playback session
    PlaybackOutcome,
    PlaybackSessionPort,
    SurfaceScope,
    // Player
    PlaybackSource,
    PlayerError,
    PlayerPort,
};

pub use queries::{
    GetCurrentPlaybackQuery,
    GetCurrentPlaybackResponse,
    GetPlaybackAudioQuery,
    GetPlaybackAudioResponse,
    // Handlers
    handlers::{GetCurrentPlaybackHandler, GetPlaybackAudioHandler},
};

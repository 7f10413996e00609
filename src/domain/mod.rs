//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Generation Context: 生成请求、结果与错误分类
//! - Playback Context: 播放句柄与状态机

pub mod generation;
pub mod playback;

// 共享的传输编码
pub mod transfer_codec;

pub use transfer_codec::CodecError;

//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::domain::generation::GenerationError;
use crate::domain::playback::PlaybackError;
use crate::domain::CodecError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 生成失败
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// 播放会话错误
    #[error(transparent)]
    Playback(#[from] PlaybackError),
}

impl ApplicationError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

impl From<CodecError> for ApplicationError {
    fn from(err: CodecError) -> Self {
        Self::Generation(err.into())
    }
}

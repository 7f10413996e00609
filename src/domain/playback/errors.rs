//! Playback Context - Errors

use thiserror::Error;

use super::{HandleId, SurfaceId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// surface 未打开或已销毁
    #[error("Surface closed: {0}")]
    SurfaceClosed(SurfaceId),

    #[error("Playback handle not found: {0}")]
    HandleNotFound(HandleId),

    #[error("Playback handle already released: {0}")]
    HandleReleased(HandleId),

    /// 播放器启动或播放失败，已解析的音频仍可重试播放
    #[error("Player failed: {0}")]
    PlayerFailed(String),
}

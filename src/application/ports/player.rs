//! Player Port - 音频播放器抽象

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::playback::ObjectUrl;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Unsupported media: {0}")]
    Unsupported(String),

    #[error("Playback failed: {0}")]
    Failed(String),
}

/// 交给播放器的音源
#[derive(Debug, Clone)]
pub struct PlaybackSource {
    pub url: ObjectUrl,
    pub payload: Arc<[u8]>,
    pub mime_type: String,
}

#[async_trait]
pub trait PlayerPort: Send + Sync {
    /// 播放直到结束；`stop` 被取消时应尽快返回
    async fn play(
        &self,
        source: PlaybackSource,
        stop: CancellationToken,
    ) -> Result<(), PlayerError>;
}

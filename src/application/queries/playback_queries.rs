//! Playback Queries - 播放句柄查询

use std::sync::Arc;

use crate::domain::playback::{HandleId, PlaybackHandle, SurfaceId};

/// 读取存活句柄背后的音频
#[derive(Debug, Clone)]
pub struct GetPlaybackAudioQuery {
    pub handle_id: HandleId,
}

/// 获取音频响应
#[derive(Debug, Clone)]
pub struct GetPlaybackAudioResponse {
    pub audio_data: Arc<[u8]>,
    pub content_type: String,
}

/// 查询 surface 当前的句柄
#[derive(Debug, Clone)]
pub struct GetCurrentPlaybackQuery {
    pub surface_id: SurfaceId,
}

#[derive(Debug, Clone)]
pub struct GetCurrentPlaybackResponse {
    pub surface_id: SurfaceId,
    pub open: bool,
    pub handle: Option<PlaybackHandle>,
}

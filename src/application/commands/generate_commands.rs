//! Generate Commands - 生成相关命令

use serde_json::Value;

use crate::domain::generation::GenerationRequest;
use crate::domain::playback::{PlaybackHandle, SurfaceId};

/// 生成音频命令：请求结果绑定到指定 surface
#[derive(Debug, Clone)]
pub struct GenerateAudioCommand {
    pub surface_id: SurfaceId,
    pub request: GenerationRequest,
}

/// 生成音频响应
#[derive(Debug, Clone)]
pub enum GenerateAudioResponse {
    /// 已为 surface 创建播放句柄
    Played {
        handle: PlaybackHandle,
        /// 通过引用解析时的首次响应文档
        source: Option<Value>,
    },
    /// 后端只返回了 JSON 文档
    Document(Value),
    /// surface 在请求期间被销毁，结果已丢弃
    Discarded,
}

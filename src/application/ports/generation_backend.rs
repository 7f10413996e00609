//! Generation Backend Port - 远端生成服务抽象
//!
//! 定义生成服务的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::generation::{BeatReference, GenerationError, GenerationRequest, InlineAudio};

/// 首次请求的原始应答
///
/// Reference 只在网关内部出现，解析后才交给调用方
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamReply {
    /// 响应体本身就是音频
    Inline(InlineAudio),
    /// JSON 中携带 beat_path，需要二次拉取
    Reference {
        reference: BeatReference,
        document: Value,
    },
    /// JSON 中没有 beat_path
    Document(Value),
}

/// Generation Backend Port
///
/// 每个方法恰好对应一次网络往返
#[async_trait]
pub trait GenerationBackendPort: Send + Sync {
    /// 发起生成请求
    async fn submit(&self, request: &GenerationRequest) -> Result<UpstreamReply, GenerationError>;

    /// 拉取引用指向的音频
    async fn fetch_reference(&self, reference: &BeatReference)
        -> Result<InlineAudio, GenerationError>;

    /// 检查生成服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}

//! Generation Gateway - 生成请求编排
//!
//! 将 GenerationRequest 转换为已解析的 GenerationResult，对调用方隐藏
//! 远端返回的是内联音频还是引用。至多两次往返，不重试，严格串行。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{GenerationBackendPort, UpstreamReply};
use crate::domain::generation::{
    GenerationError, GenerationRequest, GenerationResult, UpstreamStage,
};

pub struct GenerationGateway {
    backend: Arc<dyn GenerationBackendPort>,
    /// 每次网络调用的上限
    timeout: Duration,
}

impl GenerationGateway {
    pub fn new(backend: Arc<dyn GenerationBackendPort>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        request.validate()?;

        tracing::info!(
            target_kind = %request.target(),
            prompt_len = request.prompt().len(),
            attachments = request.attachments().len(),
            "Submitting generation request"
        );

        let reply = self
            .bounded(UpstreamStage::Request, self.backend.submit(request))
            .await?;

        match reply {
            UpstreamReply::Inline(audio) => {
                tracing::info!(
                    mime_type = %audio.mime_type,
                    size = audio.len(),
                    "Generation returned inline audio"
                );
                Ok(GenerationResult::Inline(audio))
            }
            UpstreamReply::Reference {
                reference,
                document,
            } => {
                tracing::debug!(
                    beat_path = %reference,
                    clean_path = %reference.clean_path(),
                    "Resolving generation reference"
                );

                let audio = self
                    .bounded(
                        UpstreamStage::Fetch,
                        self.backend.fetch_reference(&reference),
                    )
                    .await
                    .map_err(|e| match e {
                        e @ (GenerationError::UpstreamFetchFailed { .. }
                        | GenerationError::UpstreamTimeout { .. }) => e,
                        other => GenerationError::UpstreamFetchFailed {
                            url: reference.clean_path().to_string(),
                            status: None,
                            message: other.to_string(),
                        },
                    })?;

                tracing::info!(
                    beat_path = %reference,
                    mime_type = %audio.mime_type,
                    size = audio.len(),
                    "Generation reference resolved"
                );
                Ok(GenerationResult::Inline(audio.with_source(document)))
            }
            UpstreamReply::Document(document) => {
                tracing::warn!("Generation response has no beat_path, returning raw document");
                Ok(GenerationResult::Document(document))
            }
        }
    }

    /// 检查生成服务是否可用
    pub async fn health_check(&self) -> bool {
        tokio::time::timeout(self.timeout, self.backend.health_check())
            .await
            .unwrap_or(false)
    }

    async fn bounded<T, F>(&self, stage: UpstreamStage, call: F) -> Result<T, GenerationError>
    where
        F: Future<Output = Result<T, GenerationError>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| GenerationError::UpstreamTimeout { stage })?
    }
}

//! Generate Command Handlers

use std::sync::Arc;

use crate::application::commands::generate_commands::*;
use crate::application::error::ApplicationError;
use crate::application::gateway::GenerationGateway;
use crate::application::ports::PlaybackSessionPort;
use crate::domain::generation::{GenerationResult, GenerationSettings, InlineAudio};
use crate::domain::playback::{PlaybackError, SurfaceId};
use crate::infrastructure::events::EventPublisher;

/// GenerateAudio Handler - 生成音频并绑定到 surface 的播放句柄
pub struct GenerateAudioHandler {
    gateway: Arc<GenerationGateway>,
    playback: Arc<dyn PlaybackSessionPort>,
    event_publisher: Arc<EventPublisher>,
    /// 请求未指定时使用的设置
    default_settings: GenerationSettings,
}

impl GenerateAudioHandler {
    pub fn new(
        gateway: Arc<GenerationGateway>,
        playback: Arc<dyn PlaybackSessionPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            gateway,
            playback,
            event_publisher,
            default_settings: GenerationSettings::default(),
        }
    }

    pub fn with_default_settings(mut self, settings: GenerationSettings) -> Self {
        self.default_settings = settings;
        self
    }

    pub async fn handle(
        &self,
        cmd: GenerateAudioCommand,
    ) -> Result<GenerateAudioResponse, ApplicationError> {
        let GenerateAudioCommand {
            surface_id,
            request,
        } = cmd;

        let cancel = self
            .playback
            .cancellation_token(&surface_id)
            .ok_or_else(|| PlaybackError::SurfaceClosed(surface_id.clone()))?;

        let request = if self.default_settings.is_empty() {
            request
        } else {
            let settings = request.settings().clone().merged_over(&self.default_settings);
            request.with_settings(settings)
        };

        self.event_publisher
            .publish_generation_started(surface_id.as_str(), &request.target().to_string());

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.gateway.generate(&request) => Some(result),
        };

        let Some(result) = outcome else {
            return Ok(self.discard(&surface_id));
        };

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    surface_id = %surface_id,
                    kind = %e.kind(),
                    error = %e,
                    "Generation failed"
                );
                self.event_publisher.publish_generation_failed(
                    surface_id.as_str(),
                    e.kind().as_str(),
                    e.user_message(),
                );
                return Err(e.into());
            }
        };

        match result {
            GenerationResult::Inline(audio) => {
                let InlineAudio {
                    payload,
                    mime_type,
                    source,
                } = audio;

                // 只绑定到发起请求时的那次 surface 打开
                let acquired = self
                    .playback
                    .acquire_scoped(&surface_id, &cancel, payload, &mime_type);
                let handle = match acquired {
                    Ok(handle) => handle,
                    Err(PlaybackError::SurfaceClosed(_)) => return Ok(self.discard(&surface_id)),
                    Err(e) => return Err(e.into()),
                };

                self.event_publisher.publish_generation_completed(
                    surface_id.as_str(),
                    Some(handle.id.to_string()),
                    Some(handle.mime_type.clone()),
                    handle.size,
                );
                Ok(GenerateAudioResponse::Played { handle, source })
            }
            GenerationResult::Document(document) => {
                self.event_publisher.publish_generation_completed(
                    surface_id.as_str(),
                    None,
                    None,
                    0,
                );
                Ok(GenerateAudioResponse::Document(document))
            }
        }
    }

    fn discard(&self, surface_id: &SurfaceId) -> GenerateAudioResponse {
        tracing::info!(surface_id = %surface_id, "Surface closed, generation result discarded");
        self.event_publisher
            .publish_generation_discarded(surface_id.as_str());
        GenerateAudioResponse::Discarded
    }
}

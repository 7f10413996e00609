//! Generate Handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::application::{GenerateAudioCommand, GenerateAudioResponse};
use crate::domain::generation::media_type::resolve_mime;
use crate::domain::generation::{
    Attachment, AttachmentRole, GenerationError, GenerationRequest, GenerationSettings,
    GenerationTarget,
};
use crate::domain::playback::SurfaceId;
use crate::domain::transfer_codec;
use crate::infrastructure::http::dto::{ApiResponse, PlaybackHandleDto};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AttachmentDto {
    /// vocal / beat
    pub role: String,
    /// base64 文本或 data URL
    pub data: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl AttachmentDto {
    fn into_attachment(self) -> Result<Attachment, GenerationError> {
        let role: AttachmentRole = self.role.parse()?;
        let (data_url_mime, payload) = transfer_codec::decode_data_url_or_raw(&self.data)?;

        let mime_type = self
            .mime_type
            .filter(|m| !m.trim().is_empty())
            .or(data_url_mime)
            .unwrap_or_else(|| resolve_mime(None, &payload));

        let attachment = Attachment::new(role, payload, mime_type);
        Ok(match self.file_name {
            Some(name) => attachment.with_file_name(name),
            None => attachment,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequestDto {
    pub surface_id: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub target: GenerationTarget,
    #[serde(default)]
    pub settings: Option<Value>,
    #[serde(default)]
    pub attachments: Vec<AttachmentDto>,
    /// 同时在响应中返回 base64 音频
    #[serde(default)]
    pub inline_audio: bool,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponseDto {
    /// ready / document / discarded
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<PlaybackHandleDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_base64: Option<String>,
}

impl GenerateResponseDto {
    fn with_status(status: &'static str) -> Self {
        Self {
            status,
            handle: None,
            document: None,
            audio_base64: None,
        }
    }
}

pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequestDto>,
) -> Result<Json<ApiResponse<GenerateResponseDto>>, ApiError> {
    let mut request = GenerationRequest::new(req.prompt).with_target(req.target);

    if let Some(settings) = req.settings {
        let settings = GenerationSettings::from_value(settings)
            .ok_or_else(|| ApiError::BadRequest("settings must be a JSON object".to_string()))?;
        request = request.with_settings(settings);
    }

    for attachment in req.attachments {
        request = request.with_attachment(attachment.into_attachment()?);
    }

    let cmd = GenerateAudioCommand {
        surface_id: SurfaceId::new(req.surface_id),
        request,
    };

    let result = state.generate_audio_handler.handle(cmd).await?;

    let dto = match result {
        GenerateAudioResponse::Played { handle, source } => {
            let audio_base64 = if req.inline_audio {
                let object = state.playback.resolve(&handle.id)?;
                Some(transfer_codec::encode(&object.payload))
            } else {
                None
            };

            GenerateResponseDto {
                handle: Some(PlaybackHandleDto::from_handle(&handle, &state.public_base_url)),
                document: source,
                audio_base64,
                ..GenerateResponseDto::with_status("ready")
            }
        }
        GenerateAudioResponse::Document(document) => GenerateResponseDto {
            document: Some(document),
            ..GenerateResponseDto::with_status("document")
        },
        GenerateAudioResponse::Discarded => GenerateResponseDto::with_status("discarded"),
    };

    Ok(Json(ApiResponse::success(dto)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_from_data_url() {
        let dto = AttachmentDto {
            role: "vocal".to_string(),
            data: transfer_codec::encode_data_url("audio/webm", &[1, 2, 3]),
            mime_type: None,
            file_name: Some("take1.webm".to_string()),
        };
        let attachment = dto.into_attachment().unwrap();
        assert_eq!(attachment.role, AttachmentRole::Vocal);
        assert_eq!(attachment.payload, vec![1, 2, 3]);
        assert_eq!(attachment.mime_type, "audio/webm");
        assert_eq!(attachment.file_name.as_deref(), Some("take1.webm"));
    }

    #[test]
    fn test_attachment_sniffs_raw_base64() {
        let wav = crate::infrastructure::adapters::backend::wav_header_stub();
        let dto = AttachmentDto {
            role: "beats".to_string(),
            data: transfer_codec::encode(&wav),
            mime_type: None,
            file_name: None,
        };
        let attachment = dto.into_attachment().unwrap();
        assert_eq!(attachment.role, AttachmentRole::Beat);
        assert_eq!(attachment.mime_type, "audio/wav");
    }

    #[test]
    fn test_attachment_rejects_malformed_base64() {
        let dto = AttachmentDto {
            role: "vocal".to_string(),
            data: "not*base64".to_string(),
            mime_type: None,
            file_name: None,
        };
        assert!(matches!(
            dto.into_attachment(),
            Err(GenerationError::MalformedEncoding(_))
        ));
    }
}

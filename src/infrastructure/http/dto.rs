//! Data Transfer Objects

use serde::Serialize;

use crate::domain::playback::PlaybackHandle;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(Empty {}),
        }
    }
}

// ============================================================================
// Playback DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PlaybackHandleDto {
    pub handle_id: String,
    pub surface_id: String,
    /// 本地对象 URL（blob:vocaliq/...），只用于标识
    pub object_url: String,
    /// 实际可播放的地址
    pub audio_url: String,
    pub mime_type: String,
    pub size: usize,
    pub expires_at: String,
}

impl PlaybackHandleDto {
    pub fn from_handle(handle: &PlaybackHandle, public_base_url: &str) -> Self {
        Self {
            handle_id: handle.id.to_string(),
            surface_id: handle.surface_id.to_string(),
            object_url: handle.url.to_string(),
            audio_url: format!(
                "{}/api/playback/{}",
                public_base_url.trim_end_matches('/'),
                handle.id
            ),
            mime_type: handle.mime_type.clone(),
            size: handle.size,
            expires_at: handle.expires_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::playback::{ObjectUrl, SurfaceId};

    #[test]
    fn test_handle_dto_audio_url() {
        let handle = PlaybackHandle::new(
            SurfaceId::new("main"),
            ObjectUrl::generate(),
            "audio/wav",
            44,
            chrono::Duration::seconds(60),
        );
        let dto = PlaybackHandleDto::from_handle(&handle, "http://localhost:5070/");
        assert_eq!(
            dto.audio_url,
            format!("http://localhost:5070/api/playback/{}", handle.id)
        );
        assert_eq!(dto.surface_id, "main");
        assert!(dto.object_url.starts_with("blob:vocaliq/"));
    }

    #[test]
    fn test_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::ok()).unwrap();
        assert_eq!(json["errno"], 0);
        assert_eq!(json["error"], "");
        assert!(json["data"].is_object());
    }
}

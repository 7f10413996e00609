//! HTTP Error Handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;
use crate::domain::generation::{GenerationError, GenerationErrorKind};
use crate::domain::playback::PlaybackError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const UNAUTHORIZED: i32 = 401;
    pub const NOT_FOUND: i32 = 404;
    pub const CONFLICT: i32 = 409;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const BAD_GATEWAY: i32 = 502;
    pub const SERVICE_UNAVAILABLE: i32 = 503;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Internal(String),
    Conflict(String),
    /// 生成失败，消息面向用户
    BadGateway(String),
    ServiceUnavailable(String),
    /// 媒体资源不存在，以真实的 404 状态返回，供 <audio> 等直接消费 URL 的客户端识别
    MediaNotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, response) = match &self {
            ApiError::NotFound(msg) => {
                tracing::warn!(errno = errno::NOT_FOUND, error = %msg, "Resource not found");
                (
                    StatusCode::OK,
                    ErrorResponse::new(errno::NOT_FOUND, msg.clone()),
                )
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!(errno = errno::BAD_REQUEST, error = %msg, "Bad request");
                (
                    StatusCode::OK,
                    ErrorResponse::new(errno::BAD_REQUEST, msg.clone()),
                )
            }
            ApiError::Unauthorized(msg) => {
                tracing::warn!(errno = errno::UNAUTHORIZED, error = %msg, "Unauthorized request");
                (
                    StatusCode::OK,
                    ErrorResponse::new(errno::UNAUTHORIZED, msg.clone()),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!(
                    errno = errno::INTERNAL_ERROR,
                    error = %msg,
                    "Internal server error"
                );
                (
                    StatusCode::OK,
                    ErrorResponse::new(errno::INTERNAL_ERROR, msg.clone()),
                )
            }
            ApiError::Conflict(msg) => {
                tracing::warn!(errno = errno::CONFLICT, error = %msg, "Resource conflict");
                (
                    StatusCode::OK,
                    ErrorResponse::new(errno::CONFLICT, msg.clone()),
                )
            }
            ApiError::BadGateway(msg) => {
                tracing::warn!(errno = errno::BAD_GATEWAY, error = %msg, "Generation failed");
                (
                    StatusCode::OK,
                    ErrorResponse::new(errno::BAD_GATEWAY, msg.clone()),
                )
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::error!(
                    errno = errno::SERVICE_UNAVAILABLE,
                    error = %msg,
                    "Service unavailable"
                );
                (
                    StatusCode::OK,
                    ErrorResponse::new(errno::SERVICE_UNAVAILABLE, msg.clone()),
                )
            }
            ApiError::MediaNotFound(msg) => {
                tracing::debug!(error = %msg, "Media not found");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new(errno::NOT_FOUND, msg.clone()),
                )
            }
        };

        (status, Json(response)).into_response()
    }
}

impl From<GenerationError> for ApiError {
    fn from(e: GenerationError) -> Self {
        match e.kind() {
            GenerationErrorKind::InvalidRequest | GenerationErrorKind::MalformedEncoding => {
                ApiError::BadRequest(e.to_string())
            }
            // 连接不上生成服务
            GenerationErrorKind::UpstreamRequestFailed
                if matches!(e, GenerationError::UpstreamRequestFailed { status: None, .. }) =>
            {
                ApiError::ServiceUnavailable(e.user_message().to_string())
            }
            // 上游细节只进日志，用户只看到统一提示
            _ => ApiError::BadGateway(e.user_message().to_string()),
        }
    }
}

impl From<PlaybackError> for ApiError {
    fn from(e: PlaybackError) -> Self {
        match e {
            PlaybackError::SurfaceClosed(_) => ApiError::Conflict(e.to_string()),
            PlaybackError::HandleNotFound(_) | PlaybackError::HandleReleased(_) => {
                ApiError::NotFound(e.to_string())
            }
            PlaybackError::PlayerFailed(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::Generation(e) => e.into(),
            ApplicationError::Playback(e) => e.into(),
        }
    }
}

//! Playback Handlers

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::application::ports::PlaybackOutcome;
use crate::application::{
    ApplicationError, GetPlaybackAudioQuery, PlayPlaybackCommand, ReleasePlaybackCommand,
    StopPlaybackCommand,
};
use crate::domain::playback::HandleId;
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 读取句柄背后的音频；句柄释放后对象 URL 已撤销，返回 404
pub async fn get_playback_audio(
    State(state): State<Arc<AppState>>,
    Path(handle_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let query = GetPlaybackAudioQuery {
        handle_id: HandleId::from_uuid(handle_id),
    };

    let audio = match state.get_playback_audio_handler.handle(query).await {
        Ok(audio) => audio,
        Err(ApplicationError::Playback(e)) => return Err(ApiError::MediaNotFound(e.to_string())),
        Err(e) => return Err(e.into()),
    };

    let content_length = audio.audio_data.len();
    let body = Body::from_stream(ReaderStream::new(Cursor::new(audio.audio_data)));

    Ok((
        [
            (header::CONTENT_TYPE, audio.content_type),
            (header::CONTENT_LENGTH, content_length.to_string()),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        body,
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct HandleRequest {
    pub handle_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ReleasePlaybackResponseDto {
    pub handle_id: String,
    pub released: bool,
}

pub async fn release_playback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HandleRequest>,
) -> Result<Json<ApiResponse<ReleasePlaybackResponseDto>>, ApiError> {
    let cmd = ReleasePlaybackCommand {
        handle_id: HandleId::from_uuid(req.handle_id),
    };

    let result = state.release_playback_handler.handle(cmd).await?;

    Ok(Json(ApiResponse::success(ReleasePlaybackResponseDto {
        handle_id: result.handle_id.to_string(),
        released: result.released,
    })))
}

#[derive(Debug, Serialize)]
pub struct PlayPlaybackResponseDto {
    pub handle_id: String,
    /// finished / stopped
    pub outcome: &'static str,
}

pub async fn play_playback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HandleRequest>,
) -> Result<Json<ApiResponse<PlayPlaybackResponseDto>>, ApiError> {
    let cmd = PlayPlaybackCommand {
        handle_id: HandleId::from_uuid(req.handle_id),
    };

    let result = state.play_playback_handler.handle(cmd).await?;
    let outcome = match result.outcome {
        PlaybackOutcome::Finished => "finished",
        PlaybackOutcome::Stopped => "stopped",
    };

    Ok(Json(ApiResponse::success(PlayPlaybackResponseDto {
        handle_id: result.handle_id.to_string(),
        outcome,
    })))
}

#[derive(Debug, Serialize)]
pub struct StopPlaybackResponseDto {
    pub handle_id: String,
    pub stopped: bool,
}

pub async fn stop_playback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HandleRequest>,
) -> Result<Json<ApiResponse<StopPlaybackResponseDto>>, ApiError> {
    let cmd = StopPlaybackCommand {
        handle_id: HandleId::from_uuid(req.handle_id),
    };

    let result = state.stop_playback_handler.handle(cmd).await?;

    Ok(Json(ApiResponse::success(StopPlaybackResponseDto {
        handle_id: result.handle_id.to_string(),
        stopped: result.stopped,
    })))
}

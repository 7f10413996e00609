//! Surface Handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::{
    CloseSurfaceCommand, GetCurrentPlaybackQuery, OpenSurfaceCommand,
};
use crate::domain::playback::SurfaceId;
use crate::infrastructure::http::dto::{ApiResponse, PlaybackHandleDto};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Open
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct OpenSurfaceRequest {
    #[serde(default)]
    pub surface_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OpenSurfaceResponseDto {
    pub surface_id: String,
    pub opened: bool,
}

pub async fn open_surface(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OpenSurfaceRequest>,
) -> Result<Json<ApiResponse<OpenSurfaceResponseDto>>, ApiError> {
    let cmd = OpenSurfaceCommand {
        surface_id: req.surface_id.map(SurfaceId::new),
    };

    let result = state.open_surface_handler.handle(cmd).await?;

    Ok(Json(ApiResponse::success(OpenSurfaceResponseDto {
        surface_id: result.surface_id.to_string(),
        opened: result.opened,
    })))
}

// ============================================================================
// Close
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SurfaceRequest {
    pub surface_id: String,
}

#[derive(Debug, Serialize)]
pub struct CloseSurfaceResponseDto {
    pub surface_id: String,
    pub closed: bool,
}

pub async fn close_surface(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SurfaceRequest>,
) -> Result<Json<ApiResponse<CloseSurfaceResponseDto>>, ApiError> {
    let cmd = CloseSurfaceCommand {
        surface_id: SurfaceId::new(req.surface_id),
    };

    let result = state.close_surface_handler.handle(cmd).await?;

    Ok(Json(ApiResponse::success(CloseSurfaceResponseDto {
        surface_id: result.surface_id.to_string(),
        closed: result.closed,
    })))
}

// ============================================================================
// Current
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SurfaceStatusDto {
    pub surface_id: String,
    pub open: bool,
    pub handle: Option<PlaybackHandleDto>,
}

pub async fn surface_status(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SurfaceRequest>,
) -> Result<Json<ApiResponse<SurfaceStatusDto>>, ApiError> {
    let query = GetCurrentPlaybackQuery {
        surface_id: SurfaceId::new(req.surface_id),
    };

    let result = state.get_current_playback_handler.handle(query).await?;

    Ok(Json(ApiResponse::success(SurfaceStatusDto {
        surface_id: result.surface_id.to_string(),
        open: result.open,
        handle: result
            .handle
            .as_ref()
            .map(|h| PlaybackHandleDto::from_handle(h, &state.public_base_url)),
    })))
}

//! Ping / Health Handlers

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::state::AppState;

/// Ping 响应
#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Ping endpoint - 存活检查（无需鉴权）
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    /// 生成后端是否可达
    pub backend: bool,
}

/// Health endpoint - 检查生成后端
pub async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthResponse>> {
    let backend = state.gateway.health_check().await;
    if !backend {
        tracing::warn!("Generation backend health check failed");
    }
    Json(ApiResponse::success(HealthResponse { backend }))
}

//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                 GET   存活检查（无需鉴权）
//! - /api/health               GET   生成后端健康检查
//! - /api/surface/open         POST  打开 surface
//! - /api/surface/close        POST  销毁 surface（取消请求、释放句柄）
//! - /api/surface/status       POST  surface 当前句柄
//! - /api/generate             POST  生成音频并绑定到 surface
//! - /api/playback/{handle_id} GET   读取句柄背后的音频
//! - /api/playback/release     POST  幂等释放句柄
//! - /api/playback/play        POST  服务端播放，结束或被打断后返回
//! - /api/playback/stop        POST  打断播放
//! - /ws/surface/{surface_id}  WS    Surface WebSocket（断开即销毁）
//! - /ws/events                WS    全局 WebSocket

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/surface/:surface_id", get(handlers::surface_websocket_handler))
        .route("/ws/events", get(handlers::global_websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/health", get(handlers::health))
        .route("/generate", post(handlers::generate))
        .nest("/surface", surface_routes())
        .nest("/playback", playback_routes())
}

/// Surface 路由
fn surface_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/open", post(handlers::open_surface))
        .route("/close", post(handlers::close_surface))
        .route("/status", post(handlers::surface_status))
}

/// Playback 路由
fn playback_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/release", post(handlers::release_playback))
        .route("/play", post(handlers::play_playback))
        .route("/stop", post(handlers::stop_playback))
        .route("/:handle_id", get(handlers::get_playback_audio))
}

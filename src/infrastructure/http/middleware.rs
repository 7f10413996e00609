//! HTTP Middleware
//!
//! - 错误日志：HTTP 4xx/5xx 状态码
//! - 鉴权：通过 AuthorizerPort 校验 bearer token

use axum::{
    extract::{Query, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::error::ApiError;
use super::state::AppState;
use crate::application::AuthContext;

/// 无需鉴权的路径
const PUBLIC_PATHS: &[&str] = &["/api/ping"];

/// HTTP 状态码错误日志中间件
///
/// 拦截 HTTP 响应，当状态码为 4xx 或 5xx 时记录日志
/// 注意：业务错误（errno != 0）在 ApiError::into_response() 中记录
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            "HTTP client error"
        );
    }

    response
}

/// 鉴权中间件
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if PUBLIC_PATHS.contains(&path.as_str()) {
        return next.run(request).await;
    }

    let ctx = AuthContext::new(path.clone(), extract_token(&request));
    if state.authorizer.authorize(&ctx) {
        return next.run(request).await;
    }

    state.event_publisher.publish_auth_rejected(&path);
    ApiError::Unauthorized(format!("Unauthorized: {}", path)).into_response()
}

/// 查询参数中的 token（<audio> 和 WebSocket 无法附带请求头）
#[derive(Debug, Deserialize)]
struct TokenParams {
    access_token: Option<String>,
}

/// 从 Authorization 头或查询参数中提取 token
fn extract_token(request: &Request) -> Option<String> {
    let from_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());

    from_header.or_else(|| {
        Query::<TokenParams>::try_from_uri(request.uri())
            .ok()
            .and_then(|Query(params)| params.access_token)
    })
}

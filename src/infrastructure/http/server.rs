//! HTTP Server
//!
//! Axum HTTP 服务器启动和配置

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::Router;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::middleware::{auth_middleware, error_logging_middleware};
use super::routes::create_routes;
use super::state::AppState;

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 请求体上限（base64 附件会让请求体膨胀约 4/3）
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5070,
            max_body_size: 50 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 构建完整的 Router（含中间件）
pub fn build_router(state: Arc<AppState>, max_body_size: usize) -> Router {
    // CORS 配置 - 允许所有来源的跨域请求
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .expose_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    create_routes()
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(middleware::from_fn(error_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// HTTP 服务器
pub struct HttpServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl HttpServer {
    /// 创建新的 HTTP 服务器
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// 启动服务器（带优雅关闭）
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = build_router(self.state.clone(), self.config.max_body_size);
        let addr = self.config.addr();

        info!("Starting HTTP server on {} (with graceful shutdown)", addr);

        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{GenerationGateway, ObjectUrlStorePort};
    use crate::domain::generation::{GenerationError, InlineAudio, USER_FACING_FAILURE};
    use crate::domain::transfer_codec;
    use crate::infrastructure::adapters::auth::StaticTokenAuthorizer;
    use crate::infrastructure::adapters::backend::{wav_header_stub, FakeGenerationClient};
    use crate::infrastructure::adapters::player::HeadlessPlayer;
    use crate::infrastructure::events::EventPublisher;
    use crate::infrastructure::memory::{InMemoryObjectUrlStore, InMemoryPlaybackManager};
    use crate::config::GenerationConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::util::ServiceExt;

    struct TestApp {
        router: Router,
        fake: Arc<FakeGenerationClient>,
        store: Arc<InMemoryObjectUrlStore>,
    }

    fn test_app(fake: FakeGenerationClient, authorizer: StaticTokenAuthorizer) -> TestApp {
        let fake = Arc::new(fake);
        let store = Arc::new(InMemoryObjectUrlStore::new());
        let publisher = Arc::new(EventPublisher::new());
        let playback = InMemoryPlaybackManager::new(store.clone(), Duration::from_secs(60))
            .with_event_publisher(publisher.clone())
            .arc();
        let gateway = Arc::new(GenerationGateway::new(fake.clone(), Duration::from_secs(5)));
        let state = AppState::new(
            playback,
            gateway,
            Arc::new(authorizer),
            Arc::new(HeadlessPlayer::new()),
            publisher,
            GenerationConfig::default().to_settings(),
            "http://localhost:5070",
        );
        TestApp {
            router: build_router(Arc::new(state), 1024 * 1024),
            fake,
            store,
        }
    }

    fn reference_backend() -> FakeGenerationClient {
        FakeGenerationClient::reference(
            json!({"beat_path": "/beats/123.wav"}),
            InlineAudio::new(wav_header_stub(), "audio/wav"),
        )
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    async fn send_json(router: &Router, request: Request<Body>) -> Value {
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_slice(&body).unwrap()
    }

    async fn open_surface(router: &Router, surface_id: &str) {
        let json = send_json(
            router,
            post_json("/api/surface/open", json!({"surface_id": surface_id})),
        )
        .await;
        assert_eq!(json["errno"], 0);
    }

    #[tokio::test]
    async fn test_generate_play_release_flow() {
        let app = test_app(reference_backend(), StaticTokenAuthorizer::allow_all());
        open_surface(&app.router, "main").await;

        let json = send_json(
            &app.router,
            post_json(
                "/api/generate",
                json!({"surface_id": "main", "prompt": "lofi beat 90bpm"}),
            ),
        )
        .await;
        assert_eq!(json["errno"], 0);
        assert_eq!(json["data"]["status"], "ready");
        assert_eq!(json["data"]["handle"]["mime_type"], "audio/wav");
        assert_eq!(json["data"]["handle"]["size"], 44);
        assert_eq!(json["data"]["document"]["beat_path"], "/beats/123.wav");
        assert!(json["data"].get("audio_base64").is_none());
        assert_eq!(app.fake.fetched_paths(), vec!["beats/123.wav".to_string()]);

        let handle_id = json["data"]["handle"]["handle_id"].as_str().unwrap().to_string();
        let audio_uri = format!("/api/playback/{}", handle_id);

        let (status, body) = send(&app.router, get(&audio_uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, wav_header_stub());

        let release = || post_json("/api/playback/release", json!({"handle_id": handle_id}));
        let json = send_json(&app.router, release()).await;
        assert_eq!(json["data"]["released"], true);
        let json = send_json(&app.router, release()).await;
        assert_eq!(json["data"]["released"], false);

        let (status, _) = send(&app.router, get(&audio_uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(app.store.live_count(), 0);
    }

    #[tokio::test]
    async fn test_inline_audio_is_base64() {
        let app = test_app(reference_backend(), StaticTokenAuthorizer::allow_all());
        open_surface(&app.router, "main").await;

        let json = send_json(
            &app.router,
            post_json(
                "/api/generate",
                json!({"surface_id": "main", "prompt": "lofi", "inline_audio": true}),
            ),
        )
        .await;
        let encoded = json["data"]["audio_base64"].as_str().unwrap();
        assert_eq!(transfer_codec::decode(encoded).unwrap(), wav_header_stub());
    }

    #[tokio::test]
    async fn test_close_surface_revokes_handle() {
        let app = test_app(reference_backend(), StaticTokenAuthorizer::allow_all());
        open_surface(&app.router, "modal").await;

        send_json(
            &app.router,
            post_json("/api/generate", json!({"surface_id": "modal", "prompt": "lofi"})),
        )
        .await;
        assert_eq!(app.store.live_count(), 1);

        let json = send_json(
            &app.router,
            post_json("/api/surface/close", json!({"surface_id": "modal"})),
        )
        .await;
        assert_eq!(json["data"]["closed"], true);
        assert_eq!(app.store.live_count(), 0);

        let json = send_json(
            &app.router,
            post_json("/api/surface/status", json!({"surface_id": "modal"})),
        )
        .await;
        assert_eq!(json["data"]["open"], false);
        assert!(json["data"]["handle"].is_null());
    }

    #[tokio::test]
    async fn test_blank_prompt_is_rejected() {
        let app = test_app(reference_backend(), StaticTokenAuthorizer::allow_all());
        open_surface(&app.router, "main").await;

        let json = send_json(
            &app.router,
            post_json("/api/generate", json!({"surface_id": "main", "prompt": "   "})),
        )
        .await;
        assert_eq!(json["errno"], 400);
        assert_eq!(app.fake.submit_calls(), 0);
    }

    #[tokio::test]
    async fn test_generate_on_closed_surface() {
        let app = test_app(reference_backend(), StaticTokenAuthorizer::allow_all());

        let json = send_json(
            &app.router,
            post_json("/api/generate", json!({"surface_id": "ghost", "prompt": "lofi"})),
        )
        .await;
        assert_eq!(json["errno"], 409);
        assert_eq!(app.fake.submit_calls(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_uses_user_facing_message() {
        let app = test_app(
            FakeGenerationClient::failing(GenerationError::UpstreamRequestFailed {
                status: Some(500),
                message: "Internal Server Error".to_string(),
            }),
            StaticTokenAuthorizer::allow_all(),
        );
        open_surface(&app.router, "main").await;

        let json = send_json(
            &app.router,
            post_json("/api/generate", json!({"surface_id": "main", "prompt": "lofi"})),
        )
        .await;
        assert_eq!(json["errno"], 502);
        assert_eq!(json["error"], USER_FACING_FAILURE);
        assert_eq!(app.store.created_count(), 0);
    }

    #[tokio::test]
    async fn test_auth_required_except_ping() {
        let app = test_app(
            reference_backend(),
            StaticTokenAuthorizer::new(true, vec!["secret".to_string()]),
        );

        let (status, _) = send(&app.router, get("/api/ping")).await;
        assert_eq!(status, StatusCode::OK);

        let json = send_json(
            &app.router,
            post_json("/api/surface/open", json!({"surface_id": "main"})),
        )
        .await;
        assert_eq!(json["errno"], 401);

        let request = Request::builder()
            .method("POST")
            .uri("/api/surface/open")
            .header("content-type", "application/json")
            .header("authorization", "Bearer secret")
            .body(Body::from(json!({"surface_id": "main"}).to_string()))
            .unwrap();
        let json = send_json(&app.router, request).await;
        assert_eq!(json["errno"], 0);
        assert_eq!(json["data"]["opened"], true);
    }

    #[tokio::test]
    async fn test_health_reports_backend() {
        let app = test_app(reference_backend(), StaticTokenAuthorizer::allow_all());
        let json = send_json(&app.router, get("/api/health")).await;
        assert_eq!(json["data"]["backend"], true);
    }

    #[tokio::test]
    async fn test_play_unknown_handle() {
        let app = test_app(reference_backend(), StaticTokenAuthorizer::allow_all());
        let handle_id = uuid::Uuid::new_v4().to_string();

        let json = send_json(
            &app.router,
            post_json("/api/playback/play", json!({"handle_id": handle_id})),
        )
        .await;
        assert_eq!(json["errno"], 404);

        let json = send_json(
            &app.router,
            post_json("/api/playback/stop", json!({"handle_id": handle_id})),
        )
        .await;
        assert_eq!(json["errno"], 0);
        assert_eq!(json["data"]["stopped"], false);
    }
}

//! VocalIQ - 伴奏生成请求客户端
//!
//! - Domain: transfer_codec, generation/, playback/
//! - Application: gateway, commands, queries, ports
//! - Infrastructure: http, memory, worker, adapters, events

use std::sync::Arc;
use std::time::Duration;

use vocaliq::application::{GenerationBackendPort, GenerationGateway};
use vocaliq::config::{load_config, print_config};
use vocaliq::infrastructure::adapters::{
    FakeGenerationClient, HeadlessPlayer, HttpGenerationClient, HttpGenerationClientConfig,
    StaticTokenAuthorizer,
};
use vocaliq::infrastructure::events::EventPublisher;
use vocaliq::infrastructure::http::{AppState, HttpServer, ServerConfig};
use vocaliq::infrastructure::memory::{InMemoryObjectUrlStore, InMemoryPlaybackManager};
use vocaliq::infrastructure::worker::{GcWorker, GcWorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},vocaliq={},tower_http=debug",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("VocalIQ - 伴奏生成请求客户端");
    print_config(&config);

    // 生成后端
    let backend: Arc<dyn GenerationBackendPort> = if config.backend.fake {
        tracing::warn!("Using fake generation backend");
        Arc::new(FakeGenerationClient::demo())
    } else {
        let backend_config = HttpGenerationClientConfig::new(&config.backend.url)
            .with_timeout(config.backend.timeout_secs);
        Arc::new(HttpGenerationClient::new(backend_config)?)
    };
    let gateway = Arc::new(GenerationGateway::new(
        backend,
        Duration::from_secs(config.backend.timeout_secs),
    ));

    // 创建事件发布器
    let event_publisher = Arc::new(EventPublisher::new());

    // 播放会话管理
    let store = Arc::new(InMemoryObjectUrlStore::new());
    let playback = InMemoryPlaybackManager::new(
        store,
        Duration::from_secs(config.playback.handle_ttl_secs),
    )
    .with_event_publisher(event_publisher.clone())
    .arc();

    let authorizer = Arc::new(StaticTokenAuthorizer::new(
        config.auth.enabled,
        config.auth.tokens.clone(),
    ));
    let player = Arc::new(HeadlessPlayer::new());

    // 启动过期句柄回收
    let gc_shutdown = if config.gc.enabled {
        let worker = GcWorker::new(
            GcWorkerConfig {
                interval: Duration::from_secs(config.gc.interval_secs),
            },
            playback.clone(),
        );
        let token = worker.shutdown_token();
        tokio::spawn(worker.run());
        Some(token)
    } else {
        None
    };

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_max_body_size(config.playback.max_upload_size as usize);
    let state = AppState::new(
        playback,
        gateway,
        authorizer,
        player,
        event_publisher,
        config.generation.to_settings(),
        config.server.public_base_url(),
    );

    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    if let Some(token) = gc_shutdown {
        token.cancel();
    }

    tracing::info!("Server shutdown complete");

    Ok(())
}

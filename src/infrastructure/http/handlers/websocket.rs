//! WebSocket Handlers

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::domain::playback::SurfaceId;
use crate::infrastructure::events::WsEvent;
use crate::infrastructure::http::state::AppState;

/// Surface WebSocket：推送该 surface 的事件，连接断开即销毁 surface
pub async fn surface_websocket_handler(
    ws: WebSocketUpgrade,
    Path(surface_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_surface_socket(socket, SurfaceId::new(surface_id), state))
}

/// 全局 WebSocket：推送所有事件
pub async fn global_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_global_socket(socket, state))
}

async fn handle_surface_socket(socket: WebSocket, surface_id: SurfaceId, state: Arc<AppState>) {
    let (mut sender, receiver) = socket.split();

    if !state.playback.is_open(&surface_id) {
        tracing::warn!(surface_id = %surface_id, "WebSocket connection rejected: surface not open");
        let _ = sender.close().await;
        return;
    }

    let event_rx = state.event_publisher.register_surface(surface_id.as_str());
    tracing::info!(surface_id = %surface_id, "Surface WebSocket connected");

    pump(sender, receiver, event_rx).await;

    // 页面卸载：取消进行中的请求并释放句柄
    state.playback.teardown(&surface_id);
    state.event_publisher.unregister_surface(surface_id.as_str());
    tracing::info!(surface_id = %surface_id, "Surface WebSocket disconnected");
}

async fn handle_global_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, receiver) = socket.split();
    let event_rx = state.event_publisher.subscribe_global();

    tracing::info!("Global WebSocket connected");
    pump(sender, receiver, event_rx).await;
    tracing::info!("Global WebSocket disconnected");
}

/// 转发事件并消费客户端消息，任一方向结束即返回
async fn pump(
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
    mut receiver: futures_util::stream::SplitStream<WebSocket>,
    mut event_rx: broadcast::Receiver<WsEvent>,
) {
    let mut forward_task = tokio::spawn(async move {
        loop {
            let event = match event_rx.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped = skipped, "WebSocket receiver lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };

            let msg = match serde_json::to_string(&event) {
                Ok(json) => Message::Text(json),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize event");
                    continue;
                }
            };

            if let Err(e) = sender.send(msg).await {
                tracing::debug!(error = %e, "Failed to send WebSocket message");
                break;
            }
        }
    });

    // 接收客户端消息（心跳）
    let mut receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::debug!("WebSocket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "WebSocket error");
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut forward_task => receive_task.abort(),
        _ = &mut receive_task => forward_task.abort(),
    }
}

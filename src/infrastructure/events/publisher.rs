//! Event Publisher Implementation
//!
//! 生成、播放与鉴权事件的广播流。宿主持有发布器，UI 通过 WebSocket 订阅。

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// WebSocket 事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum WsEvent {
    /// Surface 打开
    SurfaceOpened { surface_id: String },
    /// Surface 销毁
    SurfaceClosed { surface_id: String, reason: String },
    /// 生成请求已发出
    GenerationStarted { surface_id: String, target: String },
    /// 生成完成
    GenerationCompleted {
        surface_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        handle_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        size: usize,
    },
    /// 生成失败（kind 仅用于诊断）
    GenerationFailed {
        surface_id: String,
        kind: String,
        error: String,
    },
    /// surface 已销毁，结果被丢弃
    GenerationDiscarded { surface_id: String },
    /// 句柄创建
    HandleAcquired {
        surface_id: String,
        handle_id: String,
        mime_type: String,
        size: usize,
    },
    /// 句柄释放
    HandleReleased {
        surface_id: String,
        handle_id: String,
        reason: String,
    },
    /// 未授权请求被拒绝
    AuthRejected { path: String },
}

impl WsEvent {
    /// 事件所属的 surface，全局事件返回 None
    pub fn surface_id(&self) -> Option<&str> {
        match self {
            WsEvent::SurfaceOpened { surface_id }
            | WsEvent::SurfaceClosed { surface_id, .. }
            | WsEvent::GenerationStarted { surface_id, .. }
            | WsEvent::GenerationCompleted { surface_id, .. }
            | WsEvent::GenerationFailed { surface_id, .. }
            | WsEvent::GenerationDiscarded { surface_id }
            | WsEvent::HandleAcquired { surface_id, .. }
            | WsEvent::HandleReleased { surface_id, .. } => Some(surface_id),
            WsEvent::AuthRejected { .. } => None,
        }
    }
}

/// 事件发布器
pub struct EventPublisher {
    /// surface_id -> broadcast sender
    surface_channels: DashMap<String, broadcast::Sender<WsEvent>>,
    /// 全局广播通道，所有事件都会进入
    global_channel: broadcast::Sender<WsEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (global_tx, _) = broadcast::channel(100);
        Self {
            surface_channels: DashMap::new(),
            global_channel: global_tx,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅全局事件
    pub fn subscribe_global(&self) -> broadcast::Receiver<WsEvent> {
        self.global_channel.subscribe()
    }

    /// 注册 surface 的事件通道
    pub fn register_surface(&self, surface_id: &str) -> broadcast::Receiver<WsEvent> {
        if let Some(sender) = self.surface_channels.get(surface_id) {
            return sender.subscribe();
        }

        let (tx, rx) = broadcast::channel(100);
        self.surface_channels.insert(surface_id.to_string(), tx);
        rx
    }

    /// 取消注册 surface
    pub fn unregister_surface(&self, surface_id: &str) {
        self.surface_channels.remove(surface_id);
    }

    /// 发布事件：进入全局通道，并转发到所属 surface 的通道
    pub fn publish(&self, event: WsEvent) {
        if let Some(surface_id) = event.surface_id() {
            if let Some(sender) = self.surface_channels.get(surface_id) {
                let _ = sender.send(event.clone());
            }
        }

        if let Err(e) = self.global_channel.send(event) {
            tracing::trace!(error = %e, "Event dropped (no receivers)");
        }
    }

    pub fn publish_surface_opened(&self, surface_id: &str) {
        self.publish(WsEvent::SurfaceOpened {
            surface_id: surface_id.to_string(),
        });
    }

    pub fn publish_surface_closed(&self, surface_id: &str, reason: &str) {
        self.publish(WsEvent::SurfaceClosed {
            surface_id: surface_id.to_string(),
            reason: reason.to_string(),
        });
    }

    pub fn publish_generation_started(&self, surface_id: &str, target: &str) {
        self.publish(WsEvent::GenerationStarted {
            surface_id: surface_id.to_string(),
            target: target.to_string(),
        });
    }

    pub fn publish_generation_completed(
        &self,
        surface_id: &str,
        handle_id: Option<String>,
        mime_type: Option<String>,
        size: usize,
    ) {
        self.publish(WsEvent::GenerationCompleted {
            surface_id: surface_id.to_string(),
            handle_id,
            mime_type,
            size,
        });
    }

    pub fn publish_generation_failed(&self, surface_id: &str, kind: &str, error: &str) {
        self.publish(WsEvent::GenerationFailed {
            surface_id: surface_id.to_string(),
            kind: kind.to_string(),
            error: error.to_string(),
        });
    }

    pub fn publish_generation_discarded(&self, surface_id: &str) {
        self.publish(WsEvent::GenerationDiscarded {
            surface_id: surface_id.to_string(),
        });
    }

    pub fn publish_handle_acquired(
        &self,
        surface_id: &str,
        handle_id: &str,
        mime_type: &str,
        size: usize,
    ) {
        self.publish(WsEvent::HandleAcquired {
            surface_id: surface_id.to_string(),
            handle_id: handle_id.to_string(),
            mime_type: mime_type.to_string(),
            size,
        });
    }

    pub fn publish_handle_released(&self, surface_id: &str, handle_id: &str, reason: &str) {
        self.publish(WsEvent::HandleReleased {
            surface_id: surface_id.to_string(),
            handle_id: handle_id.to_string(),
            reason: reason.to_string(),
        });
    }

    pub fn publish_auth_rejected(&self, path: &str) {
        self.publish(WsEvent::AuthRejected {
            path: path.to_string(),
        });
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_surface_and_global_delivery() {
        let publisher = EventPublisher::new();
        let mut global = publisher.subscribe_global();
        let mut surface = publisher.register_surface("main");
        let mut other = publisher.register_surface("other");

        publisher.publish_generation_started("main", "beat");

        let expected = WsEvent::GenerationStarted {
            surface_id: "main".to_string(),
            target: "beat".to_string(),
        };
        assert_eq!(global.recv().await.unwrap(), expected);
        assert_eq!(surface.recv().await.unwrap(), expected);
        assert!(other.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_global_only_events() {
        let publisher = EventPublisher::new();
        let mut global = publisher.subscribe_global();

        publisher.publish_auth_rejected("/api/generate");
        assert_eq!(
            global.recv().await.unwrap(),
            WsEvent::AuthRejected {
                path: "/api/generate".to_string()
            }
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = WsEvent::HandleReleased {
            surface_id: "main".to_string(),
            handle_id: "h1".to_string(),
            reason: "superseded".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "HandleReleased");
        assert_eq!(json["data"]["reason"], "superseded");
    }

    #[test]
    fn test_publish_without_receivers() {
        let publisher = EventPublisher::new();
        publisher.publish_surface_closed("main", "teardown");
    }
}

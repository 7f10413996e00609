//! In-Memory Playback Session Manager Implementation
//!
//! 不变量:
//! - 每个 surface 至多一个存活句柄，新句柄创建前先释放旧句柄
//! - 每次释放恰好撤销一个对象 URL，重复释放为空操作
//! - surface 销毁时释放其句柄并取消进行中的工作
//!
//! 加锁顺序固定为 surfaces -> handles，任何 guard 都不跨越 await

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    ObjectUrlStorePort, PlaybackOutcome, PlaybackSessionPort, PlaybackSource, PlayerPort,
    StoredObject,
};
use crate::domain::playback::{HandleId, HandleState, PlaybackError, PlaybackHandle, SurfaceId};
use crate::infrastructure::events::EventPublisher;

struct SurfaceSlot {
    current: Option<HandleId>,
    cancel: CancellationToken,
}

struct HandleEntry {
    handle: PlaybackHandle,
    state: HandleState,
    /// 当前播放器绑定的停止令牌
    stop: Option<CancellationToken>,
    /// 区分重播，旧的 play 结束时不清理新绑定
    play_seq: u64,
}

/// 内存播放会话管理器
pub struct InMemoryPlaybackManager {
    surfaces: DashMap<SurfaceId, SurfaceSlot>,
    /// 已释放的句柄保留为墓碑，直到过期后被 sweep 清除
    handles: DashMap<HandleId, HandleEntry>,
    store: Arc<dyn ObjectUrlStorePort>,
    handle_ttl: chrono::Duration,
    event_publisher: Option<Arc<EventPublisher>>,
}

impl InMemoryPlaybackManager {
    pub fn new(store: Arc<dyn ObjectUrlStorePort>, handle_ttl: Duration) -> Self {
        let handle_ttl =
            chrono::Duration::from_std(handle_ttl).unwrap_or_else(|_| chrono::Duration::hours(1));
        Self {
            surfaces: DashMap::new(),
            handles: DashMap::new(),
            store,
            handle_ttl,
            event_publisher: None,
        }
    }

    pub fn with_event_publisher(mut self, publisher: Arc<EventPublisher>) -> Self {
        self.event_publisher = Some(publisher);
        self
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn state_of(&self, handle_id: &HandleId) -> Option<HandleState> {
        self.handles.get(handle_id).map(|e| e.state)
    }

    /// 未释放的句柄数量
    pub fn live_handles(&self) -> usize {
        self.handles
            .iter()
            .filter(|e| !e.state.is_released())
            .count()
    }

    /// 将句柄置为 Released 并撤销其 URL；已释放或不存在时返回 None
    fn release_entry(&self, handle_id: &HandleId, reason: &str) -> Option<PlaybackHandle> {
        let handle = {
            let mut entry = self.handles.get_mut(handle_id)?;
            if entry.state.is_released() {
                return None;
            }
            entry.state = HandleState::Released;
            if let Some(stop) = entry.stop.take() {
                stop.cancel();
            }
            entry.handle.clone()
        };

        self.store.revoke(&handle.url);

        tracing::info!(
            handle_id = %handle.id,
            surface_id = %handle.surface_id,
            reason = reason,
            "Playback handle released"
        );
        if let Some(publisher) = &self.event_publisher {
            publisher.publish_handle_released(
                handle.surface_id.as_str(),
                &handle.id.to_string(),
                reason,
            );
        }
        Some(handle)
    }

    fn release_with_reason(&self, handle_id: &HandleId, reason: &str) -> bool {
        let Some(handle) = self.release_entry(handle_id, reason) else {
            return false;
        };

        if let Some(mut slot) = self.surfaces.get_mut(&handle.surface_id) {
            if slot.current == Some(*handle_id) {
                slot.current = None;
            }
        }
        true
    }

    fn acquire_inner(
        &self,
        surface_id: &SurfaceId,
        token: Option<&CancellationToken>,
        payload: Vec<u8>,
        mime_type: &str,
    ) -> Result<PlaybackHandle, PlaybackError> {
        let handle = {
            let mut slot = self
                .surfaces
                .get_mut(surface_id)
                .ok_or_else(|| PlaybackError::SurfaceClosed(surface_id.clone()))?;

            // teardown 先取消令牌再移除 slot，持有 guard 时检查即可排除重新打开的 surface
            if token.is_some_and(|t| t.is_cancelled()) {
                return Err(PlaybackError::SurfaceClosed(surface_id.clone()));
            }

            if let Some(previous) = slot.current.take() {
                self.release_entry(&previous, "superseded");
            }

            let size = payload.len();
            let url = self.store.create(Arc::from(payload), mime_type);
            let handle =
                PlaybackHandle::new(surface_id.clone(), url, mime_type, size, self.handle_ttl);

            self.handles.insert(
                handle.id,
                HandleEntry {
                    handle: handle.clone(),
                    state: HandleState::Created,
                    stop: None,
                    play_seq: 0,
                },
            );
            slot.current = Some(handle.id);
            handle
        };

        tracing::info!(
            handle_id = %handle.id,
            surface_id = %surface_id,
            mime_type = %handle.mime_type,
            size = handle.size,
            "Playback handle acquired"
        );
        if let Some(publisher) = &self.event_publisher {
            publisher.publish_handle_acquired(
                surface_id.as_str(),
                &handle.id.to_string(),
                &handle.mime_type,
                handle.size,
            );
        }
        Ok(handle)
    }
}

#[async_trait]
impl PlaybackSessionPort for InMemoryPlaybackManager {
    fn open_surface(&self, surface_id: &SurfaceId) -> bool {
        let opened = match self.surfaces.entry(surface_id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(SurfaceSlot {
                    current: None,
                    cancel: CancellationToken::new(),
                });
                true
            }
        };

        if opened {
            tracing::info!(surface_id = %surface_id, "Surface opened");
            if let Some(publisher) = &self.event_publisher {
                publisher.publish_surface_opened(surface_id.as_str());
            }
        }
        opened
    }

    fn is_open(&self, surface_id: &SurfaceId) -> bool {
        self.surfaces.contains_key(surface_id)
    }

    fn cancellation_token(&self, surface_id: &SurfaceId) -> Option<CancellationToken> {
        self.surfaces.get(surface_id).map(|slot| slot.cancel.clone())
    }

    fn acquire(
        &self,
        surface_id: &SurfaceId,
        payload: Vec<u8>,
        mime_type: &str,
    ) -> Result<PlaybackHandle, PlaybackError> {
        self.acquire_inner(surface_id, None, payload, mime_type)
    }

    fn acquire_scoped(
        &self,
        surface_id: &SurfaceId,
        token: &CancellationToken,
        payload: Vec<u8>,
        mime_type: &str,
    ) -> Result<PlaybackHandle, PlaybackError> {
        self.acquire_inner(surface_id, Some(token), payload, mime_type)
    }

    fn release(&self, handle_id: &HandleId) -> bool {
        self.release_with_reason(handle_id, "released")
    }

    fn current(&self, surface_id: &SurfaceId) -> Option<PlaybackHandle> {
        let handle_id = self.surfaces.get(surface_id).and_then(|slot| slot.current)?;
        self.handles
            .get(&handle_id)
            .filter(|e| !e.state.is_released())
            .map(|e| e.handle.clone())
    }

    fn resolve(&self, handle_id: &HandleId) -> Result<StoredObject, PlaybackError> {
        let url = {
            let entry = self
                .handles
                .get(handle_id)
                .ok_or(PlaybackError::HandleNotFound(*handle_id))?;
            if entry.state.is_released() {
                return Err(PlaybackError::HandleReleased(*handle_id));
            }
            entry.handle.url.clone()
        };

        self.store
            .get(&url)
            .ok_or(PlaybackError::HandleReleased(*handle_id))
    }

    async fn play(
        &self,
        handle_id: &HandleId,
        player: &dyn PlayerPort,
    ) -> Result<PlaybackOutcome, PlaybackError> {
        let (source, stop, seq) = {
            let mut entry = self
                .handles
                .get_mut(handle_id)
                .ok_or(PlaybackError::HandleNotFound(*handle_id))?;

            let next = entry.state.activate(*handle_id)?;
            let stored = self
                .store
                .get(&entry.handle.url)
                .ok_or(PlaybackError::HandleReleased(*handle_id))?;
            entry.state = next;

            // 重播时打断上一次播放
            let stop = CancellationToken::new();
            if let Some(previous) = entry.stop.replace(stop.clone()) {
                previous.cancel();
            }
            entry.play_seq += 1;

            let source = PlaybackSource {
                url: entry.handle.url.clone(),
                payload: stored.payload,
                mime_type: stored.mime_type,
            };
            (source, stop, entry.play_seq)
        };

        tracing::info!(handle_id = %handle_id, "Playback started");

        let result = tokio::select! {
            biased;
            _ = stop.cancelled() => Ok(PlaybackOutcome::Stopped),
            played = player.play(source, stop.clone()) => played.map(|_| PlaybackOutcome::Finished),
        };

        // 解除播放器绑定
        if let Some(mut entry) = self.handles.get_mut(handle_id) {
            if entry.play_seq == seq {
                entry.stop = None;
            }
        }

        match result {
            Ok(outcome) => {
                tracing::info!(handle_id = %handle_id, outcome = ?outcome, "Playback ended");
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(handle_id = %handle_id, error = %e, "Playback failed");
                Err(PlaybackError::PlayerFailed(e.to_string()))
            }
        }
    }

    fn stop(&self, handle_id: &HandleId) -> bool {
        let stop = self
            .handles
            .get_mut(handle_id)
            .and_then(|mut entry| entry.stop.take());

        match stop {
            Some(stop) => {
                stop.cancel();
                tracing::debug!(handle_id = %handle_id, "Playback stop requested");
                true
            }
            None => false,
        }
    }

    fn teardown(&self, surface_id: &SurfaceId) -> bool {
        // 移除前取消，重新打开的 surface 一定看到旧令牌已取消
        if let Some(slot) = self.surfaces.get(surface_id) {
            slot.cancel.cancel();
        }
        let Some((_, slot)) = self.surfaces.remove(surface_id) else {
            return false;
        };

        if let Some(handle_id) = slot.current {
            self.release_entry(&handle_id, "teardown");
        }

        tracing::info!(surface_id = %surface_id, "Surface torn down");
        if let Some(publisher) = &self.event_publisher {
            publisher.publish_surface_closed(surface_id.as_str(), "teardown");
        }
        true
    }

    fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let mut expired = Vec::new();
        let mut tombstones = Vec::new();

        for entry in self.handles.iter() {
            if entry.handle.is_expired(now) {
                if entry.state.is_released() {
                    tombstones.push(*entry.key());
                } else {
                    expired.push(*entry.key());
                }
            }
        }

        let released = expired
            .iter()
            .filter(|id| self.release_with_reason(id, "expired"))
            .count();

        for id in &tombstones {
            self.handles.remove(id);
        }

        if released > 0 || !tombstones.is_empty() {
            tracing::info!(
                released = released,
                purged = tombstones.len(),
                "Expired playback handles swept"
            );
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{PlayerError, SurfaceScope};
    use crate::infrastructure::adapters::backend::{silent_wav, wav_header_stub};
    use crate::infrastructure::adapters::player::HeadlessPlayer;
    use crate::infrastructure::memory::InMemoryObjectUrlStore;

    struct InstantPlayer;

    #[async_trait]
    impl PlayerPort for InstantPlayer {
        async fn play(
            &self,
            _source: PlaybackSource,
            _stop: CancellationToken,
        ) -> Result<(), PlayerError> {
            Ok(())
        }
    }

    struct BrokenPlayer;

    #[async_trait]
    impl PlayerPort for BrokenPlayer {
        async fn play(
            &self,
            _source: PlaybackSource,
            _stop: CancellationToken,
        ) -> Result<(), PlayerError> {
            Err(PlayerError::Failed("no output device".to_string()))
        }
    }

    fn setup() -> (Arc<InMemoryObjectUrlStore>, Arc<InMemoryPlaybackManager>) {
        let store = Arc::new(InMemoryObjectUrlStore::new());
        let manager = InMemoryPlaybackManager::new(store.clone(), Duration::from_secs(3600)).arc();
        (store, manager)
    }

    async fn wait_until_active(manager: &InMemoryPlaybackManager, id: &HandleId) {
        for _ in 0..200 {
            if manager.state_of(id) == Some(HandleState::Active) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("handle never became active");
    }

    #[test]
    fn test_supersession_releases_exactly_once() {
        let (store, manager) = setup();
        let surface = SurfaceId::new("main");
        assert!(manager.open_surface(&surface));

        let first = manager.acquire(&surface, vec![1], "audio/wav").unwrap();
        let second = manager.acquire(&surface, vec![2], "audio/wav").unwrap();
        let third = manager.acquire(&surface, vec![3], "audio/wav").unwrap();

        assert_eq!(manager.state_of(&first.id), Some(HandleState::Released));
        assert_eq!(manager.state_of(&second.id), Some(HandleState::Released));
        assert_eq!(manager.state_of(&third.id), Some(HandleState::Created));
        assert_eq!(manager.current(&surface).unwrap().id, third.id);
        assert_eq!(store.live_count(), 1);

        assert!(manager.teardown(&surface));

        // 2 次替换 + 1 次销毁
        assert_eq!(store.revoked_count(), 3);
        assert_eq!(store.created_count(), 3);
        assert_eq!(store.live_count(), 0);
        assert_eq!(manager.live_handles(), 0);
        assert!(!manager.release(&first.id));
    }

    #[test]
    fn test_release_is_idempotent() {
        let (store, manager) = setup();
        let surface = SurfaceId::new("main");
        manager.open_surface(&surface);
        let handle = manager.acquire(&surface, vec![1, 2], "audio/wav").unwrap();

        assert!(manager.release(&handle.id));
        assert!(!manager.release(&handle.id));
        assert!(!manager.release(&HandleId::new()));

        assert_eq!(store.revoked_count(), 1);
        assert!(manager.current(&surface).is_none());
        assert!(matches!(
            manager.resolve(&handle.id),
            Err(PlaybackError::HandleReleased(_))
        ));

        // 释放后 teardown 不会重复撤销
        manager.teardown(&surface);
        assert_eq!(store.revoked_count(), 1);
    }

    #[test]
    fn test_acquire_on_closed_surface() {
        let (store, manager) = setup();
        let surface = SurfaceId::new("gone");

        let err = manager.acquire(&surface, vec![1], "audio/wav").unwrap_err();
        assert_eq!(err, PlaybackError::SurfaceClosed(surface.clone()));

        manager.open_surface(&surface);
        manager.teardown(&surface);
        assert!(manager.acquire(&surface, vec![1], "audio/wav").is_err());
        assert_eq!(store.created_count(), 0);
    }

    #[test]
    fn test_open_and_teardown_are_idempotent() {
        let (_, manager) = setup();
        let surface = SurfaceId::new("main");
        assert!(manager.open_surface(&surface));
        assert!(!manager.open_surface(&surface));
        assert!(manager.teardown(&surface));
        assert!(!manager.teardown(&surface));
    }

    #[test]
    fn test_teardown_cancels_surface_token() {
        let (_, manager) = setup();
        let surface = SurfaceId::new("main");
        manager.open_surface(&surface);
        let token = manager.cancellation_token(&surface).unwrap();

        manager.teardown(&surface);
        assert!(token.is_cancelled());
        assert!(manager.cancellation_token(&surface).is_none());
    }

    #[test]
    fn test_stale_token_cannot_supersede_reopened_surface() {
        let (store, manager) = setup();
        let surface = SurfaceId::new("main");
        manager.open_surface(&surface);
        let stale = manager.cancellation_token(&surface).unwrap();

        manager.teardown(&surface);
        manager.open_surface(&surface);
        let fresh = manager.cancellation_token(&surface).unwrap();
        let current = manager.acquire(&surface, vec![1], "audio/wav").unwrap();

        let err = manager
            .acquire_scoped(&surface, &stale, vec![2], "audio/wav")
            .unwrap_err();
        assert_eq!(err, PlaybackError::SurfaceClosed(surface.clone()));
        assert_eq!(manager.current(&surface).unwrap().id, current.id);
        assert_eq!(store.revoked_count(), 0);
        assert_eq!(store.created_count(), 1);

        let replaced = manager
            .acquire_scoped(&surface, &fresh, vec![3], "audio/wav")
            .unwrap();
        assert_eq!(manager.current(&surface).unwrap().id, replaced.id);
        assert_eq!(manager.state_of(&current.id), Some(HandleState::Released));
    }

    #[test]
    fn test_resolve_returns_payload() {
        let (_, manager) = setup();
        let surface = SurfaceId::new("main");
        manager.open_surface(&surface);
        let handle = manager.acquire(&surface, wav_header_stub(), "audio/wav").unwrap();

        let object = manager.resolve(&handle.id).unwrap();
        assert_eq!(object.payload.len(), 44);
        assert_eq!(object.mime_type, "audio/wav");
        assert_eq!(handle.size, 44);
    }

    #[tokio::test]
    async fn test_play_and_replay() {
        let (_, manager) = setup();
        let surface = SurfaceId::new("main");
        manager.open_surface(&surface);
        let handle = manager.acquire(&surface, wav_header_stub(), "audio/wav").unwrap();

        let outcome = manager.play(&handle.id, &InstantPlayer).await.unwrap();
        assert_eq!(outcome, PlaybackOutcome::Finished);
        assert_eq!(manager.state_of(&handle.id), Some(HandleState::Active));

        let outcome = manager.play(&handle.id, &InstantPlayer).await.unwrap();
        assert_eq!(outcome, PlaybackOutcome::Finished);

        manager.release(&handle.id);
        assert!(matches!(
            manager.play(&handle.id, &InstantPlayer).await,
            Err(PlaybackError::HandleReleased(_))
        ));
        assert_eq!(manager.state_of(&handle.id), Some(HandleState::Released));
    }

    #[tokio::test]
    async fn test_player_failure_keeps_payload() {
        let (_, manager) = setup();
        let surface = SurfaceId::new("main");
        manager.open_surface(&surface);
        let handle = manager.acquire(&surface, wav_header_stub(), "audio/wav").unwrap();

        let err = manager.play(&handle.id, &BrokenPlayer).await.unwrap_err();
        assert!(matches!(err, PlaybackError::PlayerFailed(_)));

        assert!(manager.resolve(&handle.id).is_ok());
        let outcome = manager.play(&handle.id, &InstantPlayer).await.unwrap();
        assert_eq!(outcome, PlaybackOutcome::Finished);
    }

    #[tokio::test]
    async fn test_stop_interrupts_play() {
        let (_, manager) = setup();
        let surface = SurfaceId::new("main");
        manager.open_surface(&surface);
        let handle = manager
            .acquire(&surface, silent_wav(8000, 80_000), "audio/wav")
            .unwrap();

        let task = {
            let manager = manager.clone();
            let id = handle.id;
            tokio::spawn(async move {
                let player = HeadlessPlayer::new();
                manager.play(&id, &player).await
            })
        };

        wait_until_active(&manager, &handle.id).await;
        assert!(manager.stop(&handle.id));

        let outcome = task.await.unwrap().unwrap();
        assert_eq!(outcome, PlaybackOutcome::Stopped);
        assert!(!manager.stop(&handle.id));
        assert!(manager.resolve(&handle.id).is_ok());
    }

    #[tokio::test]
    async fn test_teardown_during_play_releases_handle() {
        let (store, manager) = setup();
        let surface = SurfaceId::new("main");
        manager.open_surface(&surface);
        let handle = manager
            .acquire(&surface, silent_wav(8000, 80_000), "audio/wav")
            .unwrap();

        let task = {
            let manager = manager.clone();
            let id = handle.id;
            tokio::spawn(async move {
                let player = HeadlessPlayer::new();
                manager.play(&id, &player).await
            })
        };

        wait_until_active(&manager, &handle.id).await;
        manager.teardown(&surface);

        assert_eq!(task.await.unwrap().unwrap(), PlaybackOutcome::Stopped);
        assert_eq!(manager.state_of(&handle.id), Some(HandleState::Released));
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_surface_scope_releases_on_drop() {
        let (store, manager) = setup();
        let port: Arc<dyn PlaybackSessionPort> = manager.clone();

        let handle = {
            let scope = SurfaceScope::open(port, SurfaceId::new("modal"));
            scope
                .manager()
                .acquire(scope.id(), vec![1, 2, 3], "audio/wav")
                .unwrap()
        };

        assert_eq!(manager.state_of(&handle.id), Some(HandleState::Released));
        assert!(!manager.is_open(&SurfaceId::new("modal")));
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_surface_scope_releases_on_error_path() {
        let (store, manager) = setup();
        let port: Arc<dyn PlaybackSessionPort> = manager.clone();

        fn failing_flow(port: Arc<dyn PlaybackSessionPort>) -> Result<(), PlaybackError> {
            let scope = SurfaceScope::open(port, SurfaceId::new("flow"));
            scope.manager().acquire(scope.id(), vec![7], "audio/wav")?;
            Err(PlaybackError::PlayerFailed("device lost".to_string()))
        }

        assert!(failing_flow(port).is_err());
        assert_eq!(store.live_count(), 0);
        assert_eq!(store.revoked_count(), 1);
    }

    #[test]
    fn test_sweep_expired_handles() {
        let store = Arc::new(InMemoryObjectUrlStore::new());
        let manager = InMemoryPlaybackManager::new(store.clone(), Duration::ZERO);
        let surface = SurfaceId::new("main");
        manager.open_surface(&surface);
        let handle = manager.acquire(&surface, vec![1], "audio/wav").unwrap();

        assert_eq!(manager.sweep_expired(), 1);
        assert_eq!(manager.state_of(&handle.id), Some(HandleState::Released));
        assert!(manager.current(&surface).is_none());
        assert_eq!(store.live_count(), 0);

        // 第二轮清除墓碑
        assert_eq!(manager.sweep_expired(), 0);
        assert_eq!(manager.state_of(&handle.id), None);
    }

    #[tokio::test]
    async fn test_release_events_are_published() {
        let store = Arc::new(InMemoryObjectUrlStore::new());
        let publisher = Arc::new(EventPublisher::new());
        let mut events = publisher.subscribe_global();
        let manager = InMemoryPlaybackManager::new(store, Duration::from_secs(60))
            .with_event_publisher(publisher.clone());

        let surface = SurfaceId::new("main");
        manager.open_surface(&surface);
        let first = manager.acquire(&surface, vec![1], "audio/wav").unwrap();
        manager.acquire(&surface, vec![2], "audio/wav").unwrap();

        use crate::infrastructure::events::WsEvent;
        let mut released = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let WsEvent::HandleReleased { handle_id, reason, .. } = event {
                released.push((handle_id, reason));
            }
        }
        assert_eq!(released, vec![(first.id.to_string(), "superseded".to_string())]);
    }
}

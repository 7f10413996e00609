//! In-Memory Object URL Store Implementation

use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::application::ports::{ObjectUrlStorePort, StoredObject};
use crate::domain::playback::ObjectUrl;

/// 内存对象 URL 存储
pub struct InMemoryObjectUrlStore {
    objects: DashMap<ObjectUrl, StoredObject>,
    created: AtomicUsize,
    revoked: AtomicUsize,
}

impl InMemoryObjectUrlStore {
    pub fn new() -> Self {
        Self {
            objects: DashMap::new(),
            created: AtomicUsize::new(0),
            revoked: AtomicUsize::new(0),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 累计创建次数
    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// 累计撤销次数
    pub fn revoked_count(&self) -> usize {
        self.revoked.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryObjectUrlStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectUrlStorePort for InMemoryObjectUrlStore {
    fn create(&self, payload: Arc<[u8]>, mime_type: &str) -> ObjectUrl {
        let url = ObjectUrl::generate();
        let size = payload.len();
        self.objects.insert(
            url.clone(),
            StoredObject {
                payload,
                mime_type: mime_type.to_string(),
            },
        );
        self.created.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(url = %url, size = size, "Object URL created");
        url
    }

    fn revoke(&self, url: &ObjectUrl) -> bool {
        let revoked = self.objects.remove(url).is_some();
        if revoked {
            self.revoked.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(url = %url, "Object URL revoked");
        }
        revoked
    }

    fn get(&self, url: &ObjectUrl) -> Option<StoredObject> {
        self.objects.get(url).map(|o| o.clone())
    }

    fn live_count(&self) -> usize {
        self.objects.len()
    }
}

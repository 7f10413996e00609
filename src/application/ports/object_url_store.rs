//! Object URL Store Port - 可撤销本地引用
//!
//! 对应浏览器的 `URL.createObjectURL` / `URL.revokeObjectURL`

use std::sync::Arc;

use crate::domain::playback::ObjectUrl;

/// 引用背后的负载
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub payload: Arc<[u8]>,
    pub mime_type: String,
}

pub trait ObjectUrlStorePort: Send + Sync {
    /// 为负载创建新的引用
    fn create(&self, payload: Arc<[u8]>, mime_type: &str) -> ObjectUrl;

    /// 撤销引用，返回是否确实撤销了一个存活的引用
    fn revoke(&self, url: &ObjectUrl) -> bool;

    /// 读取存活引用的负载
    fn get(&self, url: &ObjectUrl) -> Option<StoredObject>;

    /// 存活引用数量
    fn live_count(&self) -> usize;
}

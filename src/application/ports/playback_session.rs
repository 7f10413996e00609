//! Playback Session Port - 播放句柄生命周期管理
//!
//! 每个 UI surface 至多持有一个存活句柄，具体实现在 infrastructure/memory 层

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::object_url_store::StoredObject;
use super::player::PlayerPort;
use crate::domain::playback::{HandleId, PlaybackError, PlaybackHandle, SurfaceId};

/// 一次 play 调用的结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// 播放器自然结束
    Finished,
    /// 被 stop、释放、替换或 surface 销毁打断
    Stopped,
}

#[async_trait]
pub trait PlaybackSessionPort: Send + Sync {
    /// 打开 surface，已打开时返回 false
    fn open_surface(&self, surface_id: &SurfaceId) -> bool;

    fn is_open(&self, surface_id: &SurfaceId) -> bool;

    /// surface 的取消令牌，销毁时被取消
    fn cancellation_token(&self, surface_id: &SurfaceId) -> Option<CancellationToken>;

    /// 为负载创建句柄，先释放该 surface 的旧句柄
    fn acquire(
        &self,
        surface_id: &SurfaceId,
        payload: Vec<u8>,
        mime_type: &str,
    ) -> Result<PlaybackHandle, PlaybackError>;

    /// 同 acquire，但仅当 token 所属的那次 surface 打开仍然有效时才创建句柄
    ///
    /// token 已取消（surface 被销毁，即使随后以同一 id 重新打开）时返回 SurfaceClosed，
    /// 不会替换重新打开后的 surface 上的句柄
    fn acquire_scoped(
        &self,
        surface_id: &SurfaceId,
        token: &CancellationToken,
        payload: Vec<u8>,
        mime_type: &str,
    ) -> Result<PlaybackHandle, PlaybackError>;

    /// 幂等释放，返回是否确实释放了一个存活句柄
    fn release(&self, handle_id: &HandleId) -> bool;

    /// surface 当前的存活句柄
    fn current(&self, surface_id: &SurfaceId) -> Option<PlaybackHandle>;

    /// 存活句柄背后的负载
    fn resolve(&self, handle_id: &HandleId) -> Result<StoredObject, PlaybackError>;

    /// 播放直到结束或被打断
    async fn play(
        &self,
        handle_id: &HandleId,
        player: &dyn PlayerPort,
    ) -> Result<PlaybackOutcome, PlaybackError>;

    /// 打断正在进行的播放，返回是否有播放被打断
    fn stop(&self, handle_id: &HandleId) -> bool;

    /// 销毁 surface：取消进行中的工作并释放句柄，幂等
    fn teardown(&self, surface_id: &SurfaceId) -> bool;

    /// 释放所有过期句柄，返回释放数量
    fn sweep_expired(&self) -> usize;
}

/// Surface 作用域守卫
///
/// drop 时销毁 surface，覆盖成功、错误、提前返回和 panic 展开等所有退出路径
pub struct SurfaceScope {
    manager: Arc<dyn PlaybackSessionPort>,
    surface_id: SurfaceId,
}

impl SurfaceScope {
    pub fn open(manager: Arc<dyn PlaybackSessionPort>, surface_id: SurfaceId) -> Self {
        manager.open_surface(&surface_id);
        Self {
            manager,
            surface_id,
        }
    }

    pub fn id(&self) -> &SurfaceId {
        &self.surface_id
    }

    pub fn manager(&self) -> &Arc<dyn PlaybackSessionPort> {
        &self.manager
    }
}

impl Drop for SurfaceScope {
    fn drop(&mut self) {
        self.manager.teardown(&self.surface_id);
    }
}

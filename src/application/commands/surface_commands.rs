//! Surface Commands - surface 与播放句柄生命周期命令

use crate::application::ports::PlaybackOutcome;
use crate::domain::playback::{HandleId, SurfaceId};

/// 打开 surface 命令，未指定 id 时自动生成
#[derive(Debug, Clone, Default)]
pub struct OpenSurfaceCommand {
    pub surface_id: Option<SurfaceId>,
}

#[derive(Debug, Clone)]
pub struct OpenSurfaceResponse {
    pub surface_id: SurfaceId,
    /// false 表示 surface 已经打开
    pub opened: bool,
}

/// 关闭 surface 命令
#[derive(Debug, Clone)]
pub struct CloseSurfaceCommand {
    pub surface_id: SurfaceId,
}

#[derive(Debug, Clone)]
pub struct CloseSurfaceResponse {
    pub surface_id: SurfaceId,
    pub closed: bool,
}

/// 释放播放句柄命令
#[derive(Debug, Clone)]
pub struct ReleasePlaybackCommand {
    pub handle_id: HandleId,
}

#[derive(Debug, Clone)]
pub struct ReleasePlaybackResponse {
    pub handle_id: HandleId,
    /// 重复释放时为 false
    pub released: bool,
}

/// 播放句柄命令，直到播放结束或被打断才返回
#[derive(Debug, Clone)]
pub struct PlayPlaybackCommand {
    pub handle_id: HandleId,
}

#[derive(Debug, Clone)]
pub struct PlayPlaybackResponse {
    pub handle_id: HandleId,
    pub outcome: PlaybackOutcome,
}

/// 打断播放命令
#[derive(Debug, Clone)]
pub struct StopPlaybackCommand {
    pub handle_id: HandleId,
}

#[derive(Debug, Clone)]
pub struct StopPlaybackResponse {
    pub handle_id: HandleId,
    /// 没有进行中的播放时为 false
    pub stopped: bool,
}

//! Surface Command Handlers

use std::sync::Arc;

use crate::application::commands::surface_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{PlaybackSessionPort, PlayerPort};
use crate::domain::playback::SurfaceId;

/// OpenSurface Handler - 打开 surface
pub struct OpenSurfaceHandler {
    playback: Arc<dyn PlaybackSessionPort>,
}

impl OpenSurfaceHandler {
    pub fn new(playback: Arc<dyn PlaybackSessionPort>) -> Self {
        Self { playback }
    }

    pub async fn handle(
        &self,
        cmd: OpenSurfaceCommand,
    ) -> Result<OpenSurfaceResponse, ApplicationError> {
        let surface_id = match cmd.surface_id {
            Some(id) if id.as_str().trim().is_empty() => {
                return Err(ApplicationError::validation("surface_id must not be blank"));
            }
            Some(id) => id,
            None => SurfaceId::generate(),
        };

        let opened = self.playback.open_surface(&surface_id);
        if !opened {
            tracing::debug!(surface_id = %surface_id, "Surface already open");
        }

        Ok(OpenSurfaceResponse { surface_id, opened })
    }
}

/// CloseSurface Handler - 销毁 surface，取消进行中的请求并释放句柄
pub struct CloseSurfaceHandler {
    playback: Arc<dyn PlaybackSessionPort>,
}

impl CloseSurfaceHandler {
    pub fn new(playback: Arc<dyn PlaybackSessionPort>) -> Self {
        Self { playback }
    }

    pub async fn handle(
        &self,
        cmd: CloseSurfaceCommand,
    ) -> Result<CloseSurfaceResponse, ApplicationError> {
        let closed = self.playback.teardown(&cmd.surface_id);
        Ok(CloseSurfaceResponse {
            surface_id: cmd.surface_id,
            closed,
        })
    }
}

/// ReleasePlayback Handler - 幂等释放句柄
pub struct ReleasePlaybackHandler {
    playback: Arc<dyn PlaybackSessionPort>,
}

impl ReleasePlaybackHandler {
    pub fn new(playback: Arc<dyn PlaybackSessionPort>) -> Self {
        Self { playback }
    }

    pub async fn handle(
        &self,
        cmd: ReleasePlaybackCommand,
    ) -> Result<ReleasePlaybackResponse, ApplicationError> {
        let released = self.playback.release(&cmd.handle_id);
        Ok(ReleasePlaybackResponse {
            handle_id: cmd.handle_id,
            released,
        })
    }
}

/// PlayPlayback Handler - 用注入的播放器播放句柄
pub struct PlayPlaybackHandler {
    playback: Arc<dyn PlaybackSessionPort>,
    player: Arc<dyn PlayerPort>,
}

impl PlayPlaybackHandler {
    pub fn new(playback: Arc<dyn PlaybackSessionPort>, player: Arc<dyn PlayerPort>) -> Self {
        Self { playback, player }
    }

    pub async fn handle(
        &self,
        cmd: PlayPlaybackCommand,
    ) -> Result<PlayPlaybackResponse, ApplicationError> {
        let outcome = self
            .playback
            .play(&cmd.handle_id, self.player.as_ref())
            .await?;
        Ok(PlayPlaybackResponse {
            handle_id: cmd.handle_id,
            outcome,
        })
    }
}

/// StopPlayback Handler
pub struct StopPlaybackHandler {
    playback: Arc<dyn PlaybackSessionPort>,
}

impl StopPlaybackHandler {
    pub fn new(playback: Arc<dyn PlaybackSessionPort>) -> Self {
        Self { playback }
    }

    pub async fn handle(
        &self,
        cmd: StopPlaybackCommand,
    ) -> Result<StopPlaybackResponse, ApplicationError> {
        let stopped = self.playback.stop(&cmd.handle_id);
        Ok(StopPlaybackResponse {
            handle_id: cmd.handle_id,
            stopped,
        })
    }
}

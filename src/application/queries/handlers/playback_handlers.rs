//! Playback Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::PlaybackSessionPort;
use crate::application::queries::playback_queries::*;

/// GetPlaybackAudio Handler - 对象 URL 撤销后返回错误
pub struct GetPlaybackAudioHandler {
    playback: Arc<dyn PlaybackSessionPort>,
}

impl GetPlaybackAudioHandler {
    pub fn new(playback: Arc<dyn PlaybackSessionPort>) -> Self {
        Self { playback }
    }

    pub async fn handle(
        &self,
        query: GetPlaybackAudioQuery,
    ) -> Result<GetPlaybackAudioResponse, ApplicationError> {
        let object = self.playback.resolve(&query.handle_id)?;
        Ok(GetPlaybackAudioResponse {
            audio_data: object.payload,
            content_type: object.mime_type,
        })
    }
}

/// GetCurrentPlayback Handler
pub struct GetCurrentPlaybackHandler {
    playback: Arc<dyn PlaybackSessionPort>,
}

impl GetCurrentPlaybackHandler {
    pub fn new(playback: Arc<dyn PlaybackSessionPort>) -> Self {
        Self { playback }
    }

    pub async fn handle(
        &self,
        query: GetCurrentPlaybackQuery,
    ) -> Result<GetCurrentPlaybackResponse, ApplicationError> {
        let open = self.playback.is_open(&query.surface_id);
        let handle = self.playback.current(&query.surface_id);
        Ok(GetCurrentPlaybackResponse {
            surface_id: query.surface_id,
            open,
            handle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::playback::{PlaybackError, SurfaceId};
    use crate::infrastructure::memory::{InMemoryObjectUrlStore, InMemoryPlaybackManager};
    use std::time::Duration;

    #[tokio::test]
    async fn test_audio_unavailable_after_release() {
        let store = Arc::new(InMemoryObjectUrlStore::new());
        let manager = InMemoryPlaybackManager::new(store, Duration::from_secs(60)).arc();
        let surface = SurfaceId::new("main");
        manager.open_surface(&surface);
        let handle = manager.acquire(&surface, vec![9, 9], "audio/mpeg").unwrap();

        let handler = GetPlaybackAudioHandler::new(manager.clone());
        let audio = handler
            .handle(GetPlaybackAudioQuery { handle_id: handle.id })
            .await
            .unwrap();
        assert_eq!(&*audio.audio_data, &[9, 9]);
        assert_eq!(audio.content_type, "audio/mpeg");

        let current = GetCurrentPlaybackHandler::new(manager.clone())
            .handle(GetCurrentPlaybackQuery {
                surface_id: surface.clone(),
            })
            .await
            .unwrap();
        assert!(current.open);
        assert_eq!(current.handle.map(|h| h.id), Some(handle.id));

        manager.release(&handle.id);
        let err = handler
            .handle(GetPlaybackAudioQuery { handle_id: handle.id })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Playback(PlaybackError::HandleReleased(_))
        ));
    }
}

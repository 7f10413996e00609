//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    CloseSurfaceHandler, GenerateAudioHandler, OpenSurfaceHandler, PlayPlaybackHandler,
    ReleasePlaybackHandler, StopPlaybackHandler,
    // Query handlers
    GetCurrentPlaybackHandler, GetPlaybackAudioHandler,
    // Ports
    AuthorizerPort, GenerationGateway, PlaybackSessionPort, PlayerPort,
};
use crate::domain::generation::GenerationSettings;
use crate::infrastructure::events::EventPublisher;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub playback: Arc<dyn PlaybackSessionPort>,
    pub gateway: Arc<GenerationGateway>,
    pub authorizer: Arc<dyn AuthorizerPort>,
    pub event_publisher: Arc<EventPublisher>,
    /// 拼接播放地址用的公开 Base URL
    pub public_base_url: String,

    // ========== Command Handlers ==========
    pub generate_audio_handler: GenerateAudioHandler,
    pub open_surface_handler: OpenSurfaceHandler,
    pub close_surface_handler: CloseSurfaceHandler,
    pub release_playback_handler: ReleasePlaybackHandler,
    pub play_playback_handler: PlayPlaybackHandler,
    pub stop_playback_handler: StopPlaybackHandler,

    // ========== Query Handlers ==========
    pub get_playback_audio_handler: GetPlaybackAudioHandler,
    pub get_current_playback_handler: GetCurrentPlaybackHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        playback: Arc<dyn PlaybackSessionPort>,
        gateway: Arc<GenerationGateway>,
        authorizer: Arc<dyn AuthorizerPort>,
        player: Arc<dyn PlayerPort>,
        event_publisher: Arc<EventPublisher>,
        default_settings: GenerationSettings,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            // Ports
            playback: playback.clone(),
            gateway: gateway.clone(),
            authorizer,
            event_publisher: event_publisher.clone(),
            public_base_url: public_base_url.into(),

            // Command handlers
            generate_audio_handler: GenerateAudioHandler::new(
                gateway,
                playback.clone(),
                event_publisher,
            )
            .with_default_settings(default_settings),
            open_surface_handler: OpenSurfaceHandler::new(playback.clone()),
            close_surface_handler: CloseSurfaceHandler::new(playback.clone()),
            release_playback_handler: ReleasePlaybackHandler::new(playback.clone()),
            play_playback_handler: PlayPlaybackHandler::new(playback.clone(), player),
            stop_playback_handler: StopPlaybackHandler::new(playback.clone()),

            // Query handlers
            get_playback_audio_handler: GetPlaybackAudioHandler::new(playback.clone()),
            get_current_playback_handler: GetCurrentPlaybackHandler::new(playback),
        }
    }
}

//! Headless Player - 无输出设备的播放器
//!
//! 用 symphonia 探测音频时长，占用播放槽位同样长的时间（或直到被 stop）。
//! 服务端没有声卡，真正的出声发生在浏览器；这里负责让句柄的
//! Active 状态与播放时长一致。

use async_trait::async_trait;
use std::io::Cursor;
use std::time::Duration;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{PlaybackSource, PlayerError, PlayerPort};

#[derive(Debug, Clone, Default)]
pub struct HeadlessPlayer;

impl HeadlessPlayer {
    pub fn new() -> Self {
        Self
    }

    /// 探测音频时长
    pub fn probe_duration(payload: &[u8], mime_type: &str) -> Result<Duration, PlayerError> {
        let cursor = Cursor::new(payload.to_vec());
        let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

        let mut hint = Hint::new();
        hint.mime_type(mime_type);

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| PlayerError::Unsupported(format!("Probe failed: {}", e)))?;

        let track = probed
            .format
            .default_track()
            .ok_or_else(|| PlayerError::Unsupported("No audio track found".to_string()))?;

        let sample_rate = track
            .codec_params
            .sample_rate
            .filter(|rate| *rate > 0)
            .ok_or_else(|| PlayerError::Unsupported("Unknown sample rate".to_string()))?;

        let frames = track.codec_params.n_frames.unwrap_or(0);
        Ok(Duration::from_millis(frames * 1000 / sample_rate as u64))
    }
}

#[async_trait]
impl PlayerPort for HeadlessPlayer {
    async fn play(
        &self,
        source: PlaybackSource,
        stop: CancellationToken,
    ) -> Result<(), PlayerError> {
        let duration = Self::probe_duration(&source.payload, &source.mime_type)?;

        tracing::debug!(
            url = %source.url,
            mime_type = %source.mime_type,
            duration_ms = duration.as_millis() as u64,
            "Headless playback started"
        );

        tokio::select! {
            _ = tokio::time::sleep(duration) => {
                tracing::debug!(url = %source.url, "Headless playback finished");
            }
            _ = stop.cancelled() => {
                tracing::debug!(url = %source.url, "Headless playback stopped");
            }
        }
        Ok(())
    }
}

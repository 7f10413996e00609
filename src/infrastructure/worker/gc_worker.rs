//! GC Worker - 定期释放过期的播放句柄

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::application::ports::PlaybackSessionPort;

/// Worker 配置
#[derive(Debug, Clone)]
pub struct GcWorkerConfig {
    /// 扫描间隔
    pub interval: Duration,
}

impl Default for GcWorkerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

/// GC Worker
///
/// 兜底回收：调用方忘记 release 且 surface 一直未销毁时，句柄在过期后被释放
pub struct GcWorker {
    config: GcWorkerConfig,
    playback: Arc<dyn PlaybackSessionPort>,
    shutdown: CancellationToken,
}

impl GcWorker {
    pub fn new(config: GcWorkerConfig, playback: Arc<dyn PlaybackSessionPort>) -> Self {
        Self {
            config,
            playback,
            shutdown: CancellationToken::new(),
        }
    }

    /// 用于停止 Worker 的令牌
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// 启动 Worker
    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            "GcWorker started"
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        // 第一次 tick 立即返回，跳过
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let released = self.playback.sweep_expired();
                    if released > 0 {
                        tracing::info!(released = released, "GC released expired playback handles");
                    } else {
                        tracing::trace!("GC sweep found nothing to release");
                    }
                }
            }
        }

        tracing::info!("GcWorker stopped");
    }
}

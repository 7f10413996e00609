//! Fake Generation Client - 用于测试和本地演示的生成客户端
//!
//! 不实际调用生成服务，按预设返回应答并记录调用次数

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::application::ports::{GenerationBackendPort, UpstreamReply};
use crate::domain::generation::{BeatReference, GenerationError, GenerationRequest, InlineAudio};

/// 生成单声道 16-bit 静音 WAV
pub fn silent_wav(sample_rate: u32, frames: u32) -> Vec<u8> {
    let channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let block_align = channels * bits_per_sample / 8;
    let byte_rate = sample_rate * block_align as u32;
    let data_len = frames * block_align as u32;

    let mut wav = Vec::with_capacity(44 + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&bits_per_sample.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.resize(44 + data_len as usize, 0);
    wav
}

/// 44 字节的 WAV 头（无采样数据）
pub fn wav_header_stub() -> Vec<u8> {
    silent_wav(44100, 0)
}

/// Fake Generation Client
pub struct FakeGenerationClient {
    submit_result: Result<UpstreamReply, GenerationError>,
    fetch_result: Result<InlineAudio, GenerationError>,
    delay: Duration,
    fetch_delay: Duration,
    submit_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    fetched_paths: Mutex<Vec<String>>,
}

impl FakeGenerationClient {
    fn with_submit_result(submit_result: Result<UpstreamReply, GenerationError>) -> Self {
        Self {
            submit_result,
            fetch_result: Err(GenerationError::UpstreamFetchFailed {
                url: String::new(),
                status: Some(404),
                message: "no reference configured".to_string(),
            }),
            delay: Duration::ZERO,
            fetch_delay: Duration::ZERO,
            submit_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            fetched_paths: Mutex::new(Vec::new()),
        }
    }

    /// 首次请求直接返回音频
    pub fn inline(audio: InlineAudio) -> Self {
        Self::with_submit_result(Ok(UpstreamReply::Inline(audio)))
    }

    /// 首次请求返回带 beat_path 的文档，二次拉取返回 `audio`
    ///
    /// 文档中没有字符串 beat_path 时退化为 Document 应答
    pub fn reference(document: Value, audio: InlineAudio) -> Self {
        let reply = match document.get("beat_path").and_then(Value::as_str) {
            Some(path) => UpstreamReply::Reference {
                reference: BeatReference::parse(path),
                document: document.clone(),
            },
            None => UpstreamReply::Document(document),
        };
        let mut client = Self::with_submit_result(Ok(reply));
        client.fetch_result = Ok(audio);
        client
    }

    /// 首次请求返回不含 beat_path 的文档
    pub fn document(document: Value) -> Self {
        Self::with_submit_result(Ok(UpstreamReply::Document(document)))
    }

    /// 首次请求失败
    pub fn failing(error: GenerationError) -> Self {
        Self::with_submit_result(Err(error))
    }

    /// 本地演示：返回一秒静音 WAV 的引用
    pub fn demo() -> Self {
        Self::reference(
            json!({
                "status": "success",
                "message": "Beat generated successfully",
                "beat_path": "/static/beats/demo.wav"
            }),
            InlineAudio::new(silent_wav(22050, 22050), "audio/wav"),
        )
    }

    pub fn with_fetch_result(mut self, result: Result<InlineAudio, GenerationError>) -> Self {
        self.fetch_result = result;
        self
    }

    /// 模拟推理延迟
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// 模拟引用文件下载延迟
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn fetched_paths(&self) -> Vec<String> {
        self.fetched_paths
            .lock()
            .map(|paths| paths.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl GenerationBackendPort for FakeGenerationClient {
    async fn submit(&self, request: &GenerationRequest) -> Result<UpstreamReply, GenerationError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            prompt_len = request.prompt().len(),
            target_kind = %request.target(),
            "FakeGenerationClient: returning scripted reply"
        );

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.submit_result.clone()
    }

    async fn fetch_reference(
        &self,
        reference: &BeatReference,
    ) -> Result<InlineAudio, GenerationError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut paths) = self.fetched_paths.lock() {
            paths.push(reference.clean_path().to_string());
        }

        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }
        self.fetch_result.clone()
    }
}

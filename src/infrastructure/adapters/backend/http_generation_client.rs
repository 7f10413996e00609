//! HTTP Generation Client - 调用外部生成服务
//!
//! 实现 GenerationBackendPort trait，通过 HTTP 调用生成后端
//!
//! 外部生成 API:
//! POST {base_url}/generate/beat
//! Request: {"prompt": "...", "attachments"?: [...], "settings"?: {...}}  (JSON)
//! POST {base_url}/generate/lyrics
//! Response: {"status": "success", "message": "...", "line": "..."}
//! Response: {"status": "success", "beat_path": "/static/beats/x.wav"}  或直接返回音频
//! GET {base_url}/{beat_path}  ->  音频二进制

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::application::ports::{GenerationBackendPort, UpstreamReply};
use crate::domain::generation::media_type;
use crate::domain::generation::{
    BeatReference, GenerationError, GenerationRequest, InlineAudio, UpstreamStage,
};

/// HTTP 生成客户端配置
#[derive(Debug, Clone)]
pub struct HttpGenerationClientConfig {
    /// 生成服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpGenerationClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:10000".to_string(),
            timeout_secs: 120,
        }
    }
}

impl HttpGenerationClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 生成客户端
pub struct HttpGenerationClient {
    client: Client,
    config: HttpGenerationClientConfig,
}

impl HttpGenerationClient {
    /// 创建新的 HTTP 生成客户端
    pub fn new(config: HttpGenerationClientConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::UpstreamRequestFailed {
                status: None,
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn generate_url(&self, request: &GenerationRequest) -> String {
        format!("{}{}", self.base_url(), request.target().path())
    }

    fn health_url(&self) -> String {
        format!("{}/", self.base_url())
    }
}

/// 构造请求体：提示词字段 + 可选的附件元数据和设置
fn build_request_body(request: &GenerationRequest) -> Value {
    let mut body = Map::new();
    if let Some(field) = request.target().prompt_field() {
        body.insert(field.to_string(), Value::String(request.prompt().to_string()));
    }

    if !request.attachments().is_empty() {
        let attachments: Vec<Value> = request
            .attachments()
            .iter()
            .filter_map(|a| serde_json::to_value(a.metadata()).ok())
            .collect();
        body.insert("attachments".to_string(), Value::Array(attachments));
    }

    if !request.settings().is_empty() {
        body.insert(
            "settings".to_string(),
            request.settings().clone().into_value(),
        );
    }

    Value::Object(body)
}

/// 解释首次响应
///
/// - audio/* 或可嗅探出的音频 -> Inline
/// - JSON 含非空字符串 beat_path -> Reference
/// - 其他 JSON -> Document
fn classify_reply(
    content_type: Option<&str>,
    body: &[u8],
) -> Result<UpstreamReply, GenerationError> {
    if let Some(ct) = content_type.filter(|ct| media_type::is_audio(ct)) {
        return Ok(UpstreamReply::Inline(InlineAudio::new(
            body.to_vec(),
            media_type::essence(ct),
        )));
    }

    let declared_json = content_type.map(media_type::is_json).unwrap_or(false);
    if !declared_json {
        if let Some(mime) = media_type::sniff_audio(body) {
            return Ok(UpstreamReply::Inline(InlineAudio::new(body.to_vec(), mime)));
        }
    }

    let document: Value = serde_json::from_slice(body).map_err(|e| {
        GenerationError::InvalidResponse(format!("Response is neither audio nor JSON: {}", e))
    })?;

    let beat_path = document
        .get("beat_path")
        .and_then(Value::as_str)
        .filter(|path| !path.is_empty())
        .map(BeatReference::parse);

    Ok(match beat_path {
        Some(reference) => UpstreamReply::Reference {
            reference,
            document,
        },
        None => UpstreamReply::Document(document),
    })
}

fn content_type_of(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[async_trait]
impl GenerationBackendPort for HttpGenerationClient {
    async fn submit(&self, request: &GenerationRequest) -> Result<UpstreamReply, GenerationError> {
        let url = self.generate_url(request);
        let body = build_request_body(request);

        tracing::debug!(
            url = %url,
            prompt_len = request.prompt().len(),
            attachments = request.attachments().len(),
            "Sending generation request"
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::UpstreamTimeout {
                        stage: UpstreamStage::Request,
                    }
                } else if e.is_connect() {
                    GenerationError::UpstreamRequestFailed {
                        status: None,
                        message: format!("Cannot connect to generation service: {}", e),
                    }
                } else {
                    GenerationError::UpstreamRequestFailed {
                        status: None,
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        tracing::debug!(url = %url, status = %status.as_u16(), "Generation response received");

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::UpstreamRequestFailed {
                status: Some(status.as_u16()),
                message: format!("HTTP {}: {}", status, error_text),
            });
        }

        let content_type = content_type_of(&response);
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::UpstreamTimeout {
                    stage: UpstreamStage::Request,
                }
            } else {
                GenerationError::InvalidResponse(format!("Failed to read response: {}", e))
            }
        })?;

        classify_reply(content_type.as_deref(), &body)
    }

    async fn fetch_reference(
        &self,
        reference: &BeatReference,
    ) -> Result<InlineAudio, GenerationError> {
        let url = reference.resolve_against(self.base_url());
        tracing::debug!(url = %url, "Fetching referenced audio");

        let fetch_failed =
            |status: Option<u16>, message: String| GenerationError::UpstreamFetchFailed {
                url: url.clone(),
                status,
                message,
            };

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::UpstreamTimeout {
                    stage: UpstreamStage::Fetch,
                }
            } else {
                fetch_failed(None, e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_failed(
                Some(status.as_u16()),
                format!("Failed to fetch audio file: {}", status),
            ));
        }

        let content_type = content_type_of(&response);
        let payload = response
            .bytes()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::UpstreamTimeout {
                        stage: UpstreamStage::Fetch,
                    }
                } else {
                    fetch_failed(Some(status.as_u16()), format!("Failed to read audio: {}", e))
                }
            })?
            .to_vec();

        let mime_type = media_type::resolve_mime(content_type.as_deref(), &payload);

        tracing::info!(
            url = %url,
            mime_type = %mime_type,
            size = payload.len(),
            "Referenced audio received"
        );

        Ok(InlineAudio::new(payload, mime_type))
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

//! Generation Context - Errors

use thiserror::Error;

use crate::domain::transfer_codec::CodecError;

/// 面向用户的统一失败提示，具体错误类型只用于日志和诊断
pub const USER_FACING_FAILURE: &str = "generation failed, try again";

/// 上游调用阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamStage {
    /// 首次生成请求
    Request,
    /// 引用解析（二次拉取）
    Fetch,
}

impl std::fmt::Display for UpstreamStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamStage::Request => write!(f, "request"),
            UpstreamStage::Fetch => write!(f, "fetch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// 首次请求失败；status 为 None 表示传输层错误（连接失败等）
    #[error("Upstream request failed (status {status:?}): {message}")]
    UpstreamRequestFailed { status: Option<u16>, message: String },

    #[error("Failed to fetch {url} (status {status:?}): {message}")]
    UpstreamFetchFailed {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Upstream {stage} timed out")]
    UpstreamTimeout { stage: UpstreamStage },

    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),
}

/// 错误类别（诊断用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    InvalidRequest,
    UpstreamRequestFailed,
    UpstreamFetchFailed,
    UpstreamTimeout,
    InvalidResponse,
    MalformedEncoding,
}

impl GenerationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::UpstreamRequestFailed => "upstream_request_failed",
            Self::UpstreamFetchFailed => "upstream_fetch_failed",
            Self::UpstreamTimeout => "upstream_timeout",
            Self::InvalidResponse => "invalid_response",
            Self::MalformedEncoding => "malformed_encoding",
        }
    }
}

impl std::fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GenerationError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn kind(&self) -> GenerationErrorKind {
        match self {
            Self::InvalidRequest(_) => GenerationErrorKind::InvalidRequest,
            Self::UpstreamRequestFailed { .. } => GenerationErrorKind::UpstreamRequestFailed,
            Self::UpstreamFetchFailed { .. } => GenerationErrorKind::UpstreamFetchFailed,
            Self::UpstreamTimeout { .. } => GenerationErrorKind::UpstreamTimeout,
            Self::InvalidResponse(_) => GenerationErrorKind::InvalidResponse,
            Self::MalformedEncoding(_) => GenerationErrorKind::MalformedEncoding,
        }
    }

    pub fn user_message(&self) -> &'static str {
        USER_FACING_FAILURE
    }
}

impl From<CodecError> for GenerationError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::MalformedEncoding(msg) => Self::MalformedEncoding(msg),
        }
    }
}

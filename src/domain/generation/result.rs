//! Generation Context - 生成结果

use serde_json::Value;

/// 已解析的音频负载
#[derive(Debug, Clone, PartialEq)]
pub struct InlineAudio {
    pub payload: Vec<u8>,
    pub mime_type: String,
    /// 通过引用解析得到时，保留首次响应的 JSON 文档
    pub source: Option<Value>,
}

impl InlineAudio {
    pub fn new(payload: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            payload,
            mime_type: mime_type.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: Value) -> Self {
        self.source = Some(source);
        self
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// 生成结果
///
/// 引用（beat_path）在网关内部解析完毕，这里不存在 Reference 变体，
/// 调用方永远拿不到未解析的引用。
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult {
    /// 音频负载
    Inline(InlineAudio),
    /// 首次响应中没有 beat_path 时，JSON 文档本身即结果
    Document(Value),
}

impl GenerationResult {
    pub fn into_inline(self) -> Option<InlineAudio> {
        match self {
            Self::Inline(audio) => Some(audio),
            Self::Document(_) => None,
        }
    }
}

/// 指向生成结果的引用路径
///
/// 不变量: clean_path 不含前导 `/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeatReference {
    raw: String,
    clean: String,
}

impl BeatReference {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let clean = raw.trim_start_matches('/').to_string();
        Self { raw, clean }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn clean_path(&self) -> &str {
        &self.clean
    }

    /// 拼接到后端 base URL 之后
    pub fn resolve_against(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.clean)
    }
}

impl std::fmt::Display for BeatReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

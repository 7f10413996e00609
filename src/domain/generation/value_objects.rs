//! Generation Context - Value Objects

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::GenerationError;

/// 附件角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentRole {
    /// 人声
    Vocal,
    /// 伴奏
    Beat,
}

impl AttachmentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vocal => "vocal",
            Self::Beat => "beat",
        }
    }
}

impl std::fmt::Display for AttachmentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AttachmentRole {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vocal" => Ok(Self::Vocal),
            "beat" | "beats" => Ok(Self::Beat),
            _ => Err(GenerationError::invalid_request(format!(
                "unknown attachment role: {}",
                s
            ))),
        }
    }
}

/// 用户附带的音频文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub role: AttachmentRole,
    pub payload: Vec<u8>,
    pub mime_type: String,
    pub file_name: Option<String>,
}

impl Attachment {
    pub fn new(role: AttachmentRole, payload: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            role,
            payload,
            mime_type: mime_type.into(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// 随生成请求一起发送的元数据（不含字节内容）
    pub fn metadata(&self) -> AttachmentMeta {
        AttachmentMeta {
            role: self.role,
            mime_type: self.mime_type.clone(),
            file_name: self.file_name.clone(),
            size: self.payload.len(),
        }
    }
}

/// 附件元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentMeta {
    pub role: AttachmentRole,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub size: usize,
}

/// 应用设置 - 不透明的 key/value 对象
///
/// 核心只负责透传，不解释任何字段（drumStyle、systemPrompt、temperature ……）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationSettings(Map<String, Value>);

impl GenerationSettings {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// 从任意 JSON 值构造，非对象返回 None
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// 浅合并：`self` 中的键覆盖 `defaults`
    pub fn merged_over(self, defaults: &GenerationSettings) -> Self {
        let mut merged = defaults.0.clone();
        merged.extend(self.0);
        Self(merged)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// 生成目标 - 对应后端的不同生成接口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationTarget {
    /// POST /generate/beat, body: {"prompt": ...}
    #[default]
    Beat,
    /// POST /generate/speech, body: {"text": ...}，直接返回 audio/wav
    Speech,
    /// POST /generate/lyrics，无需提示词，返回 {"status", "message", "line"}
    Lyrics,
}

impl GenerationTarget {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Beat => "/generate/beat",
            Self::Speech => "/generate/speech",
            Self::Lyrics => "/generate/lyrics",
        }
    }

    /// 请求体中承载提示词的字段名，None 表示该接口不接收提示词
    pub fn prompt_field(&self) -> Option<&'static str> {
        match self {
            Self::Beat => Some("prompt"),
            Self::Speech => Some("text"),
            Self::Lyrics => None,
        }
    }
}

impl std::fmt::Display for GenerationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Beat => write!(f, "beat"),
            Self::Speech => write!(f, "speech"),
            Self::Lyrics => write!(f, "lyrics"),
        }
    }
}

/// 生成请求
///
/// 不变量:
/// - 创建后不可变
/// - 目标接口接收提示词时，发往网络前 prompt 必须非空（去除空白后）
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    prompt: String,
    attachments: Vec<Attachment>,
    settings: GenerationSettings,
    target: GenerationTarget,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            attachments: Vec::new(),
            settings: GenerationSettings::default(),
            target: GenerationTarget::default(),
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_target(mut self, target: GenerationTarget) -> Self {
        self.target = target;
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn target(&self) -> GenerationTarget {
        self.target
    }

    /// 校验请求，失败时不应发起任何网络调用
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.target.prompt_field().is_some() && self.prompt.trim().is_empty() {
            return Err(GenerationError::invalid_request("prompt cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_rejects_blank_prompts() {
        for prompt in ["", " ", "\t\n", "   \r\n  "] {
            let err = GenerationRequest::new(prompt).validate().unwrap_err();
            assert!(matches!(err, GenerationError::InvalidRequest(_)));
        }
        assert!(GenerationRequest::new("lofi beat 90bpm").validate().is_ok());
    }

    #[test]
    fn test_settings_merge_prefers_request_keys() {
        let defaults = GenerationSettings::from_value(json!({
            "drumStyle": "pop",
            "systemPrompt": "Generate high-quality audio."
        }))
        .unwrap();
        let request =
            GenerationSettings::from_value(json!({ "drumStyle": "jazz", "temperature": 0.9 }))
                .unwrap();

        let merged = request.merged_over(&defaults).into_value();
        assert_eq!(
            merged,
            json!({
                "drumStyle": "jazz",
                "systemPrompt": "Generate high-quality audio.",
                "temperature": 0.9
            })
        );
    }

    #[test]
    fn test_settings_from_non_object() {
        assert!(GenerationSettings::from_value(json!([1, 2])).is_none());
        assert!(GenerationSettings::from_value(json!("pop")).is_none());
    }

    #[test]
    fn test_attachment_metadata_excludes_payload() {
        let attachment = Attachment::new(AttachmentRole::Vocal, vec![1, 2, 3], "audio/wav")
            .with_file_name("take1.wav");
        let meta = serde_json::to_value(attachment.metadata()).unwrap();
        assert_eq!(
            meta,
            json!({
                "role": "vocal",
                "mime_type": "audio/wav",
                "file_name": "take1.wav",
                "size": 3
            })
        );
    }

    #[test]
    fn test_target_paths() {
        assert_eq!(GenerationTarget::Beat.path(), "/generate/beat");
        assert_eq!(GenerationTarget::Beat.prompt_field(), Some("prompt"));
        assert_eq!(GenerationTarget::Speech.path(), "/generate/speech");
        assert_eq!(GenerationTarget::Speech.prompt_field(), Some("text"));
        assert_eq!(GenerationTarget::Lyrics.path(), "/generate/lyrics");
        assert_eq!(GenerationTarget::Lyrics.prompt_field(), None);
    }

    #[test]
    fn test_lyrics_needs_no_prompt() {
        let request = GenerationRequest::new("").with_target(GenerationTarget::Lyrics);
        assert!(request.validate().is_ok());

        let request = GenerationRequest::new(" ").with_target(GenerationTarget::Speech);
        assert!(request.validate().is_err());

        let target: GenerationTarget = serde_json::from_value(json!("lyrics")).unwrap();
        assert_eq!(target, GenerationTarget::Lyrics);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Vocal".parse::<AttachmentRole>().unwrap(), AttachmentRole::Vocal);
        assert_eq!("beats".parse::<AttachmentRole>().unwrap(), AttachmentRole::Beat);
        assert!("drums".parse::<AttachmentRole>().is_err());
    }
}

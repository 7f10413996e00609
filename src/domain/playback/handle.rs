//! Playback Context - 播放句柄

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::PlaybackError;

/// 句柄唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleId(Uuid);

impl HandleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for HandleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// UI surface 标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(String);

impl SurfaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 本地可撤销引用，等价于浏览器的 `blob:` URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn generate() -> Self {
        Self(format!("blob:vocaliq/{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 句柄状态
///
/// Created → Active → Released，Released 为终态。
/// Active → Active（重播）与 Created → Released（从未播放）均合法。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleState {
    Created,
    Active,
    Released,
}

impl HandleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Active => "active",
            Self::Released => "released",
        }
    }

    pub fn is_released(&self) -> bool {
        matches!(self, Self::Released)
    }

    /// 绑定到播放器
    pub fn activate(self, id: HandleId) -> Result<Self, PlaybackError> {
        match self {
            Self::Created | Self::Active => Ok(Self::Active),
            Self::Released => Err(PlaybackError::HandleReleased(id)),
        }
    }
}

/// 播放句柄
///
/// 持有一个对已解析音频的可撤销本地引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackHandle {
    pub id: HandleId,
    pub surface_id: SurfaceId,
    pub url: ObjectUrl,
    pub mime_type: String,
    pub size: usize,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PlaybackHandle {
    pub fn new(
        surface_id: SurfaceId,
        url: ObjectUrl,
        mime_type: impl Into<String>,
        size: usize,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: HandleId::new(),
            surface_id,
            url,
            mime_type: mime_type.into(),
            size,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

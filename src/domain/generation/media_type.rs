//! 媒体类型判定
//!
//! 首次响应可能直接是音频，也可能是 JSON。优先看 Content-Type，
//! 缺失或为 application/octet-stream 时按文件头嗅探。

pub const OCTET_STREAM: &str = "application/octet-stream";

/// 去掉参数部分并转小写，如 `Audio/WAV; codecs=1` -> `audio/wav`
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

pub fn is_audio(content_type: &str) -> bool {
    essence(content_type).starts_with("audio/")
}

pub fn is_json(content_type: &str) -> bool {
    let essence = essence(content_type);
    essence == "application/json" || essence.ends_with("+json")
}

/// 根据文件头识别常见音频格式
pub fn sniff_audio(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE" {
        return Some("audio/wav");
    }
    if bytes.starts_with(b"OggS") {
        return Some("audio/ogg");
    }
    if bytes.starts_with(b"fLaC") {
        return Some("audio/flac");
    }
    if bytes.starts_with(b"ID3") {
        return Some("audio/mpeg");
    }
    // MPEG 帧同步字
    if bytes.len() >= 2 && bytes[0] == 0xFF && (bytes[1] & 0xE0) == 0xE0 {
        return Some("audio/mpeg");
    }
    None
}

/// 二次拉取结果的 mime：响应头优先，其次嗅探，最后回退 octet-stream
pub fn resolve_mime(content_type: Option<&str>, bytes: &[u8]) -> String {
    match content_type.map(essence) {
        Some(ct) if !ct.is_empty() && ct != OCTET_STREAM => ct,
        _ => sniff_audio(bytes).unwrap_or(OCTET_STREAM).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_essence() {
        assert_eq!(essence("Audio/WAV; codecs=1"), "audio/wav");
        assert_eq!(essence("application/json"), "application/json");
    }

    #[test]
    fn test_content_type_classes() {
        assert!(is_audio("audio/mpeg"));
        assert!(!is_audio("application/json"));
        assert!(is_json("application/json; charset=utf-8"));
        assert!(is_json("application/problem+json"));
    }

    #[test]
    fn test_sniff() {
        assert_eq!(sniff_audio(b"RIFF\0\0\0\0WAVEfmt "), Some("audio/wav"));
        assert_eq!(sniff_audio(b"ID3\x04"), Some("audio/mpeg"));
        assert_eq!(sniff_audio(&[0xFF, 0xFB, 0x90]), Some("audio/mpeg"));
        assert_eq!(sniff_audio(b"OggS\0"), Some("audio/ogg"));
        assert_eq!(sniff_audio(b"{\"beat_path\":1}"), None);
        assert_eq!(sniff_audio(b""), None);
    }

    #[test]
    fn test_resolve_mime() {
        assert_eq!(resolve_mime(Some("audio/wav"), b""), "audio/wav");
        assert_eq!(resolve_mime(Some(OCTET_STREAM), b"RIFF\0\0\0\0WAVE"), "audio/wav");
        assert_eq!(resolve_mime(None, b"xyz"), OCTET_STREAM);
    }
}

//! Transfer Codec - 二进制负载的文本安全编码
//!
//! 使用标准 base64 字母表（带填充），用于 JSON 等只能传输文本的边界。
//! 纯函数，无副作用。

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

/// 编解码错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),
}

/// 将任意字节编码为 base64 文本
///
/// 输出长度只取决于输入长度：`4 * ceil(n / 3)`
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// 解码 base64 文本，`encode` 的精确逆运算
///
/// 字母表之外的字符或非法填充返回 `MalformedEncoding`
pub fn decode(text: &str) -> Result<Vec<u8>, CodecError> {
    STANDARD
        .decode(text)
        .map_err(|e| CodecError::MalformedEncoding(e.to_string()))
}

/// 编码为 data URL：`data:<mime>;base64,<payload>`
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, encode(bytes))
}

/// 解码 data URL 或裸 base64 文本
///
/// 浏览器 `FileReader.readAsDataURL` 产出带前缀的文本，客户端有时只发送逗号后的部分，
/// 两种形式都接受。返回 (mime 类型, 字节)，裸文本时 mime 为 None。
pub fn decode_data_url_or_raw(text: &str) -> Result<(Option<String>, Vec<u8>), CodecError> {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("data:") else {
        return Ok((None, decode(text)?));
    };

    let (header, payload) = rest.split_once(',').ok_or_else(|| {
        CodecError::MalformedEncoding("data URL without ',' separator".to_string())
    })?;

    let mime = header.strip_suffix(";base64").ok_or_else(|| {
        CodecError::MalformedEncoding("data URL is not base64 encoded".to_string())
    })?;

    let mime = (!mime.is_empty()).then(|| mime.to_string());
    Ok((mime, decode(payload)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let samples: [&[u8]; 5] = [
            b"",
            b"f",
            b"RIFF\x24\x00\x00\x00WAVE",
            &[0u8, 255, 128, 7, 64],
            &[0xFF; 31],
        ];
        for bytes in samples {
            assert_eq!(decode(&encode(bytes)).unwrap(), bytes);
        }
    }

    #[test]
    fn test_round_trip_all_byte_values() {
        let bytes: Vec<u8> = (0..=255u8).collect();
        assert_eq!(decode(&encode(&bytes)).unwrap(), bytes);
    }

    #[test]
    fn test_encoded_length_is_deterministic() {
        for n in 0..20usize {
            let bytes = vec![0xAB; n];
            assert_eq!(encode(&bytes).len(), 4 * n.div_ceil(3));
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(encode(b""), "");
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_rejects_foreign_characters() {
        assert!(matches!(
            decode("ab$d"),
            Err(CodecError::MalformedEncoding(_))
        ));
        assert!(matches!(
            decode("aGVsbG8*"),
            Err(CodecError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_decode_rejects_invalid_padding() {
        assert!(decode("aGVsbG8").is_err());
        assert!(decode("aGVsbA=").is_err());
        assert!(decode("a===").is_err());
    }

    #[test]
    fn test_data_url() {
        let url = encode_data_url("audio/wav", b"RIFF");
        assert_eq!(url, "data:audio/wav;base64,UklGRg==");

        let (mime, bytes) = decode_data_url_or_raw(&url).unwrap();
        assert_eq!(mime.as_deref(), Some("audio/wav"));
        assert_eq!(bytes, b"RIFF");
    }

    #[test]
    fn test_raw_base64_without_prefix() {
        let (mime, bytes) = decode_data_url_or_raw("UklGRg==").unwrap();
        assert!(mime.is_none());
        assert_eq!(bytes, b"RIFF");
    }

    #[test]
    fn test_data_url_must_be_base64() {
        assert!(decode_data_url_or_raw("data:text/plain,hello").is_err());
        assert!(decode_data_url_or_raw("data:audio/wav;base64").is_err());
    }
}

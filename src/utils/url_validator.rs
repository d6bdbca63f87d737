//! 目标地址校验
//!
//! 只接受带主机名的 http / https 绝对 URL。先交给 `url` 解析，
//! 再按 scheme 和 host 判定，错误信息直接作为 400 响应返回给调用方。

use std::fmt;

use url::Url;

use crate::errors::ShrinkError;

/// 会在浏览器里执行或读取本地内容的 scheme
const BLOCKED_SCHEMES: &[&str] = &["javascript", "data", "file", "vbscript", "about", "blob"];

const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

#[derive(Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    Empty,
    /// 无法解析为绝对 URL
    Malformed(String),
    BlockedScheme(String),
    UnsupportedScheme(String),
    MissingHost,
}

impl fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("original_url is required"),
            Self::Malformed(reason) => write!(f, "Invalid URL format: {}", reason),
            Self::BlockedScheme(scheme) => write!(f, "URL scheme '{}:' is not allowed", scheme),
            Self::UnsupportedScheme(scheme) => write!(
                f,
                "Unsupported URL scheme '{}:'. Only http:// and https:// are accepted",
                scheme
            ),
            Self::MissingHost => f.write_str("Invalid URL format: missing host"),
        }
    }
}

impl std::error::Error for UrlValidationError {}

impl From<UrlValidationError> for ShrinkError {
    fn from(err: UrlValidationError) -> Self {
        ShrinkError::validation(err.to_string())
    }
}

/// 校验目标 URL，成功时返回去掉首尾空白的原始字符串（不做规范化）
pub fn validate_url(raw: &str) -> Result<&str, UrlValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlValidationError::Empty);
    }

    let parsed = Url::parse(trimmed).map_err(|e| UrlValidationError::Malformed(e.to_string()))?;

    // Url::scheme() 总是小写
    let scheme = parsed.scheme();
    if BLOCKED_SCHEMES.contains(&scheme) {
        return Err(UrlValidationError::BlockedScheme(scheme.to_string()));
    }
    if !ALLOWED_SCHEMES.contains(&scheme) {
        return Err(UrlValidationError::UnsupportedScheme(scheme.to_string()));
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(trimmed),
        _ => Err(UrlValidationError::MissingHost),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert_eq!(
            validate_url("https://example.com/path?query=1"),
            Ok("https://example.com/path?query=1")
        );
        assert_eq!(
            validate_url("  http://localhost:8080 "),
            Ok("http://localhost:8080")
        );
        assert_eq!(validate_url("HTTPS://EXAMPLE.COM"), Ok("HTTPS://EXAMPLE.COM"));
    }

    #[test]
    fn test_empty() {
        assert_eq!(validate_url(""), Err(UrlValidationError::Empty));
        assert_eq!(validate_url("   "), Err(UrlValidationError::Empty));
    }

    #[test]
    fn test_scheme_rules() {
        assert_eq!(
            validate_url("javascript:alert(1)"),
            Err(UrlValidationError::BlockedScheme("javascript".to_string()))
        );
        assert_eq!(
            validate_url("DATA:text/html,hi"),
            Err(UrlValidationError::BlockedScheme("data".to_string()))
        );
        assert_eq!(
            validate_url("ftp://example.com"),
            Err(UrlValidationError::UnsupportedScheme("ftp".to_string()))
        );
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            validate_url("not a url"),
            Err(UrlValidationError::Malformed(_))
        ));
        assert!(matches!(
            validate_url("http://exa mple.com"),
            Err(UrlValidationError::Malformed(_))
        ));
    }

    #[test]
    fn test_converts_to_validation_error() {
        let err: ShrinkError = UrlValidationError::MissingHost.into();
        assert_eq!(
            err,
            ShrinkError::validation("Invalid URL format: missing host")
        );
    }
}

//! User-Agent parsing
//!
//! 使用 woothee 解析浏览器 / 操作系统 / 设备类型，未知字段留空

use woothee::parser::Parser;

use crate::storage::ClientInfo;

const UNKNOWN: &str = "UNKNOWN";

fn known(value: &str) -> Option<String> {
    if value.is_empty() || value == UNKNOWN {
        None
    } else {
        Some(value.to_string())
    }
}

/// 解析 User-Agent 字符串
pub fn parse_user_agent(ua: &str) -> ClientInfo {
    if ua.trim().is_empty() {
        return ClientInfo::default();
    }

    let Some(result) = Parser::new().parse(ua) else {
        return ClientInfo::default();
    };

    ClientInfo {
        browser: known(result.name),
        browser_version: known(&result.version),
        os: known(result.os),
        os_version: known(&result.os_version),
        device_type: known(result.category),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_desktop_chrome() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
        let info = parse_user_agent(ua);

        assert_eq!(info.browser.as_deref(), Some("Chrome"));
        assert!(info.browser_version.is_some());
        assert_eq!(info.os.as_deref(), Some("Windows 10"));
        assert_eq!(info.device_type.as_deref(), Some("pc"));
    }

    #[test]
    fn test_parse_iphone_safari() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
        let info = parse_user_agent(ua);

        assert_eq!(info.browser.as_deref(), Some("Safari"));
        assert_eq!(info.os.as_deref(), Some("iPhone"));
        assert_eq!(info.device_type.as_deref(), Some("smartphone"));
    }

    #[test]
    fn test_parse_crawler() {
        let ua = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";
        let info = parse_user_agent(ua);

        assert_eq!(info.browser.as_deref(), Some("Googlebot"));
        assert_eq!(info.device_type.as_deref(), Some("crawler"));
    }

    #[test]
    fn test_empty_user_agent() {
        assert_eq!(parse_user_agent(""), ClientInfo::default());
    }
}

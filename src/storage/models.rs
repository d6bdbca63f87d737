use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 一条短链接记录
///
/// `clicks` 只在按需加载时填充；加载时其长度恒等于 `total_clicks`。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UrlRecord {
    pub id: i64,
    pub original_url: String,
    pub short_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_alias: Option<String>,
    pub total_clicks: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
    #[serde(default)]
    pub clicks: Vec<ClickEvent>,
}

/// 待插入的短链接
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrlRecord {
    pub original_url: String,
    pub short_url: String,
    pub custom_alias: Option<String>,
}

/// Geographic facts attached to a click
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// 按字符数截断，保证不超过列宽
fn clamp_chars(value: &mut Option<String>, max_chars: usize) {
    let Some(text) = value else {
        return;
    };
    let cut = text.char_indices().nth(max_chars).map(|(idx, _)| idx);
    if let Some(cut) = cut {
        text.truncate(cut);
    }
}

/// `clicks` 表中位置文本列的宽度
pub const LOCATION_TEXT_MAX_CHARS: usize = 100;
/// `clicks` 表中 browser / os 等列的宽度
pub const CLIENT_TEXT_MAX_CHARS: usize = 64;
pub const DEVICE_TYPE_MAX_CHARS: usize = 32;

impl Location {
    pub fn is_empty(&self) -> bool {
        self == &Location::default()
    }

    /// 截断 country / city / region 到列宽
    pub fn clamp_to_columns(&mut self) {
        clamp_chars(&mut self.country, LOCATION_TEXT_MAX_CHARS);
        clamp_chars(&mut self.city, LOCATION_TEXT_MAX_CHARS);
        clamp_chars(&mut self.region, LOCATION_TEXT_MAX_CHARS);
    }
}

/// Browser / OS / device facts parsed from the User-Agent header
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
}

impl ClientInfo {
    pub fn clamp_to_columns(&mut self) {
        clamp_chars(&mut self.browser, CLIENT_TEXT_MAX_CHARS);
        clamp_chars(&mut self.browser_version, CLIENT_TEXT_MAX_CHARS);
        clamp_chars(&mut self.os, CLIENT_TEXT_MAX_CHARS);
        clamp_chars(&mut self.os_version, CLIENT_TEXT_MAX_CHARS);
        clamp_chars(&mut self.device_type, DEVICE_TYPE_MAX_CHARS);
    }
}

/// 待追加的点击事件（id 由存储分配）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewClickEvent {
    pub timestamp: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub location: Location,
    pub client: ClientInfo,
}

/// 已持久化的点击事件
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClickEvent {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(flatten)]
    pub location: Location,
    #[serde(flatten)]
    pub client: ClientInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
}

/// 存储后端信息（健康检查用）
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StorageConfig {
    pub storage_type: String,
}

use crate::storage::models::{ClickEvent, ClientInfo, Location, NewClickEvent, UrlRecord};
use migration::entities::{click, url_record};

/// 将 Sea-ORM Model 转换为 UrlRecord（不含点击序列）
pub fn record_from_model(model: url_record::Model) -> UrlRecord {
    UrlRecord {
        id: model.id,
        original_url: model.original_url,
        short_url: model.short_url,
        custom_alias: model.custom_alias,
        total_clicks: model.total_clicks.max(0) as u64,
        created_at: model.created_at,
        updated_at: model.updated_at,
        is_active: model.is_active,
        clicks: Vec::new(),
    }
}

/// 将点击行转换为 ClickEvent
pub fn click_from_model(model: click::Model) -> ClickEvent {
    ClickEvent {
        id: model.id,
        timestamp: model.timestamp,
        ip: model.ip,
        location: Location {
            country: model.country,
            city: model.city,
            region: model.region,
            latitude: model.latitude,
            longitude: model.longitude,
        },
        client: ClientInfo {
            browser: model.browser,
            browser_version: model.browser_version,
            os: model.os,
            os_version: model.os_version,
            device_type: model.device_type,
        },
        user_agent: model.user_agent,
        referrer: model.referrer,
    }
}

/// 将待追加的点击转换为 ActiveModel
pub fn click_to_active_model(url_id: i64, click: &NewClickEvent) -> click::ActiveModel {
    use sea_orm::ActiveValue::*;

    click::ActiveModel {
        id: NotSet,
        url_id: Set(url_id),
        timestamp: Set(click.timestamp),
        ip: Set(click.ip.clone()),
        user_agent: Set(click.user_agent.clone()),
        referrer: Set(click.referrer.clone()),
        country: Set(click.location.country.clone()),
        city: Set(click.location.city.clone()),
        region: Set(click.location.region.clone()),
        latitude: Set(click.location.latitude),
        longitude: Set(click.location.longitude),
        browser: Set(click.client.browser.clone()),
        browser_version: Set(click.client.browser_version.clone()),
        os: Set(click.client.os.clone()),
        os_version: Set(click.client.os_version.clone()),
        device_type: Set(click.client.device_type.clone()),
    }
}

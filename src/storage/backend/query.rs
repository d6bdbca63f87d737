//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations.

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use tracing::error;

use super::SeaOrmStorage;
use super::converters::{click_from_model, record_from_model};
use crate::errors::{Result, ShrinkError};
use crate::storage::models::UrlRecord;

use migration::entities::{click, url_record};

impl SeaOrmStorage {
    /// 按短码查找记录
    ///
    /// 加载点击时，先读记录再读点击，并截断到记录中的 `total_clicks`，
    /// 这样两次读取之间并发追加的点击不会让快照失去一致性。
    pub async fn get(&self, code: &str, with_clicks: bool) -> Result<Option<UrlRecord>> {
        let model = url_record::Entity::find()
            .filter(url_record::Column::ShortUrl.eq(code))
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to query short url {}: {}", code, e);
                ShrinkError::database_operation(format!("Failed to query short url: {}", e))
            })?;

        // MySQL 的 PAD SPACE 排序规则会让 "abc" 匹配 "abc "，这里再做一次精确比较
        let Some(model) = model.filter(|m| m.short_url == code) else {
            return Ok(None);
        };

        let mut record = record_from_model(model);
        if !with_clicks {
            return Ok(Some(record));
        }

        let clicks = click::Entity::find()
            .filter(click::Column::UrlId.eq(record.id))
            .order_by_asc(click::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to load clicks for {}: {}", code, e);
                ShrinkError::database_operation(format!("Failed to load clicks: {}", e))
            })?;

        record.clicks = clicks.into_iter().map(click_from_model).collect();
        record
            .clicks
            .truncate(usize::try_from(record.total_clicks).unwrap_or(usize::MAX));

        Ok(Some(record))
    }

    /// 统计短码出现次数
    pub async fn count(&self, code: &str) -> Result<u64> {
        url_record::Entity::find()
            .filter(url_record::Column::ShortUrl.eq(code))
            .count(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to count short url {}: {}", code, e);
                ShrinkError::database_operation(format!("Failed to count short url: {}", e))
            })
    }
}

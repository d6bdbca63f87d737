//! Mutation operations for SeaOrmStorage
//!
//! This module contains all write database operations.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, ExprTrait, QueryFilter, QuerySelect,
    SqlErr, TransactionTrait,
};
use tracing::{debug, error, info};

use super::SeaOrmStorage;
use super::converters::{click_from_model, click_to_active_model, record_from_model};
use crate::errors::{Result, ShrinkError};
use crate::storage::models::{ClickEvent, NewClickEvent, NewUrlRecord, UrlRecord};

use migration::entities::url_record;

/// 唯一索引冲突视为短码已被占用
fn map_insert_error(short_url: &str, err: DbErr) -> ShrinkError {
    if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
        debug!("Insert rejected by unique index: {}", short_url);
        return ShrinkError::alias_taken(format!("Short code already exists: {}", short_url));
    }
    error!("Failed to insert short url {}: {}", short_url, err);
    ShrinkError::database_operation(format!("Failed to save URL: {}", err))
}

impl SeaOrmStorage {
    /// 插入新记录，唯一索引是最终的冲突判定
    pub async fn insert(&self, record: NewUrlRecord) -> Result<UrlRecord> {
        use sea_orm::ActiveValue::*;

        let now = Utc::now();
        let active = url_record::ActiveModel {
            id: NotSet,
            original_url: Set(record.original_url),
            short_url: Set(record.short_url.clone()),
            custom_alias: Set(record.custom_alias),
            total_clicks: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            is_active: Set(true),
        };

        let model = active
            .insert(&self.db)
            .await
            .map_err(|e| map_insert_error(&record.short_url, e))?;

        info!("Short url created: {}", model.short_url);
        Ok(record_from_model(model))
    }

    /// 在一个事务里完成：计数 +1、刷新 updated_at、插入点击行
    ///
    /// 计数更新会锁住该行，同一短码的追加因此被串行化。
    pub async fn push_click(&self, code: &str, click: &NewClickEvent) -> Result<ClickEvent> {
        let db = &self.db;

        let inserted = self
            .options
            .retry
            .run("append_click", || async {
                let txn = db.begin().await?;

                let updated = url_record::Entity::update_many()
                    .col_expr(
                        url_record::Column::TotalClicks,
                        Expr::col(url_record::Column::TotalClicks).add(Expr::val(1i64)),
                    )
                    .col_expr(url_record::Column::UpdatedAt, Expr::value(Utc::now()))
                    .filter(url_record::Column::ShortUrl.eq(code))
                    .exec(&txn)
                    .await?;

                if updated.rows_affected == 0 {
                    txn.rollback().await?;
                    return Ok(None);
                }

                let url_id: Option<i64> = url_record::Entity::find()
                    .select_only()
                    .column(url_record::Column::Id)
                    .filter(url_record::Column::ShortUrl.eq(code))
                    .into_tuple()
                    .one(&txn)
                    .await?;

                let Some(url_id) = url_id else {
                    txn.rollback().await?;
                    return Ok(None);
                };

                let model = click_to_active_model(url_id, click).insert(&txn).await?;
                txn.commit().await?;
                Ok(Some(model))
            })
            .await
            .map_err(|e| {
                error!("Failed to append click to {}: {}", code, e);
                ShrinkError::database_operation(format!("Failed to append click: {}", e))
            })?;

        match inserted {
            Some(model) => Ok(click_from_model(model)),
            None => Err(ShrinkError::not_found(format!(
                "Short URL not found: {}",
                code
            ))),
        }
    }
}

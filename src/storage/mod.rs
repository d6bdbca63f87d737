use std::sync::Arc;

use async_trait::async_trait;

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::SeaOrmStorage;
pub use models::{
    ClickEvent, ClientInfo, Location, NewClickEvent, NewUrlRecord, StorageConfig, UrlRecord,
};

/// 短链接记录存储
///
/// 所有实现都必须满足：
/// - `short_url` 唯一，重复插入返回 `AliasTaken`
/// - `append_click` 原子地追加点击、`total_clicks + 1`、刷新 `updated_at`
#[async_trait]
pub trait UrlStore: Send + Sync {
    /// 插入新记录
    async fn create(&self, record: NewUrlRecord) -> Result<UrlRecord>;

    /// 按短码精确查找；`with_clicks` 为 true 时同时加载点击序列
    async fn find_by_short_url(&self, code: &str, with_clicks: bool)
    -> Result<Option<UrlRecord>>;

    /// 原子追加一次点击；没有匹配记录时返回 `NotFound`
    async fn append_click(&self, code: &str, click: NewClickEvent) -> Result<ClickEvent>;

    /// 短码出现次数（0 = 未占用）
    async fn count_by_short_url(&self, code: &str) -> Result<u64>;

    fn backend_name(&self) -> &str;
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<SeaOrmStorage>> {
        let database_url = &config.database_url;

        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(database_url)?;

        let storage = backend::SeaOrmStorage::with_options(
            database_url,
            &backend_type,
            backend::StorageOptions::from_config(config),
        )
        .await?;
        Ok(Arc::new(storage))
    }
}

//! SeaORM storage backend
//!
//! This module provides database storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod connection;
mod converters;
mod mutations;
mod query;
pub mod retry;
mod url_store;

use std::future::Future;
use std::time::Duration;

use sea_orm::DatabaseConnection;
use tracing::{error, info};

use crate::config::DatabaseConfig;
use crate::errors::{Result, ShrinkError};
use crate::storage::models::StorageConfig;

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{click_from_model, click_to_active_model, record_from_model};
pub use retry::RetryPolicy;

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(ShrinkError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// 规范化 backend 名称
pub fn normalize_backend_name(backend: &str) -> String {
    match backend {
        "mariadb" => "mysql".to_string(),
        "postgresql" => "postgres".to_string(),
        other => other.to_string(),
    }
}

/// 连接与操作参数
#[derive(Clone, Copy, Debug)]
pub struct StorageOptions {
    pub pool_size: u32,
    /// 单次存储操作的超时
    pub op_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            pool_size: 10,
            op_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

impl StorageOptions {
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self {
            pool_size: config.pool_size.max(1),
            op_timeout: Duration::from_secs(config.timeout_secs.max(1)),
            retry: RetryPolicy {
                max_retries: config.retry_count,
                base_delay_ms: config.retry_base_delay_ms,
                max_delay_ms: config.retry_max_delay_ms,
            },
        }
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    options: StorageOptions,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        Self::with_options(database_url, backend_name, StorageOptions::default()).await
    }

    pub async fn with_options(
        database_url: &str,
        backend_name: &str,
        options: StorageOptions,
    ) -> Result<Self> {
        if database_url.is_empty() {
            return Err(ShrinkError::database_config("DATABASE_URL is not set"));
        }

        let backend_name = normalize_backend_name(backend_name);

        // 根据不同数据库类型配置连接选项
        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, &backend_name, options.pool_size).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name,
            options,
        };

        // 运行迁移
        run_migrations(&storage.db).await?;

        info!(
            "{} Storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    pub fn get_backend_config(&self) -> StorageConfig {
        StorageConfig {
            storage_type: self.backend_name.clone(),
        }
    }

    /// 关闭连接池
    pub async fn close(&self) -> Result<()> {
        self.db.clone().close().await.map_err(|e| {
            error!("Failed to close database connection: {}", e);
            ShrinkError::database_connection(e.to_string())
        })
    }

    /// 为存储操作加上超时
    async fn bounded<T, F>(&self, operation_name: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.options.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Storage operation '{}' timed out after {:?}",
                    operation_name, self.options.op_timeout
                );
                Err(ShrinkError::database_timeout(format!(
                    "{} timed out after {:?}",
                    operation_name, self.options.op_timeout
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend_from_url() {
        assert_eq!(
            infer_backend_from_url("sqlite://data.db?mode=rwc").unwrap(),
            "sqlite"
        );
        assert_eq!(infer_backend_from_url("sqlite::memory:").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("links.db").unwrap(), "sqlite");
        assert_eq!(
            infer_backend_from_url("mariadb://root@localhost/shrink").unwrap(),
            "mysql"
        );
        assert_eq!(
            infer_backend_from_url("postgresql://localhost/shrink").unwrap(),
            "postgres"
        );
        assert!(matches!(
            infer_backend_from_url("mongodb://localhost:27017"),
            Err(ShrinkError::DatabaseConfig(_))
        ));
    }

    #[test]
    fn test_storage_options_from_config() {
        let config = DatabaseConfig {
            timeout_secs: 0,
            pool_size: 0,
            ..Default::default()
        };
        let options = StorageOptions::from_config(&config);
        assert_eq!(options.op_timeout, Duration::from_secs(1));
        assert_eq!(options.pool_size, 1);
        assert_eq!(options.retry.max_retries, config.retry_count);
    }
}

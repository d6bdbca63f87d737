//! UrlStore implementation for SeaOrmStorage

use async_trait::async_trait;

use super::SeaOrmStorage;
use crate::errors::Result;
use crate::storage::UrlStore;
use crate::storage::models::{ClickEvent, NewClickEvent, NewUrlRecord, UrlRecord};

#[async_trait]
impl UrlStore for SeaOrmStorage {
    async fn create(&self, record: NewUrlRecord) -> Result<UrlRecord> {
        self.bounded("create", self.insert(record)).await
    }

    async fn find_by_short_url(
        &self,
        code: &str,
        with_clicks: bool,
    ) -> Result<Option<UrlRecord>> {
        self.bounded("find_by_short_url", self.get(code, with_clicks))
            .await
    }

    async fn append_click(&self, code: &str, click: NewClickEvent) -> Result<ClickEvent> {
        self.bounded("append_click", self.push_click(code, &click))
            .await
    }

    async fn count_by_short_url(&self, code: &str) -> Result<u64> {
        self.bounded("count_by_short_url", self.count(code)).await
    }

    fn backend_name(&self) -> &str {
        &self.backend_name
    }
}

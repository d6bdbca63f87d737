//! Link creation service
//!
//! Short code reservation, collision handling and record lookup.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::LinksConfig;
use crate::errors::{Result, ShrinkError};
use crate::storage::{NewUrlRecord, UrlRecord, UrlStore};
use crate::utils::url_validator::validate_url;
use crate::utils::{MAX_ALIAS_LENGTH, generate_random_code, is_reserved_alias, is_valid_alias};

/// Request to create a new short link
#[derive(Debug, Clone, Default)]
pub struct CreateLinkRequest {
    pub original_url: String,
    /// Optional user-chosen code; empty means "generate one"
    pub custom_alias: Option<String>,
}

/// Service for short link creation and lookup
#[derive(Clone)]
pub struct LinkService {
    store: Arc<dyn UrlStore>,
    code_length: usize,
    max_attempts: u32,
}

impl LinkService {
    pub fn new(store: Arc<dyn UrlStore>, config: &LinksConfig) -> Self {
        Self {
            store,
            code_length: config.code_length.max(1),
            max_attempts: config.max_generate_attempts.max(1),
        }
    }

    /// 检查自定义别名格式；别名按原样精确匹配，不做大小写或空白处理
    fn check_alias(alias: &str) -> Result<()> {
        if !is_valid_alias(alias) {
            return Err(ShrinkError::validation(format!(
                "Invalid custom alias '{}'. Use 1-{} characters from A-Z, a-z, 0-9, '_' and '-'",
                alias, MAX_ALIAS_LENGTH
            )));
        }
        if is_reserved_alias(alias) {
            return Err(ShrinkError::validation(format!(
                "Custom alias '{}' conflicts with a reserved route",
                alias
            )));
        }
        Ok(())
    }

    /// 生成一个候选短码，已被占用时返回 None
    async fn free_candidate(&self) -> Result<Option<String>> {
        let candidate = generate_random_code(self.code_length);
        if self.store.count_by_short_url(&candidate).await? == 0 {
            Ok(Some(candidate))
        } else {
            debug!("Generated code '{}' is taken, retrying", candidate);
            Ok(None)
        }
    }

    fn exhausted(&self) -> ShrinkError {
        warn!(
            "No free short code after {} attempts (length {})",
            self.max_attempts, self.code_length
        );
        ShrinkError::store_exhausted(format!(
            "Could not allocate a free short code after {} attempts",
            self.max_attempts
        ))
    }

    /// 预留一个短码
    ///
    /// - 有别名：已存在则 `AliasTaken`，否则原样返回
    /// - 无别名：随机生成直到找到空闲短码，最多 `max_attempts` 次
    ///
    /// 只是存在性检查，真正的占用以插入时的唯一索引为准。
    pub async fn reserve(&self, requested_alias: Option<&str>) -> Result<String> {
        if let Some(alias) = requested_alias.filter(|a| !a.is_empty()) {
            Self::check_alias(alias)?;
            if self.store.count_by_short_url(alias).await? > 0 {
                return Err(ShrinkError::alias_taken("Custom alias already exists"));
            }
            return Ok(alias.to_string());
        }

        for _ in 0..self.max_attempts {
            if let Some(code) = self.free_candidate().await? {
                return Ok(code);
            }
        }
        Err(self.exhausted())
    }

    /// 创建短链接
    ///
    /// 校验在任何写入之前完成。随机短码在插入时撞上唯一索引（并发竞争）
    /// 会换一个候选重试；自定义别名撞上则直接返回 `AliasTaken`。
    pub async fn create_link(&self, req: CreateLinkRequest) -> Result<UrlRecord> {
        let original_url = validate_url(&req.original_url)?.to_string();
        let custom_alias = req.custom_alias.filter(|a| !a.is_empty());

        if let Some(alias) = custom_alias {
            let short_url = self.reserve(Some(&alias)).await?;
            let record = self
                .store
                .create(NewUrlRecord {
                    original_url,
                    short_url,
                    custom_alias: Some(alias),
                })
                .await
                .map_err(|e| match e {
                    ShrinkError::AliasTaken(_) => {
                        ShrinkError::alias_taken("Custom alias already exists")
                    }
                    other => other,
                })?;
            info!(
                "Created link '{}' -> '{}' (custom alias)",
                record.short_url, record.original_url
            );
            return Ok(record);
        }

        for attempt in 1..=self.max_attempts {
            let Some(short_url) = self.free_candidate().await? else {
                continue;
            };

            match self
                .store
                .create(NewUrlRecord {
                    original_url: original_url.clone(),
                    short_url,
                    custom_alias: None,
                })
                .await
            {
                Ok(record) => {
                    info!(
                        "Created link '{}' -> '{}'",
                        record.short_url, record.original_url
                    );
                    return Ok(record);
                }
                Err(ShrinkError::AliasTaken(msg)) => {
                    debug!("Lost insert race on attempt {}: {}", attempt, msg);
                }
                Err(e) => return Err(e),
            }
        }

        Err(self.exhausted())
    }

    /// 获取短链接（可选包含点击序列）
    pub async fn get_link(&self, code: &str, with_clicks: bool) -> Result<UrlRecord> {
        self.store
            .find_by_short_url(code, with_clicks)
            .await?
            .ok_or_else(|| ShrinkError::not_found("Short URL not found"))
    }
}

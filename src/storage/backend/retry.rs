//! 写冲突重试
//!
//! 并发点击会在同一行上竞争写锁。SQLite BUSY / LOCKED、MySQL 死锁、
//! PostgreSQL 序列化失败都属于瞬时冲突，按指数退避重试；
//! 其他错误（连接断开、约束冲突等）立即返回给调用方。

use std::future::Future;
use std::time::Duration;

use sea_orm::DbErr;
use tokio::time::sleep;
use tracing::{debug, warn};

/// 冲突错误码
/// - MySQL: 1213 死锁, 1205 锁等待超时
/// - PostgreSQL: 40001 序列化失败, 40P01 死锁
/// - SQLite: 5 BUSY, 6 LOCKED
const CONTENTION_CODES: &[&str] = &["1213", "1205", "40001", "40P01", "5", "6"];

/// 判断数据库错误是否为可重试的写冲突
pub fn is_contention_error(err: &DbErr) -> bool {
    use sea_orm::error::RuntimeErr;

    let runtime_err = match err {
        DbErr::Exec(e) | DbErr::Query(e) => e,
        _ => return false,
    };

    match runtime_err {
        RuntimeErr::SqlxError(sqlx_err) => {
            if let Some(db_err) = sqlx_err.as_database_error()
                && let Some(code) = db_err.code()
            {
                let code: &str = &code;
                return CONTENTION_CODES.contains(&code);
            }
            is_contention_message(&sqlx_err.to_string())
        }
        RuntimeErr::Internal(msg) => is_contention_message(msg),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

fn is_contention_message(msg: &str) -> bool {
    let msg = msg.to_lowercase();
    msg.contains("deadlock")
        || msg.contains("database is locked")
        || msg.contains("lock wait timeout")
        || msg.contains("serialization failure")
        || msg.contains("could not serialize")
}

/// 重试策略
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 50,
            max_delay_ms: 1000,
        }
    }
}

impl RetryPolicy {
    /// 第 `attempt` 次重试前的等待时间（指数退避 + 0-25% 抖动）
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        let capped = exp.min(self.max_delay_ms);
        let jitter = rand::random_range(0..=capped / 4);
        Duration::from_millis(capped.saturating_add(jitter))
    }

    /// 执行操作，遇到写冲突时重试
    pub async fn run<T, F, Fut>(&self, operation_name: &str, mut operation: F) -> Result<T, DbErr>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DbErr>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("'{}' succeeded after {} retries", operation_name, attempt);
                    }
                    return Ok(value);
                }
                Err(e) if is_contention_error(&e) && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.backoff(attempt);
                    warn!(
                        "'{}' hit write contention (attempt {}/{}): {}; retrying in {:?}",
                        operation_name,
                        attempt,
                        self.max_retries + 1,
                        e,
                        delay
                    );
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn internal(msg: &str) -> DbErr {
        DbErr::Exec(sea_orm::error::RuntimeErr::Internal(msg.to_string()))
    }

    #[test]
    fn test_contention_detection() {
        assert!(is_contention_error(&internal("database is locked")));
        assert!(is_contention_error(&internal(
            "Deadlock found when trying to get lock"
        )));
        assert!(!is_contention_error(&internal("syntax error")));
        assert!(!is_contention_error(&DbErr::RecordNotFound(
            "gone".to_string()
        )));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy {
            max_retries: 10,
            base_delay_ms: 100,
            max_delay_ms: 400,
        };
        // 上限 400ms + 25% 抖动
        assert!(policy.backoff(10) <= Duration::from_millis(500));
        assert!(policy.backoff(1) >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_run_retries_contention_then_succeeds() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay_ms: 1,
            max_delay_ms: 2,
        };
        let calls = AtomicU32::new(0);

        let result = policy
            .run("test", || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(internal("database is locked"))
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_run_does_not_retry_other_errors() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);

        let result: Result<(), DbErr> = policy
            .run("test", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(internal("UNIQUE constraint failed: urls.short_url"))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_gives_up_after_max_retries() {
        let policy = RetryPolicy {
            max_retries: 2,
            base_delay_ms: 1,
            max_delay_ms: 1,
        };
        let calls = AtomicU32::new(0);

        let result: Result<(), DbErr> = policy
            .run("test", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(internal("database is locked"))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}

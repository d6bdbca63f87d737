use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShrinkError {
    Validation(String),
    AliasTaken(String),
    NotFound(String),
    DatabaseOperation(String),
    DatabaseTimeout(String),
    StoreExhausted(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    GeoLookup(String),
    Serialization(String),
    FileOperation(String),
}

impl ShrinkError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ShrinkError::Validation(_) => "E001",
            ShrinkError::AliasTaken(_) => "E002",
            ShrinkError::NotFound(_) => "E003",
            ShrinkError::DatabaseOperation(_) => "E004",
            ShrinkError::DatabaseTimeout(_) => "E005",
            ShrinkError::StoreExhausted(_) => "E006",
            ShrinkError::DatabaseConfig(_) => "E007",
            ShrinkError::DatabaseConnection(_) => "E008",
            ShrinkError::GeoLookup(_) => "E009",
            ShrinkError::Serialization(_) => "E010",
            ShrinkError::FileOperation(_) => "E011",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ShrinkError::Validation(_) => "Validation Error",
            ShrinkError::AliasTaken(_) => "Alias Taken",
            ShrinkError::NotFound(_) => "Resource Not Found",
            ShrinkError::DatabaseOperation(_) => "Database Operation Error",
            ShrinkError::DatabaseTimeout(_) => "Database Timeout",
            ShrinkError::StoreExhausted(_) => "Short Code Space Exhausted",
            ShrinkError::DatabaseConfig(_) => "Database Configuration Error",
            ShrinkError::DatabaseConnection(_) => "Database Connection Error",
            ShrinkError::GeoLookup(_) => "GeoIP Lookup Error",
            ShrinkError::Serialization(_) => "Serialization Error",
            ShrinkError::FileOperation(_) => "File Operation Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            ShrinkError::Validation(msg)
            | ShrinkError::AliasTaken(msg)
            | ShrinkError::NotFound(msg)
            | ShrinkError::DatabaseOperation(msg)
            | ShrinkError::DatabaseTimeout(msg)
            | ShrinkError::StoreExhausted(msg)
            | ShrinkError::DatabaseConfig(msg)
            | ShrinkError::DatabaseConnection(msg)
            | ShrinkError::GeoLookup(msg)
            | ShrinkError::Serialization(msg)
            | ShrinkError::FileOperation(msg) => msg,
        }
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// Whether this error comes from the persistence layer (reported as 5xx).
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            ShrinkError::DatabaseOperation(_)
                | ShrinkError::DatabaseTimeout(_)
                | ShrinkError::DatabaseConfig(_)
                | ShrinkError::DatabaseConnection(_)
        )
    }
}

impl fmt::Display for ShrinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ShrinkError {}

// 便捷的构造函数
impl ShrinkError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        ShrinkError::Validation(msg.into())
    }

    pub fn alias_taken<T: Into<String>>(msg: T) -> Self {
        ShrinkError::AliasTaken(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ShrinkError::NotFound(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        ShrinkError::DatabaseOperation(msg.into())
    }

    pub fn database_timeout<T: Into<String>>(msg: T) -> Self {
        ShrinkError::DatabaseTimeout(msg.into())
    }

    pub fn store_exhausted<T: Into<String>>(msg: T) -> Self {
        ShrinkError::StoreExhausted(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        ShrinkError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        ShrinkError::DatabaseConnection(msg.into())
    }

    pub fn geo_lookup<T: Into<String>>(msg: T) -> Self {
        ShrinkError::GeoLookup(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ShrinkError::Serialization(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        ShrinkError::FileOperation(msg.into())
    }
}

impl From<sea_orm::DbErr> for ShrinkError {
    fn from(err: sea_orm::DbErr) -> Self {
        ShrinkError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for ShrinkError {
    fn from(err: std::io::Error) -> Self {
        ShrinkError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ShrinkError {
    fn from(err: serde_json::Error) -> Self {
        ShrinkError::Serialization(err.to_string())
    }
}

/// JSON body returned for every failed API call
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
    pub code: &'static str,
}

impl ResponseError for ShrinkError {
    fn status_code(&self) -> StatusCode {
        match self {
            ShrinkError::Validation(_) | ShrinkError::AliasTaken(_) => StatusCode::BAD_REQUEST,
            ShrinkError::NotFound(_) => StatusCode::NOT_FOUND,
            ShrinkError::StoreExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // 5xx 不向调用方暴露数据库细节
        let message = match self.status_code() {
            StatusCode::INTERNAL_SERVER_ERROR => "Database error",
            _ => self.message(),
        };

        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: message,
            code: self.code(),
        })
    }
}

pub type Result<T> = std::result::Result<T, ShrinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ShrinkError::validation("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ShrinkError::alias_taken("promo").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ShrinkError::not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ShrinkError::database_timeout("slow").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ShrinkError::store_exhausted("full").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_store_error_classification() {
        assert!(ShrinkError::database_operation("x").is_store_error());
        assert!(ShrinkError::database_timeout("x").is_store_error());
        assert!(!ShrinkError::not_found("x").is_store_error());
        assert!(!ShrinkError::alias_taken("x").is_store_error());
    }

    #[test]
    fn test_display_uses_simple_format() {
        let err = ShrinkError::alias_taken("Custom alias already exists");
        assert_eq!(
            err.to_string(),
            "Alias Taken: Custom alias already exists"
        );
        assert_eq!(err.code(), "E002");
    }
}

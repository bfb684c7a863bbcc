// 错误处理模块
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::response::R;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("验证错误: {0}")]
    ValidationError(String),

    #[error("未授权: {0}")]
    Unauthorized(String),

    #[error("禁止访问: {0}")]
    Forbidden(String),

    #[error("未找到: {0}")]
    NotFound(String),

    #[error("业务错误: {0}")]
    BusinessError(String),

    #[error("预测错误: {0}")]
    PredictionError(String),

    #[error("内部服务器错误: {0}")]
    InternalServerError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn database_error(msg: impl Into<String>) -> Self {
        AppError::DatabaseError(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        AppError::ConfigError(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn business(msg: impl Into<String>) -> Self {
        AppError::BusinessError(msg.into())
    }

    pub fn prediction(msg: impl Into<String>) -> Self {
        AppError::PredictionError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::InternalServerError(msg.into())
    }

    /// 返回给客户端的消息（不带中文前缀）
    pub fn message(&self) -> &str {
        match self {
            AppError::DatabaseError(m)
            | AppError::ConfigError(m)
            | AppError::ValidationError(m)
            | AppError::Unauthorized(m)
            | AppError::Forbidden(m)
            | AppError::NotFound(m)
            | AppError::BusinessError(m)
            | AppError::PredictionError(m)
            | AppError::InternalServerError(m) => m,
        }
    }
}

// 从 rbatis 错误转换 (rbatis::Error 包含了 rbdc::Error)
impl From<rbatis::Error> for AppError {
    fn from(err: rbatis::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BusinessError(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_)
            | AppError::ConfigError(_)
            | AppError::PredictionError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // 5xx 细节只进日志，不回给客户端
        if status.is_server_error() {
            log::error!("❌ 请求处理失败: {}", self);
        }
        let body: R<()> = R::error(status.as_u16(), self.message().to_string());
        HttpResponse::build(status).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::validation("bad").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::business("no").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::auth("denied").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::forbidden("denied").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::not_found("missing").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::database_error("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_message_strips_prefix() {
        let err = AppError::validation("Applicant income must be positive");
        assert_eq!(err.message(), "Applicant income must be positive");
        // Display 带分类前缀，供日志使用
        assert!(err.to_string().contains("Applicant income must be positive"));
        assert_ne!(err.to_string(), err.message());
    }
}

use actix_web::{HttpResponse, ResponseError};
use deadpool_redis::PoolError;
use deadpool_redis::redis::RedisError;
use log::error;
use mongodb::error::Error as MongoError;
use serde::Serialize;
use std::io;
use thiserror::Error;
/// HTTP 错误响应结构
#[derive(Serialize)]
struct ErrorResponse {
    code: u16,
    message: String,
}

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    // ==== 常规业务错误 ====
    #[error("Resource not found")]
    NotFound,

    #[error("Bad request: {0}")]
    Validation(String),

    #[error("Unauthorized access")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("biz error: {0}")]
    BizError(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Upstream call failed: {0}")]
    Upstream(String),

    #[error("Redis pool error: {0}")]
    RedisPoolError(#[from] PoolError),
    // ==== 系统错误 ====
    #[error("MongoDB error: {0}")]
    Mongo(#[from] MongoError),
    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Internal server error")]
    Internal(String),
}
impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast::<AppError>() {
            Ok(app_err) => app_err,
            Err(e) => AppError::Internal(e.to_string()),
        }
    }
}
impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(format!("参数验证失败: {}", e))
    }
}
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, msg) = match self {
            AppError::NotFound => (actix_web::http::StatusCode::NOT_FOUND, self.to_string()),
            AppError::Validation(msg) => (actix_web::http::StatusCode::BAD_REQUEST, msg.to_string()),
            AppError::Unauthorized(msg) => (actix_web::http::StatusCode::UNAUTHORIZED, msg.to_string()),
            AppError::Conflict(msg) => (actix_web::http::StatusCode::CONFLICT, msg.to_string()),
            AppError::Transaction(e) => {
                error!("{:?}", e);
                (actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, "Service error".to_string())
            }
            AppError::Upstream(e) => {
                error!("{:?}", e);
                (actix_web::http::StatusCode::BAD_GATEWAY, self.to_string())
            }
            AppError::BizError(e) => {
                error!("{:?}", e);
                (actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::Mongo(e) => {
                error!("{:?}", e);
                (actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, "Service error".to_string())
            }
            AppError::Redis(e) => {
                error!("{:?}", e);
                (actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, "Service error".to_string())
            }
            AppError::RedisPoolError(e) => {
                error!("{:?}", e);
                (actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, "Service error".to_string())
            }
            AppError::Json(e) => {
                error!("{:?}", e);
                (actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, "Service error".to_string())
            }
            AppError::Io(e) => {
                error!("{:?}", e);
                (actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, "Service error".to_string())
            }
            AppError::Internal(e) => {
                error!("{:?}", e);
                (actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, "Service error".to_string())
            }
        };

        HttpResponse::build(status).json(ErrorResponse { code: status.as_u16(), message: msg })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::NotFound.error_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Validation("bad".into()).error_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthorized("no token".into()).error_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Conflict("dup".into()).error_response().status(), StatusCode::CONFLICT);
        assert_eq!(AppError::Transaction("commit".into()).error_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::Upstream("download".into()).error_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_anyhow_downcast_keeps_variant() {
        let err: anyhow::Error = AppError::Conflict("已存在".into()).into();
        let app: AppError = err.into();
        assert!(matches!(app, AppError::Conflict(_)));
    }
}

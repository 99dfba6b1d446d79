//! 统一错误模型
//! 定义所有错误类型和错误响应格式

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// 登录凭证无效（不区分账号不存在与密码错误）
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// 访问令牌已过期
    #[error("Token expired")]
    TokenExpired,

    /// 令牌签名或结构无效
    #[error("Token malformed")]
    TokenMalformed,

    /// 刷新令牌无效（签名、过期、已被轮换，统一不区分）
    #[error("Refresh token rejected")]
    RefreshRejected,

    /// 令牌有效但权限集中没有匹配的 (method, apiPath)
    #[error("Permission denied")]
    PermissionDenied,

    /// 试图删除或修改受保护的管理员角色/账号
    #[error("Protected entity: {0}")]
    ProtectedEntity(String),

    #[error("Resource not found")]
    NotFound,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials
            | AppError::TokenExpired
            | AppError::TokenMalformed => StatusCode::UNAUTHORIZED,
            AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::RefreshRejected
            | AppError::ProtectedEntity(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    ///
    /// 过期与格式错误的令牌返回同一条消息；登录失败不区分
    /// 账号不存在与密码错误。
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidCredentials => "Authentication failed".to_string(),
            AppError::TokenExpired | AppError::TokenMalformed => {
                "Token is invalid or expired".to_string()
            }
            AppError::RefreshRejected => "Refresh token invalid".to_string(),
            AppError::PermissionDenied => {
                "You do not have permission to access this endpoint".to_string()
            }
            AppError::ProtectedEntity(msg) => msg.clone(),
            AppError::NotFound => "Resource not found".to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Database(_) => "Database error occurred".to_string(),
            AppError::Config(_) => "Configuration error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }
}

/// 错误响应 DTO
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
    pub request_id: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: self.code(),
                message: self.user_message(),
                request_id,
            },
        };

        // 记录错误日志
        if status.is_server_error() {
            tracing::error!(
                code = self.code(),
                message = %self,
                request_id = %error_response.error.request_id,
                "Application error"
            );
        } else {
            tracing::debug!(
                code = self.code(),
                message = %self,
                request_id = %error_response.error.request_id,
                "Request rejected"
            );
        }

        (status, Json(error_response)).into_response()
    }
}

/// 从 String 转换为 AppError::Config
impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::Config(s)
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

/// 从 validator 校验错误转换
impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::InvalidCredentials.code(), 401);
        assert_eq!(AppError::TokenExpired.code(), 401);
        assert_eq!(AppError::TokenMalformed.code(), 401);
        assert_eq!(AppError::RefreshRejected.code(), 400);
        assert_eq!(AppError::PermissionDenied.code(), 403);
        assert_eq!(AppError::ProtectedEntity("x".to_string()).code(), 400);
        assert_eq!(AppError::NotFound.code(), 404);
        assert_eq!(AppError::BadRequest("test".to_string()).code(), 400);
    }

    #[test]
    fn test_expired_and_malformed_share_message() {
        // 两种令牌失败对调用方不可区分
        assert_eq!(
            AppError::TokenExpired.user_message(),
            AppError::TokenMalformed.user_message()
        );
    }

    #[test]
    fn test_user_message_no_sensitive_info() {
        let err = AppError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.user_message(), "Database error occurred");

        let err = AppError::Internal("secret connection string".to_string());
        assert!(!err.user_message().contains("secret"));
    }
}

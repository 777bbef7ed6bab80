//! API 错误类型定义
//!
//! 所有处理器错误统一转换为 `{"message": ...}` 响应体

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use todo_shared::error::TodoError;

use crate::auth::{PasswordError, TokenError};
use crate::dto::MessageResponse;

/// 系统级错误对外统一返回的提示
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// API 错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 认证错误
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Username already exists")]
    UsernameTaken,

    // 请求错误
    #[error("{0}")]
    Validation(String),
    #[error("No task found")]
    TaskNotFound,

    // 系统错误
    #[error("存储错误: {0}")]
    Store(TodoError),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::UsernameTaken => StatusCode::CONFLICT,
            Self::Validation(_) | Self::TaskNotFound => StatusCode::BAD_REQUEST,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Store(e) => {
                tracing::error!(error = %e, code = e.code(), "存储操作失败");
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            other => other.to_string(),
        };

        (status, axum::Json(MessageResponse::new(message))).into_response()
    }
}

/// 存储错误一律按系统错误处理，业务含义由调用方在转换前识别
impl From<TodoError> for ApiError {
    fn from(err: TodoError) -> Self {
        Self::Store(err)
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooLong => Self::Validation(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 请求体无法解析为 JSON 或缺少字段
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// 阻塞任务 panic 或被取消
impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("后台任务失败: {}", err))
    }
}

/// 处理器 Result 类型别名
pub type Result<T> = std::result::Result<T, ApiError>;

//! 请求提取器

use axum::extract::FromRequest;

use crate::error::ApiError;

/// JSON 请求体提取器
///
/// 与 `axum::Json` 相同，但解析失败时返回 `ApiError`，保持统一的错误响应体。
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

//! 认证闸门中间件
//!
//! 从 Authorization 头读取 Token，验证通过后将用户身份注入请求扩展，
//! 否则直接返回拒绝响应，后续处理器不会执行。
//!
//! 每个请求只有两种终态：
//! - `Authenticated`：扩展中存在 [`AuthenticatedUser`]，处理器继续执行
//! - `Rejected`：返回 [`GateRejection`] 对应的响应

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use todo_shared::observability::metrics;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::auth::{TokenError, TokenManager};
use crate::dto::MessageResponse;

/// 已认证请求上下文
///
/// 由认证闸门注入请求扩展，随请求结束销毁。处理器通过提取器获取。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// 认证闸门拒绝原因
#[derive(Debug, thiserror::Error)]
pub enum GateRejection {
    #[error("No token present")]
    NoTokenPresent,
    #[error("Unauthorized")]
    Unauthorized(#[source] TokenError),
    #[error("Internal server error")]
    InternalError(String),
}

impl GateRejection {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NoTokenPresent | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 指标与日志使用的拒绝原因标签
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NoTokenPresent => "no_token_present",
            Self::Unauthorized(TokenError::InvalidSignature) => "invalid_signature",
            Self::Unauthorized(_) => "malformed",
            Self::InternalError(_) => "internal_error",
        }
    }
}

impl From<TokenError> for GateRejection {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed | TokenError::InvalidSignature => Self::Unauthorized(err),
            TokenError::MissingSecret | TokenError::Internal(_) => {
                Self::InternalError(err.to_string())
            }
        }
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        let reason = self.reason();
        metrics::record_auth_rejection(reason);

        match &self {
            Self::InternalError(detail) => error!(reason, detail = %detail, "Authentication gate failed"),
            _ => warn!(reason, "Request rejected by authentication gate"),
        }

        (
            self.status_code(),
            axum::Json(MessageResponse::new(self.to_string())),
        )
            .into_response()
    }
}

/// 从请求头中提取 Token
///
/// 头部值按原样作为 Token，兼容带 `Bearer ` 前缀的写法。
fn extract_token(headers: &HeaderMap) -> Result<&str, GateRejection> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Err(GateRejection::NoTokenPresent);
    };

    let raw = value
        .to_str()
        .map_err(|_| GateRejection::Unauthorized(TokenError::Malformed))?
        .trim();
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();

    if token.is_empty() {
        return Err(GateRejection::NoTokenPresent);
    }
    Ok(token)
}

/// 对请求头执行认证
///
/// 纯函数：只依赖请求头和签名密钥，不访问存储。
pub fn authenticate(
    headers: &HeaderMap,
    tokens: &TokenManager,
) -> Result<AuthenticatedUser, GateRejection> {
    let token = extract_token(headers)?;
    let user_id = tokens.verify(token)?;
    Ok(AuthenticatedUser { user_id })
}

/// 认证中间件
///
/// 挂载在受保护路由上，认证完成后才会调用下游处理器。
pub async fn auth_middleware(
    State(tokens): State<Arc<TokenManager>>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(request.headers(), &tokens) {
        Ok(user) => {
            debug!(user_id = %user.user_id, "Request authenticated");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(rejection) => rejection.into_response(),
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // 缺少上下文说明路由未挂载认证闸门，属于装配错误，不能放行
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or_else(|| GateRejection::InternalError("authentication context missing".into()))
    }
}

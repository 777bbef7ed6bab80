//! 注册与登录处理器

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::dto::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest};
use crate::error::Result;
use crate::extract::ApiJson;
use crate::state::AppState;

/// 注册用户
///
/// POST /register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    req.validate()?;

    state.auth.register(&req.username, &req.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// 用户登录
///
/// POST /login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    req.validate()?;

    let token = state.auth.login(&req.username, &req.password).await?;

    Ok(Json(LoginResponse { token }))
}

//! 健康检查处理器

use axum::{Json, extract::State, http::StatusCode};

use crate::dto::HealthResponse;
use crate::state::AppState;

pub const SERVICE_NAME: &str = "todo-api";

/// 存活探针：服务进程正常即返回 ok
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        checks: None,
    })
}

/// 就绪探针：检查任务与用户存储是否可用
///
/// GET /ready
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (tasks, users) = tokio::join!(state.tasks.ping(), state.users.ping());
    let tasks_ok = tasks.is_ok();
    let users_ok = users.is_ok();
    let all_ok = tasks_ok && users_ok;

    if let Err(e) = tasks.and(users) {
        tracing::warn!(error = %e, "Readiness check failed");
    }

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if all_ok { "ok" } else { "degraded" }.to_string(),
            service: SERVICE_NAME.to_string(),
            checks: Some(serde_json::json!({
                "tasks": if tasks_ok { "ok" } else { "fail" },
                "users": if users_ok { "ok" } else { "fail" },
            })),
        }),
    )
}

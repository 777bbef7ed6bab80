//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::{handlers, middleware::auth_middleware, state::AppState};

/// 构建认证相关的路由（公开路由，无需认证）
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
}

/// 构建任务路由
///
/// 认证闸门以 route_layer 挂载，只作用于这里匹配到的路由
pub fn task_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/list-all-todo", get(handlers::task::list_tasks))
        .route("/create-task", post(handlers::task::create_task))
        .route("/update-task/{id}", put(handlers::task::update_task))
        .route("/delete-task/{id}", delete(handlers::task::delete_task))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            auth_middleware,
        ))
}

/// 构建健康检查路由
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
}

/// 组合所有 API 路由
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .merge(auth_routes())
        .merge(task_routes(&state))
        .merge(health_routes())
        .with_state(state)
}

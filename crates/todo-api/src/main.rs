//! 待办事项服务入口
//!
//! 加载配置、选择存储后端并启动 HTTP 服务。

use std::sync::Arc;

use anyhow::Context;
use axum::{Router, http::HeaderValue, middleware};
use todo_api::{
    auth::{CredentialHasher, TokenManager, resolve_jwt_secret},
    repository::{
        MemoryTaskRepository, MemoryUserRepository, PgTaskRepository, PgUserRepository,
        TaskRepositoryTrait, UserRepositoryTrait,
    },
    routes,
    state::AppState,
};
use todo_shared::{
    config::{AppConfig, CorsConfig, StorageBackend},
    database::Database,
    observability::{self, middleware as obs_middleware},
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load("todo-api").context("加载配置失败")?;
    let _guard = observability::init(&config.observability, &config.service_name).await?;

    info!(
        environment = %config.environment,
        backend = ?config.storage.backend,
        "Starting todo-api on {}",
        config.server_addr()
    );

    // 生产环境缺少签名密钥时拒绝启动
    let jwt_secret = resolve_jwt_secret(&config.auth, config.is_production())
        .context("TODO_JWT_SECRET must be set in production environment")?;
    let hasher = CredentialHasher::new(config.auth.bcrypt_cost)?;
    let tokens = Arc::new(TokenManager::new(&jwt_secret));

    let (tasks, users, db): (
        Arc<dyn TaskRepositoryTrait>,
        Arc<dyn UserRepositoryTrait>,
        Option<Database>,
    ) = match config.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage, data is lost on restart");
            (
                Arc::new(MemoryTaskRepository::new()),
                Arc::new(MemoryUserRepository::new()),
                None,
            )
        }
        StorageBackend::Postgres => {
            let db = Database::connect(&config.database).await?;
            db.ensure_schema().await?;
            (
                Arc::new(PgTaskRepository::new(db.clone())),
                Arc::new(PgUserRepository::new(db.clone())),
                Some(db),
            )
        }
    };

    let state = AppState::new(tasks, users, hasher, tokens);

    let app: Router = routes::api_routes(state)
        .layer(middleware::from_fn(obs_middleware::security_headers))
        .layer(cors_layer(&config.cors, config.is_production()))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = db {
        db.close().await;
    }
    info!("Server shutdown complete");

    Ok(())
}

/// 根据配置构建 CORS 层
///
/// `*` 允许所有来源，否则按逗号分隔解析来源列表，无法解析的条目被忽略
fn cors_layer(cors: &CorsConfig, production: bool) -> CorsLayer {
    let allowed_origins = cors.allowed_origins.trim();

    if allowed_origins == "*" {
        if production {
            warn!("cors.allowed_origins=\"*\" 在生产环境中不安全，请设置为具体域名");
        }
        info!("CORS allowed_origins: * (all origins)");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    info!("CORS allowed_origins: {}", allowed_origins);
    let origins: Vec<_> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// 监听关闭信号
///
/// 收到 SIGTERM 或 Ctrl+C 后返回，触发 axum 的优雅关闭流程。
/// 信号处理器注册失败时该分支永不完成，不影响另一个信号。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "注册 Ctrl+C 处理器失败");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}

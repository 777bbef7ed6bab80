//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use std::sync::Arc;

use crate::auth::{CredentialHasher, TokenManager};
use crate::repository::{
    MemoryTaskRepository, MemoryUserRepository, TaskRepositoryTrait, UserRepositoryTrait,
};
use crate::service::AuthService;

/// Axum 应用共享状态
///
/// 存储后端在启动时选定，处理器只看到仓储 trait
#[derive(Clone)]
pub struct AppState {
    pub tasks: Arc<dyn TaskRepositoryTrait>,
    pub users: Arc<dyn UserRepositoryTrait>,
    pub auth: Arc<AuthService>,
    /// 认证闸门使用的 Token 管理器，与 `auth` 共享同一份密钥
    pub tokens: Arc<TokenManager>,
}

impl AppState {
    pub fn new(
        tasks: Arc<dyn TaskRepositoryTrait>,
        users: Arc<dyn UserRepositoryTrait>,
        hasher: CredentialHasher,
        tokens: Arc<TokenManager>,
    ) -> Self {
        let auth = Arc::new(AuthService::new(users.clone(), hasher, tokens.clone()));
        Self {
            tasks,
            users,
            auth,
            tokens,
        }
    }

    /// 使用内存存储构建状态
    pub fn in_memory(jwt_secret: &str, hasher: CredentialHasher) -> Self {
        Self::new(
            Arc::new(MemoryTaskRepository::new()),
            Arc::new(MemoryUserRepository::new()),
            hasher,
            Arc::new(TokenManager::new(jwt_secret)),
        )
    }
}

//! 注册与登录服务
//!
//! bcrypt 计算量大，哈希和校验都放到阻塞线程池执行，不占用异步工作线程。

use std::sync::Arc;

use todo_shared::error::TodoError;
use todo_shared::observability::metrics;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::{CredentialHasher, TokenManager};
use crate::error::{ApiError, Result};
use crate::models::{NewUser, User};
use crate::repository::UserRepositoryTrait;

/// 认证服务
pub struct AuthService {
    users: Arc<dyn UserRepositoryTrait>,
    hasher: CredentialHasher,
    tokens: Arc<TokenManager>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepositoryTrait>,
        hasher: CredentialHasher,
        tokens: Arc<TokenManager>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// 注册新用户
    ///
    /// 用户名唯一性由仓储保证，并发注册同名用户时只有一个成功。
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<User> {
        let hasher = self.hasher.clone();
        let plaintext = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&plaintext)).await??;

        let new_user = NewUser {
            username: username.to_owned(),
            password_hash,
        };
        let user = match self.users.insert(new_user).await {
            Ok(user) => user,
            Err(TodoError::AlreadyExists { .. }) => {
                warn!(username, "Registration rejected: username already exists");
                return Err(ApiError::UsernameTaken);
            }
            Err(e) => return Err(e.into()),
        };

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// 校验凭证并签发 Token
    ///
    /// 用户不存在与密码错误返回同一个错误。用户不存在时仍对占位哈希做一次 bcrypt 校验，
    /// 两种失败的耗时一致，不泄露用户名是否已注册。
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let user = self.users.find_by_username(username).await?;

        let hasher = self.hasher.clone();
        let plaintext = password.to_owned();
        let stored = user.as_ref().map(|u| u.password_hash.clone());
        let matched = tokio::task::spawn_blocking(move || match stored {
            Some(stored) => hasher.verify(&plaintext, &stored),
            None => hasher.verify_decoy(&plaintext),
        })
        .await?;

        let user = match user {
            Some(user) if matched => user,
            Some(_) => {
                metrics::record_login("wrong_password");
                return Err(ApiError::InvalidCredentials);
            }
            None => {
                metrics::record_login("unknown_user");
                return Err(ApiError::InvalidCredentials);
            }
        };

        let token = self.issue_for(user.id)?;
        metrics::record_login("success");
        info!(user_id = %user.id, "User logged in");
        Ok(token)
    }

    fn issue_for(&self, user_id: Uuid) -> Result<String> {
        Ok(self.tokens.issue(user_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::repository::MockUserRepositoryTrait;
    use chrono::Utc;
    use std::time::{Duration, Instant};

    const SECRET: &str = "service-test-secret";

    fn hasher() -> CredentialHasher {
        CredentialHasher::new(4).unwrap()
    }

    fn service(users: MockUserRepositoryTrait) -> AuthService {
        service_with_cost(users, 4)
    }

    fn service_with_cost(users: MockUserRepositoryTrait, cost: u32) -> AuthService {
        AuthService::new(
            Arc::new(users),
            CredentialHasher::new(cost).unwrap(),
            Arc::new(TokenManager::new(SECRET)),
        )
    }

    fn stored_user(username: &str, password: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: hash_password(password, 4).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_plaintext() {
        let mut users = MockUserRepositoryTrait::new();
        users
            .expect_insert()
            .withf(|new| new.username == "alice" && new.password_hash != "s3cret")
            .times(1)
            .returning(|new| {
                Ok(User {
                    id: Uuid::new_v4(),
                    username: new.username,
                    password_hash: new.password_hash,
                    created_at: Utc::now(),
                })
            });

        let user = service(users).register("alice", "s3cret").await.unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.password_hash.starts_with("$2"));
        assert!(hasher().verify("s3cret", &user.password_hash));
    }

    #[tokio::test]
    async fn test_register_duplicate_is_conflict() {
        let mut users = MockUserRepositoryTrait::new();
        users.expect_insert().returning(|new| {
            Err(TodoError::AlreadyExists {
                entity: "User".to_string(),
                field: "username".to_string(),
                value: new.username,
            })
        });

        let err = service(users).register("alice", "s3cret").await.unwrap_err();
        assert!(matches!(err, ApiError::UsernameTaken));
    }

    #[tokio::test]
    async fn test_login_issues_token_for_user() {
        let user = stored_user("alice", "s3cret");
        let user_id = user.id;

        let mut users = MockUserRepositoryTrait::new();
        users
            .expect_find_by_username()
            .withf(|name| name == "alice")
            .returning(move |_| Ok(Some(user.clone())));

        let token = service(users).login("alice", "s3cret").await.unwrap();
        let verified = TokenManager::new(SECRET).verify(&token).unwrap();
        assert_eq!(verified, user_id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let user = stored_user("alice", "s3cret");

        let mut users = MockUserRepositoryTrait::new();
        users
            .expect_find_by_username()
            .returning(move |name| Ok((name == "alice").then(|| user.clone())));
        let service = service(users);

        let wrong_password = service.login("alice", "nope").await.unwrap_err();
        let unknown_user = service.login("mallory", "s3cret").await.unwrap_err();

        assert!(matches!(wrong_password, ApiError::InvalidCredentials));
        assert!(matches!(unknown_user, ApiError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn test_login_store_failure_is_internal() {
        let mut users = MockUserRepositoryTrait::new();
        users
            .expect_find_by_username()
            .returning(|_| Err(TodoError::Internal("connection reset".into())));

        let err = service(users).login("alice", "s3cret").await.unwrap_err();
        assert!(matches!(err, ApiError::Store(_)));
    }

    #[tokio::test]
    async fn test_login_without_secret_is_internal() {
        let user = stored_user("alice", "s3cret");
        let mut users = MockUserRepositoryTrait::new();
        users
            .expect_find_by_username()
            .returning(move |_| Ok(Some(user.clone())));

        let service = AuthService::new(Arc::new(users), hasher(), Arc::new(TokenManager::new("")));
        let err = service.login("alice", "s3cret").await.unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[tokio::test]
    async fn test_register_overlong_password_is_rejected() {
        let mut users = MockUserRepositoryTrait::new();
        users.expect_insert().never();

        let password = "a".repeat(72);
        let err = service(users).register("alice", &password).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_other_conflicts_are_not_username_taken() {
        let mut users = MockUserRepositoryTrait::new();
        users
            .expect_insert()
            .returning(|_| Err(TodoError::Internal("disk full".into())));

        let err = service(users).register("alice", "s3cret").await.unwrap_err();
        assert!(matches!(err, ApiError::Store(_)));
    }

    async fn timed_login(service: &AuthService, username: &str) -> Duration {
        let start = Instant::now();
        let err = service.login(username, "wrong").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));
        start.elapsed()
    }

    #[tokio::test]
    async fn test_unknown_user_pays_same_hashing_cost() {
        const COST: u32 = 8;
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            password_hash: hash_password("s3cret", COST).unwrap(),
            created_at: Utc::now(),
        };

        let mut users = MockUserRepositoryTrait::new();
        users
            .expect_find_by_username()
            .returning(move |name| Ok((name == "alice").then(|| user.clone())));
        let service = service_with_cost(users, COST);

        // 预热阻塞线程池
        timed_login(&service, "alice").await;

        let wrong_password = timed_login(&service, "alice").await;
        let unknown_user = timed_login(&service, "mallory").await;

        assert!(
            unknown_user * 4 > wrong_password,
            "unknown user answered in {:?}, wrong password in {:?}",
            unknown_user,
            wrong_password
        );
    }
}

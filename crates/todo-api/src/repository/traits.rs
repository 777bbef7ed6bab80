//! 仓储 Trait 定义
//!
//! 定义仓储接口，便于处理器依赖抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;
use todo_shared::error::Result;

use crate::models::{NewTask, NewUser, Task, TaskFilter, TaskUpdate, User};

/// 任务仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepositoryTrait: Send + Sync {
    /// 查询满足条件的所有任务，按创建时间升序
    async fn find(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    /// 插入任务，生成 id 与创建时间，新任务状态为未完成
    async fn insert(&self, task: NewTask) -> Result<Task>;

    /// 更新第一条满足条件的任务，返回命中条数（0 或 1）
    async fn update_one(&self, filter: &TaskFilter, update: &TaskUpdate) -> Result<u64>;

    /// 删除第一条满足条件的任务，返回删除条数（0 或 1）
    async fn delete_one(&self, filter: &TaskFilter) -> Result<u64>;

    /// 存储可用性检查
    async fn ping(&self) -> Result<()>;
}

/// 用户仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// 插入用户，用户名重复时返回 `TodoError::AlreadyExists`
    async fn insert(&self, user: NewUser) -> Result<User>;

    async fn ping(&self) -> Result<()>;
}

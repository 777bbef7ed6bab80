//! 内存仓储
//!
//! 使用 DashMap 实现的并发内存存储，适用于开发和测试环境，进程退出即丢失。

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use todo_shared::error::{Result, TodoError};
use uuid::Uuid;

use super::traits::{TaskRepositoryTrait, UserRepositoryTrait};
use crate::models::{NewTask, NewUser, Task, TaskFilter, TaskUpdate, User};

/// 内存任务仓储
#[derive(Debug, Default)]
pub struct MemoryTaskRepository {
    tasks: DashMap<Uuid, Task>,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取任务总数
    pub fn count(&self) -> usize {
        self.tasks.len()
    }

    /// 找到第一条匹配任务的 id
    ///
    /// 先收集 id 再释放迭代器，避免持有分片读锁时再获取写锁
    fn first_match(&self, filter: &TaskFilter) -> Option<Uuid> {
        self.tasks
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| (entry.created_at, *entry.key()))
            .min()
            .map(|(_, id)| id)
    }
}

#[async_trait]
impl TaskRepositoryTrait for MemoryTaskRepository {
    async fn find(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(tasks)
    }

    async fn insert(&self, task: NewTask) -> Result<Task> {
        let task = Task {
            id: Uuid::new_v4(),
            owner_id: task.owner_id,
            title: task.title,
            status: false,
            created_at: Utc::now(),
        };
        self.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update_one(&self, filter: &TaskFilter, update: &TaskUpdate) -> Result<u64> {
        let Some(id) = self.first_match(filter) else {
            return Ok(0);
        };

        match self.tasks.get_mut(&id) {
            // 两次加锁之间可能被并发删除或修改，重新校验条件
            Some(mut task) if filter.matches(&task) => {
                update.apply(&mut task);
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn delete_one(&self, filter: &TaskFilter) -> Result<u64> {
        let Some(id) = self.first_match(filter) else {
            return Ok(0);
        };

        Ok(self
            .tasks
            .remove_if(&id, |_, task| filter.matches(task))
            .map_or(0, |_| 1))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// 内存用户仓储，以用户名为键保证唯一
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: DashMap<String, User>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepositoryTrait for MemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.users.get(username).map(|u| u.value().clone()))
    }

    async fn insert(&self, user: NewUser) -> Result<User> {
        match self.users.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(TodoError::AlreadyExists {
                entity: "User".to_string(),
                field: "username".to_string(),
                value: user.username,
            }),
            Entry::Vacant(slot) => {
                let created = User {
                    id: Uuid::new_v4(),
                    username: user.username,
                    password_hash: user.password_hash,
                    created_at: Utc::now(),
                };
                slot.insert(created.clone());
                Ok(created)
            }
        }
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_task(owner: Uuid, title: &str) -> NewTask {
        NewTask {
            owner_id: Some(owner),
            title: title.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_stamps_fields() {
        let repo = MemoryTaskRepository::new();
        let owner = Uuid::new_v4();

        let task = repo.insert(new_task(owner, "write report")).await.unwrap();

        assert_eq!(task.owner_id, Some(owner));
        assert_eq!(task.title, "write report");
        assert!(!task.status);
        assert_eq!(repo.count(), 1);
    }

    #[tokio::test]
    async fn test_find_filters_by_owner() {
        let repo = MemoryTaskRepository::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        repo.insert(new_task(alice, "a1")).await.unwrap();
        repo.insert(new_task(bob, "b1")).await.unwrap();
        repo.insert(new_task(alice, "a2")).await.unwrap();

        let tasks = repo.find(&TaskFilter::owned_by(alice)).await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.owner_id == Some(alice)));

        let all = repo.find(&TaskFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_update_one_respects_owner() {
        let repo = MemoryTaskRepository::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let task = repo.insert(new_task(alice, "a1")).await.unwrap();
        let update = TaskUpdate { status: Some(true) };

        let matched = repo
            .update_one(&TaskFilter::owned_task(task.id, bob), &update)
            .await
            .unwrap();
        assert_eq!(matched, 0);

        let matched = repo
            .update_one(&TaskFilter::owned_task(task.id, alice), &update)
            .await
            .unwrap();
        assert_eq!(matched, 1);

        let stored = repo.find(&TaskFilter::owned_by(alice)).await.unwrap();
        assert!(stored[0].status);
    }

    #[tokio::test]
    async fn test_delete_one() {
        let repo = MemoryTaskRepository::new();
        let alice = Uuid::new_v4();
        let task = repo.insert(new_task(alice, "a1")).await.unwrap();

        let missing = TaskFilter::owned_task(Uuid::new_v4(), alice);
        assert_eq!(repo.delete_one(&missing).await.unwrap(), 0);
        assert_eq!(repo.count(), 1);

        let filter = TaskFilter::owned_task(task.id, alice);
        assert_eq!(repo.delete_one(&filter).await.unwrap(), 1);
        assert_eq!(repo.delete_one(&filter).await.unwrap(), 0);
        assert_eq!(repo.count(), 0);
    }

    #[tokio::test]
    async fn test_delete_one_removes_only_one() {
        let repo = MemoryTaskRepository::new();
        let alice = Uuid::new_v4();
        repo.insert(new_task(alice, "a1")).await.unwrap();
        repo.insert(new_task(alice, "a2")).await.unwrap();

        assert_eq!(repo.delete_one(&TaskFilter::owned_by(alice)).await.unwrap(), 1);
        assert_eq!(repo.count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let repo = MemoryUserRepository::new();
        let new_user = NewUser {
            username: "alice".to_string(),
            password_hash: "$2b$04$hash".to_string(),
        };

        let created = repo.insert(new_user.clone()).await.unwrap();
        let err = repo.insert(new_user).await.unwrap_err();
        assert!(matches!(err, TodoError::AlreadyExists { .. }));

        let found = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(repo.find_by_username("bob").await.unwrap().is_none());
    }
}

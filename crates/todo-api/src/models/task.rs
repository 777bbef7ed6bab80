//! 任务实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 待办任务
///
/// `created_at` 对外序列化为 `date`，与既有客户端保持兼容。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    /// 任务所有者，未启用认证时创建的任务为空
    pub owner_id: Option<Uuid>,
    pub title: String,
    /// 是否已完成
    pub status: bool,
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
}

/// 新建任务参数，id 与创建时间由存储层生成
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub owner_id: Option<Uuid>,
    pub title: String,
}

/// 任务查询条件，字段为空表示不过滤
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TaskFilter {
    pub id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
}

impl TaskFilter {
    /// 按所有者过滤
    pub fn owned_by(owner_id: Uuid) -> Self {
        Self {
            id: None,
            owner_id: Some(owner_id),
        }
    }

    /// 限定为某个所有者的指定任务
    pub fn owned_task(id: Uuid, owner_id: Uuid) -> Self {
        Self {
            id: Some(id),
            owner_id: Some(owner_id),
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.id.is_none_or(|id| task.id == id)
            && self.owner_id.is_none_or(|owner| task.owner_id == Some(owner))
    }
}

/// 任务更新内容，字段为空表示保持不变
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TaskUpdate {
    pub status: Option<bool>,
}

impl TaskUpdate {
    pub fn apply(&self, task: &mut Task) {
        if let Some(status) = self.status {
            task.status = status;
        }
    }
}

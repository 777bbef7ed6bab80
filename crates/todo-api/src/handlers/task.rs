//! 任务处理器
//!
//! 所有操作都限定在当前用户名下，其他用户的任务表现为不存在

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{CreateTaskRequest, MessageResponse, UpdateTaskRequest};
use crate::error::{ApiError, Result};
use crate::extract::ApiJson;
use crate::middleware::AuthenticatedUser;
use crate::models::{NewTask, Task, TaskFilter, TaskUpdate};
use crate::state::AppState;

/// 路径中的任务 ID 不是合法 UUID 时视为任务不存在
fn parse_task_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::TaskNotFound)
}

/// 列出当前用户的全部任务
///
/// GET /list-all-todo
#[instrument(skip(state))]
pub async fn list_tasks(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Task>>> {
    let tasks = state.tasks.find(&TaskFilter::owned_by(user.user_id)).await?;
    Ok(Json(tasks))
}

/// 创建任务
///
/// POST /create-task
#[instrument(skip(state, req))]
pub async fn create_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    req.validate()?;

    let task = state
        .tasks
        .insert(NewTask {
            owner_id: Some(user.user_id),
            title: req.title,
        })
        .await?;

    info!(task_id = %task.id, "Task created");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Task created successfully")),
    ))
}

/// 更新任务完成状态
///
/// PUT /update-task/{id}
#[instrument(skip(state, req))]
pub async fn update_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> Result<Json<MessageResponse>> {
    let id = parse_task_id(&id)?;
    let update = TaskUpdate {
        status: Some(req.status),
    };

    let matched = state
        .tasks
        .update_one(&TaskFilter::owned_task(id, user.user_id), &update)
        .await?;
    if matched == 0 {
        return Err(ApiError::TaskNotFound);
    }

    Ok(Json(MessageResponse::new("Task updated")))
}

/// 删除任务
///
/// DELETE /delete-task/{id}
#[instrument(skip(state))]
pub async fn delete_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id = parse_task_id(&id)?;

    let deleted = state
        .tasks
        .delete_one(&TaskFilter::owned_task(id, user.user_id))
        .await?;
    if deleted == 0 {
        return Err(ApiError::TaskNotFound);
    }

    info!(task_id = %id, "Task deleted");
    Ok(Json(MessageResponse::new("deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::auth::{CredentialHasher, TokenManager};
    use crate::repository::{MemoryUserRepository, MockTaskRepositoryTrait};

    fn state_with(tasks: MockTaskRepositoryTrait) -> AppState {
        AppState::new(
            Arc::new(tasks),
            Arc::new(MemoryUserRepository::new()),
            CredentialHasher::new(4).unwrap(),
            Arc::new(TokenManager::new("handler-test-secret")),
        )
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_caller() {
        let caller = Uuid::new_v4();
        let mut tasks = MockTaskRepositoryTrait::new();
        tasks
            .expect_find()
            .withf(move |filter| *filter == TaskFilter::owned_by(caller))
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let Json(list) = list_tasks(State(state_with(tasks)), AuthenticatedUser { user_id: caller })
            .await
            .unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn test_create_stamps_owner() {
        let caller = Uuid::new_v4();
        let mut tasks = MockTaskRepositoryTrait::new();
        tasks
            .expect_insert()
            .withf(move |new| new.owner_id == Some(caller) && new.title == "write report")
            .times(1)
            .returning(|new| {
                Ok(Task {
                    id: Uuid::new_v4(),
                    owner_id: new.owner_id,
                    title: new.title,
                    status: false,
                    created_at: chrono::Utc::now(),
                })
            });

        let (status, Json(body)) = create_task(
            State(state_with(tasks)),
            AuthenticatedUser { user_id: caller },
            ApiJson(CreateTaskRequest {
                title: "write report".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.message, "Task created successfully");
    }

    #[tokio::test]
    async fn test_update_unmatched_is_task_not_found() {
        let caller = Uuid::new_v4();
        let task_id = Uuid::new_v4();
        let mut tasks = MockTaskRepositoryTrait::new();
        tasks
            .expect_update_one()
            .withf(move |filter, update| {
                *filter == TaskFilter::owned_task(task_id, caller) && update.status == Some(true)
            })
            .returning(|_, _| Ok(0));

        let err = update_task(
            State(state_with(tasks)),
            AuthenticatedUser { user_id: caller },
            Path(task_id.to_string()),
            ApiJson(UpdateTaskRequest { status: true }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::TaskNotFound));
    }

    #[tokio::test]
    async fn test_invalid_id_never_reaches_store() {
        let mut tasks = MockTaskRepositoryTrait::new();
        tasks.expect_delete_one().never();

        let err = delete_task(
            State(state_with(tasks)),
            AuthenticatedUser {
                user_id: Uuid::new_v4(),
            },
            Path("not-a-uuid".to_string()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::TaskNotFound));
    }

    #[tokio::test]
    async fn test_delete_matched() {
        let mut tasks = MockTaskRepositoryTrait::new();
        tasks.expect_delete_one().times(1).returning(|_| Ok(1));

        let Json(body) = delete_task(
            State(state_with(tasks)),
            AuthenticatedUser {
                user_id: Uuid::new_v4(),
            },
            Path(Uuid::new_v4().to_string()),
        )
        .await
        .unwrap();
        assert_eq!(body.message, "deleted successfully");
    }
}

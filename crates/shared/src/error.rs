//! 统一错误处理模块
//!
//! 定义存储层与基础设施共享的错误类型，使用 thiserror 提供良好的错误信息。

use thiserror::Error;

/// 系统错误类型
#[derive(Debug, Error)]
pub enum TodoError {
    // ==================== 数据库错误 ====================
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("记录已存在: {entity} {field}={value}")]
    AlreadyExists {
        entity: String,
        field: String,
        value: String,
    },

    // ==================== 通用错误 ====================
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, TodoError>;

impl TodoError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::AlreadyExists { .. } => "ALREADY_EXISTS",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 将 sqlx 错误中的唯一约束冲突转换为 AlreadyExists
    pub fn from_unique_violation(
        err: sqlx::Error,
        entity: &str,
        field: &str,
        value: &str,
    ) -> Self {
        let is_unique = err
            .as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false);

        if is_unique {
            Self::AlreadyExists {
                entity: entity.to_string(),
                field: field.to_string(),
                value: value.to_string(),
            }
        } else {
            Self::Database(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = TodoError::AlreadyExists {
            entity: "User".to_string(),
            field: "username".to_string(),
            value: "alice".to_string(),
        };
        assert_eq!(err.code(), "ALREADY_EXISTS");
        assert_eq!(TodoError::Internal("x".into()).code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_non_database_error_is_not_unique_violation() {
        let err = TodoError::from_unique_violation(sqlx::Error::PoolTimedOut, "User", "username", "alice");
        assert!(matches!(err, TodoError::Database(_)));
    }

    #[test]
    fn test_already_exists_message() {
        let err = TodoError::AlreadyExists {
            entity: "User".to_string(),
            field: "username".to_string(),
            value: "alice".to_string(),
        };
        assert_eq!(err.to_string(), "记录已存在: User username=alice");
    }
}

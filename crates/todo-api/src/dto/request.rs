//! 请求 DTO 定义
//!
//! 只做存在性校验；凭证类请求的 Debug 输出会隐去密码

use serde::Deserialize;
use validator::Validate;

/// 注册请求
#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// 登录请求
#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// 创建任务请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
}

/// 更新任务状态请求
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub status: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"username":"alice","password":"s3cret"}"#).unwrap();
        let printed = format!("{:?}", req);
        assert!(printed.contains("alice"));
        assert!(!printed.contains("s3cret"));

        let req: LoginRequest =
            serde_json::from_str(r#"{"username":"alice","password":"s3cret"}"#).unwrap();
        assert!(!format!("{:?}", req).contains("s3cret"));
    }

    #[test]
    fn test_empty_fields_fail_validation() {
        let req = RegisterRequest {
            username: String::new(),
            password: "x".to_string(),
        };
        assert!(req.validate().is_err());

        let req = CreateTaskRequest {
            title: String::new(),
        };
        assert!(req.validate().is_err());
    }
}

//! 业务服务层
//!
//! 编排仓储、密码哈希与 Token 签发，处理器只负责请求解析和响应组装

mod auth_service;

pub use auth_service::AuthService;

//! 待办事项服务
//!
//! 提供用户注册、登录与按用户隔离的任务管理 REST API。
//!
//! ## 请求流程
//!
//! - 公开路由：`/register`、`/login`、`/health`、`/ready`
//! - 任务路由先经过认证闸门，闸门把 Token 解析出的用户 ID 注入请求扩展，
//!   处理器据此只操作该用户的任务
//!
//! 存储后端（内存或 PostgreSQL）在启动时选定，处理器只依赖仓储 trait。

pub mod auth;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;

pub use error::{ApiError, Result};
pub use state::AppState;

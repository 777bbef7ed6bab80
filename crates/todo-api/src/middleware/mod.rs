//! 中间件模块
//!
//! 提供认证闸门中间件与身份提取器

mod auth;

pub use auth::{AuthenticatedUser, GateRejection, auth_middleware, authenticate};

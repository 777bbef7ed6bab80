//! 认证模块
//!
//! 提供密码哈希、Token 签发与验证功能

mod password;
mod token;

pub use password::{
    CredentialHasher, MAX_COST, MAX_PASSWORD_BYTES, MIN_COST, PasswordError, hash_password,
    verify_password,
};
pub use token::{Claims, TokenError, TokenManager, issue_token, resolve_jwt_secret, verify_token};

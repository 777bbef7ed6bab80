//! Token 签发与验证
//!
//! Token 为 HS256 签名的 JWT，载荷只包含用户 ID 和签发时间。
//! 不携带过期时间，持有者在客户端丢弃前一直有效。

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use todo_shared::config::{AuthConfig, DEV_JWT_SECRET};
use tracing::warn;
use uuid::Uuid;

/// Token 处理错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Token 签名密钥未配置")]
    MissingSecret,
    #[error("Token 格式无效")]
    Malformed,
    #[error("Token 签名无效")]
    InvalidSignature,
    #[error("Token 处理失败: {0}")]
    Internal(String),
}

/// JWT Claims（Token 载荷）
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// 用户 ID
    pub sub: String,
    /// 签发时间
    pub iat: i64,
}

/// Token 管理器
///
/// 启动时根据签名密钥构建一次，之后只读共享。
#[derive(Clone)]
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    has_secret: bool,
}

impl TokenManager {
    /// 创建 Token 管理器，空密钥视为未配置
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // 载荷不含 exp，关闭默认的过期校验
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_aud = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            has_secret: !secret.is_empty(),
        }
    }

    /// 为用户签发 Token
    pub fn issue(&self, user_id: Uuid) -> Result<String, TokenError> {
        if !self.has_secret {
            return Err(TokenError::MissingSecret);
        }

        let claims = Claims {
            sub: user_id.to_string(),
            iat: Utc::now().timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Internal(format!("JWT 生成失败: {}", e)))
    }

    /// 验证 Token 并返回其中的用户 ID
    ///
    /// 签名通过即接受，不做过期检查。
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        if !self.has_secret {
            return Err(TokenError::MissingSecret);
        }

        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(classify_error)?;

        Uuid::parse_str(&token_data.claims.sub).map_err(|_| TokenError::Malformed)
    }
}

/// 将 jsonwebtoken 错误归类
fn classify_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        // 声明了其他算法的 Token 不是本服务签发的
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::MissingRequiredClaim(_) => TokenError::Malformed,
        _ => TokenError::Internal(err.to_string()),
    }
}

/// 使用指定密钥签发 Token
pub fn issue_token(user_id: Uuid, secret: &str) -> Result<String, TokenError> {
    TokenManager::new(secret).issue(user_id)
}

/// 使用指定密钥验证 Token
pub fn verify_token(token: &str, secret: &str) -> Result<Uuid, TokenError> {
    TokenManager::new(secret).verify(token)
}

/// 确定启动时使用的签名密钥
///
/// 生产环境必须显式配置密钥；开发环境未配置时使用内置密钥并告警。
pub fn resolve_jwt_secret(auth: &AuthConfig, production: bool) -> Result<String, TokenError> {
    if !auth.jwt_secret.is_empty() {
        return Ok(auth.jwt_secret.clone());
    }
    if production {
        return Err(TokenError::MissingSecret);
    }
    warn!("Using default JWT secret - set TODO_JWT_SECRET for production");
    Ok(DEV_JWT_SECRET.to_string())
}

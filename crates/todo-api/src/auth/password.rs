//! 密码处理
//!
//! 基于 bcrypt 的加盐慢哈希。哈希串自描述，内含算法版本、工作因子、盐和摘要，
//! 验证时从哈希串中取回盐和工作因子重新计算。
//!
//! bcrypt 只处理前 72 字节（含结尾的 0 字节），超长密码直接拒绝而不是截断，
//! 否则前缀相同的两个密码会互相通过校验。

use std::sync::Arc;

use bcrypt::{BcryptError, non_truncating_hash, non_truncating_verify};

/// bcrypt 允许的最小工作因子
pub const MIN_COST: u32 = 4;
/// bcrypt 允许的最大工作因子
pub const MAX_COST: u32 = 31;
/// 可接受的最大密码字节数
pub const MAX_PASSWORD_BYTES: usize = 71;

/// 用户不存在时参与校验的占位密码
const DECOY_PASSWORD: &str = "todo-api-decoy-password";

/// 密码处理错误
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("bcrypt 工作因子 {0} 超出范围 4..=31")]
    InvalidCost(u32),
    #[error("password must be at most 71 bytes")]
    TooLong,
    #[error("密码哈希失败: {0}")]
    Hash(BcryptError),
}

impl From<BcryptError> for PasswordError {
    fn from(err: BcryptError) -> Self {
        match err {
            BcryptError::Truncation(_) => Self::TooLong,
            other => Self::Hash(other),
        }
    }
}

/// 凭证哈希器
///
/// 持有工作因子和一个同工作因子的占位哈希。用户不存在时对占位哈希执行一次校验，
/// 使两种登录失败的耗时一致。克隆只复制引用计数。
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    cost: u32,
    decoy_hash: Arc<str>,
}

impl CredentialHasher {
    /// 创建哈希器，工作因子超出 bcrypt 范围时返回错误
    ///
    /// 会同步计算一次占位哈希，应在启动阶段调用。
    pub fn new(cost: u32) -> Result<Self, PasswordError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(PasswordError::InvalidCost(cost));
        }
        let decoy_hash = hash_password(DECOY_PASSWORD, cost)?;
        Ok(Self {
            cost,
            decoy_hash: decoy_hash.into(),
        })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// 对密码进行哈希处理，每次调用生成新的随机盐
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        hash_password(plaintext, self.cost)
    }

    /// 验证密码
    pub fn verify(&self, plaintext: &str, hash_string: &str) -> bool {
        verify_password(plaintext, hash_string)
    }

    /// 对占位哈希执行一次完整校验，结果总是 false
    pub fn verify_decoy(&self, plaintext: &str) -> bool {
        std::hint::black_box(verify_password(plaintext, &self.decoy_hash));
        false
    }
}

/// 使用指定工作因子生成密码哈希，超过 71 字节的密码返回 `TooLong`
pub fn hash_password(plaintext: &str, cost: u32) -> Result<String, PasswordError> {
    Ok(non_truncating_hash(plaintext, cost)?)
}

/// 比较明文密码与存储的哈希值
///
/// 摘要比较为常量时间；哈希串格式错误或密码超长时返回 false，不向上抛错。
pub fn verify_password(plaintext: &str, hash_string: &str) -> bool {
    match non_truncating_verify(plaintext, hash_string) {
        Ok(matched) => matched,
        Err(e) => {
            tracing::debug!(error = %e, "Password could not be checked against stored hash");
            false
        }
    }
}

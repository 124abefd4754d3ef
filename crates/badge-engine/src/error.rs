//! 徽章引擎错误类型
//!
//! 区分存储/序列化等系统错误与徽章不存在等业务错误

use thiserror::Error;

/// 徽章引擎错误类型
#[derive(Debug, Error)]
pub enum BadgeError {
    // === 业务错误 ===
    #[error("徽章不存在: {0}")]
    BadgeNotFound(String),

    #[error("参数校验失败: {0}")]
    Validation(String),

    // === 存储错误 ===
    #[error("存储错误: {0}")]
    Store(String),

    #[error("Redis 错误: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("事务冲突，已重试 {attempts} 次: path={path}")]
    TransactionConflict { path: String, attempts: u32 },

    #[error("徽章写入失败: user_id={user_id}, badge_ids={badge_ids:?}, 原因: {reason}")]
    CommitFailed {
        user_id: String,
        badge_ids: Vec<String>,
        reason: String,
    },
}

/// 徽章引擎 Result 类型别名
pub type Result<T> = std::result::Result<T, BadgeError>;

impl BadgeError {
    /// 检查是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Store(_) | Self::Redis(_) | Self::TransactionConflict { .. }
        )
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        matches!(self, Self::BadgeNotFound(_) | Self::Validation(_))
    }

    /// 获取错误码
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadgeNotFound(_) => "BADGE_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Store(_) => "STORE_ERROR",
            Self::Redis(_) => "REDIS_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::TransactionConflict { .. } => "TRANSACTION_CONFLICT",
            Self::CommitFailed { .. } => "COMMIT_FAILED",
        }
    }
}

//! 共享键值存储抽象
//!
//! 引擎只依赖四个原语：按路径读取、写入、删除，以及带冲突重试的原子事务。
//! 事务回调接收当前值并返回新值（`None` 表示删除），可能因冲突被多次调用，
//! 因此必须是无副作用的纯函数。

pub mod memory_store;
pub mod redis_store;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{BadgeError, Result};
use crate::models::BingeTimeframe;

pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;

/// 事务回调
pub type UpdateFn<'a> = &'a (dyn Fn(Option<Value>) -> Option<Value> + Send + Sync);

/// 键值存储接口
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// 读取路径上的值，不存在时返回 None
    async fn get(&self, path: &str) -> Result<Option<Value>>;

    /// 覆盖写入
    async fn set(&self, path: &str, value: Value) -> Result<()>;

    /// 原子读-改-写，冲突时自动重试，返回最终落盘的值
    async fn transaction(&self, path: &str, update: UpdateFn<'_>) -> Result<Option<Value>>;

    /// 删除路径
    async fn remove(&self, path: &str) -> Result<()>;
}

/// 类型化读取辅助
#[async_trait]
pub trait KeyValueStoreExt: KeyValueStore {
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        match self.get(path).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}

/// 存储路径生成器
///
/// 所有徽章相关数据都挂在 `users/{uid}` 下
pub struct StorePath;

impl StorePath {
    /// 校验用户 ID 可以安全地拼入路径
    pub fn validate_user_id(user_id: &str) -> Result<()> {
        if user_id.is_empty() || user_id.contains('/') || user_id.trim() != user_id {
            return Err(BadgeError::Validation(format!(
                "无效的用户 ID: {:?}",
                user_id
            )));
        }
        Ok(())
    }

    pub fn earned_badges(user_id: &str) -> String {
        format!("users/{}/badges", user_id)
    }

    pub fn counter(user_id: &str, name: &str) -> String {
        format!("users/{}/badgeCounters/{}", user_id, name)
    }

    pub fn streak(user_id: &str) -> String {
        Self::counter(user_id, "streak")
    }

    pub fn marathon_weeks(user_id: &str) -> String {
        Self::counter(user_id, "marathonWeeks")
    }

    pub fn binge_window(user_id: &str, timeframe: BingeTimeframe) -> String {
        format!(
            "users/{}/badgeCounters/bingeWindows/{}",
            user_id,
            timeframe.key()
        )
    }

    pub fn social_counter(user_id: &str, name: &str) -> String {
        format!("users/{}/badgeCounters/social/{}", user_id, name)
    }

    pub fn series(user_id: &str) -> String {
        format!("users/{}/series", user_id)
    }

    pub fn movies(user_id: &str) -> String {
        format!("users/{}/movies", user_id)
    }

    pub fn friends(user_id: &str) -> String {
        format!("users/{}/friends", user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_generation() {
        assert_eq!(StorePath::earned_badges("u1"), "users/u1/badges");
        assert_eq!(
            StorePath::binge_window("u1", BingeTimeframe::TenHours),
            "users/u1/badgeCounters/bingeWindows/10h"
        );
        assert_eq!(
            StorePath::social_counter("u1", "total"),
            "users/u1/badgeCounters/social/total"
        );
        assert_eq!(StorePath::streak("u1"), "users/u1/badgeCounters/streak");
    }

    #[test]
    fn test_validate_user_id() {
        assert!(StorePath::validate_user_id("abc123").is_ok());
        assert!(StorePath::validate_user_id("").is_err());
        assert!(StorePath::validate_user_id("a/b").is_err());
        assert!(StorePath::validate_user_id(" a").is_err());
    }
}

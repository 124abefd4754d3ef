//! Redis 存储
//!
//! 每个路径对应一个 Redis 字符串键（`{key_prefix}{path}`），值为 JSON。
//! 事务采用乐观并发：先 GET 当前值，在本地计算新值，再通过 Lua 脚本做
//! compare-and-swap；若期间值被其他客户端修改则重新读取并重试。

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, Script};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use badge_shared::config::RedisConfig;

use super::{KeyValueStore, UpdateFn};
use crate::error::{BadgeError, Result};

/// CAS 脚本
///
/// ARGV[1]: 期望当前值存在（"1"）或不存在（"0"）
/// ARGV[2]: 期望的当前原始值
/// ARGV[3]: 写入（"1"）或删除（"0"）
/// ARGV[4]: 新值
const CAS_SCRIPT: &str = r#"
local current = redis.call('GET', KEYS[1])
if ARGV[1] == '1' then
    if current ~= ARGV[2] then
        return 0
    end
elseif current then
    return 0
end
if ARGV[3] == '1' then
    redis.call('SET', KEYS[1], ARGV[4])
else
    redis.call('DEL', KEYS[1])
end
return 1
"#;

/// Redis 键值存储
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
    key_prefix: String,
    max_attempts: u32,
    cas: Script,
}

impl RedisStore {
    /// 创建 Redis 存储
    pub fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;
        info!(key_prefix = %config.key_prefix, "Redis store created");
        Ok(Self {
            client,
            key_prefix: config.key_prefix.clone(),
            max_attempts: config.max_transaction_attempts.max(1),
            cas: Script::new(CAS_SCRIPT),
        })
    }

    async fn get_conn(&self) -> Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(BadgeError::from)
    }

    fn key(&self, path: &str) -> String {
        format!("{}{}", self.key_prefix, path)
    }

    /// 健康检查
    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.get_conn().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(BadgeError::from)
    }

    fn parse(raw: Option<&str>) -> Result<Option<Value>> {
        raw.map(serde_json::from_str)
            .transpose()
            .map_err(BadgeError::from)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    #[instrument(skip(self))]
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        let mut conn = self.get_conn().await?;
        let raw: Option<String> = conn.get(self.key(path)).await?;
        Self::parse(raw.as_deref())
    }

    #[instrument(skip(self, value))]
    async fn set(&self, path: &str, value: Value) -> Result<()> {
        let mut conn = self.get_conn().await?;
        let serialized = serde_json::to_string(&value)?;
        let _: () = conn.set(self.key(path), serialized).await?;
        Ok(())
    }

    #[instrument(skip(self, update))]
    async fn transaction(&self, path: &str, update: UpdateFn<'_>) -> Result<Option<Value>> {
        let key = self.key(path);
        let mut conn = self.get_conn().await?;

        for attempt in 1..=self.max_attempts {
            let raw: Option<String> = conn.get(&key).await?;
            let current = Self::parse(raw.as_deref())?;
            let next = update(current.clone());

            if next == current {
                return Ok(next);
            }

            let serialized = next.as_ref().map(serde_json::to_string).transpose()?;
            let swapped: i32 = self
                .cas
                .key(&key)
                .arg(if raw.is_some() { "1" } else { "0" })
                .arg(raw.as_deref().unwrap_or_default())
                .arg(if serialized.is_some() { "1" } else { "0" })
                .arg(serialized.as_deref().unwrap_or_default())
                .invoke_async(&mut conn)
                .await?;

            if swapped == 1 {
                return Ok(next);
            }
            debug!(path = %path, attempt, "事务冲突，重新读取后重试");
        }

        warn!(path = %path, attempts = self.max_attempts, "事务冲突次数超过上限");
        Err(BadgeError::TransactionConflict {
            path: path.to_string(),
            attempts: self.max_attempts,
        })
    }

    #[instrument(skip(self))]
    async fn remove(&self, path: &str) -> Result<()> {
        let mut conn = self.get_conn().await?;
        let _: () = conn.del(self.key(path)).await?;
        Ok(())
    }
}

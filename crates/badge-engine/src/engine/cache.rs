//! 引擎内缓存
//!
//! 单值 TTL 缓存，过期判断使用注入的时钟，读写由 `tokio::sync::RwLock` 保护

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Cached<T> {
    value: T,
    cached_at: DateTime<Utc>,
}

/// 带过期时间的单值缓存
#[derive(Debug)]
pub struct TtlCache<T> {
    slot: RwLock<Option<Cached<T>>>,
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: RwLock::new(None),
            ttl,
        }
    }

    /// 读取未过期的值
    pub async fn get(&self, now: DateTime<Utc>) -> Option<T> {
        let slot = self.slot.read().await;
        slot.as_ref()
            .filter(|cached| now - cached.cached_at < self.ttl)
            .map(|cached| cached.value.clone())
    }

    pub async fn put(&self, value: T, now: DateTime<Utc>) {
        *self.slot.write().await = Some(Cached {
            value,
            cached_at: now,
        });
    }

    /// 原地修改已缓存的值，不刷新缓存时间；缓存为空时不做任何事
    pub async fn update(&self, f: impl FnOnce(&mut T)) {
        if let Some(cached) = self.slot.write().await.as_mut() {
            f(&mut cached.value);
        }
    }

    pub async fn invalidate(&self) {
        *self.slot.write().await = None;
    }
}

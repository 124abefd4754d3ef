//! 内存存储
//!
//! 使用 DashMap 实现的键值存储，适用于测试和本地开发。
//! 事务在分片锁内完成读-改-写，天然原子，无需冲突重试。

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::Value;

use super::{KeyValueStore, UpdateFn};
use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<DashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前存储的路径数量
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 检查是否存在指定路径
    pub fn contains(&self, path: &str) -> bool {
        self.data.contains_key(path)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        Ok(self.data.get(path).map(|v| v.clone()))
    }

    async fn set(&self, path: &str, value: Value) -> Result<()> {
        self.data.insert(path.to_string(), value);
        Ok(())
    }

    async fn transaction(&self, path: &str, update: UpdateFn<'_>) -> Result<Option<Value>> {
        let resolved = match self.data.entry(path.to_string()) {
            Entry::Occupied(mut entry) => match update(Some(entry.get().clone())) {
                Some(next) => {
                    entry.insert(next.clone());
                    Some(next)
                }
                None => {
                    entry.remove();
                    None
                }
            },
            Entry::Vacant(entry) => match update(None) {
                Some(next) => {
                    entry.insert(next.clone());
                    Some(next)
                }
                None => None,
            },
        };
        Ok(resolved)
    }

    async fn remove(&self, path: &str) -> Result<()> {
        self.data.remove(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_store_crud() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a/b").await.unwrap(), None);

        store.set("a/b", json!(1)).await.unwrap();
        assert_eq!(store.get("a/b").await.unwrap(), Some(json!(1)));

        store.remove("a/b").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_transaction_create_update_delete() {
        let store = MemoryStore::new();
        let incr = |current: Option<Value>| {
            Some(json!(current.and_then(|v| v.as_u64()).unwrap_or(0) + 1))
        };

        assert_eq!(store.transaction("n", &incr).await.unwrap(), Some(json!(1)));
        assert_eq!(store.transaction("n", &incr).await.unwrap(), Some(json!(2)));

        let delete = |_: Option<Value>| None;
        assert_eq!(store.transaction("n", &delete).await.unwrap(), None);
        assert!(!store.contains("n"));
    }

    #[tokio::test]
    async fn test_concurrent_transactions_do_not_lose_updates() {
        let store = MemoryStore::new();
        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let incr = |current: Option<Value>| {
                    Some(json!(current.and_then(|v| v.as_u64()).unwrap_or(0) + 1))
                };
                store.transaction("counter", &incr).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.get("counter").await.unwrap(), Some(json!(50)));
    }
}

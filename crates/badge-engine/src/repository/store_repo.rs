//! 基于共享存储的仓储实现
//!
//! 观看内容与好友关系与计数器存放在同一个存储中：
//! - `users/{uid}/series`: 剧集 ID -> 剧集记录
//! - `users/{uid}/movies`: 电影 ID -> 电影记录
//! - `users/{uid}/friends`: 好友 ID -> 任意值

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument;

use super::{ContentRepository, SocialGraphRepository};
use crate::error::Result;
use crate::models::{MovieRecord, SeriesRecord, UserContent};
use crate::store::{KeyValueStore, KeyValueStoreExt, StorePath};

/// 从存储读取观看内容
pub struct StoreContentRepository {
    store: Arc<dyn KeyValueStore>,
}

impl StoreContentRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn load_map<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let map: Option<BTreeMap<String, T>> = self.store.get_json(path).await?;
        Ok(map.map(|m| m.into_values().collect()).unwrap_or_default())
    }
}

#[async_trait]
impl ContentRepository for StoreContentRepository {
    #[instrument(skip(self))]
    async fn load_user_content(&self, user_id: &str) -> Result<UserContent> {
        let series: Vec<SeriesRecord> = self.load_map(&StorePath::series(user_id)).await?;
        let movies: Vec<MovieRecord> = self.load_map(&StorePath::movies(user_id)).await?;
        Ok(UserContent { series, movies })
    }
}

/// 从存储读取好友数量
pub struct StoreSocialGraphRepository {
    store: Arc<dyn KeyValueStore>,
}

impl StoreSocialGraphRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SocialGraphRepository for StoreSocialGraphRepository {
    #[instrument(skip(self))]
    async fn friend_count(&self, user_id: &str) -> Result<u32> {
        let count = match self.store.get(&StorePath::friends(user_id)).await? {
            Some(Value::Object(friends)) => friends.len(),
            Some(Value::Array(friends)) => friends.iter().filter(|f| !f.is_null()).count(),
            _ => 0,
        };
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_load_user_content() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                "users/u1/series",
                json!({
                    "1399": {"id": "1399", "name": "Got", "ratings": {"drama": 5.0}},
                    "1396": {"id": "1396", "seasons": [{"seasonNumber": 1, "episodes": [
                        {"episodeNumber": 1, "watched": true, "watchCount": 2}
                    ]}]}
                }),
            )
            .await
            .unwrap();
        store
            .set("users/u1/movies", json!({"603": {"id": "603"}}))
            .await
            .unwrap();

        let repo = StoreContentRepository::new(store);
        let content = repo.load_user_content("u1").await.unwrap();
        assert_eq!(content.series.len(), 2);
        assert_eq!(content.movies.len(), 1);

        let empty = repo.load_user_content("nobody").await.unwrap();
        assert_eq!(empty, UserContent::default());
    }

    #[tokio::test]
    async fn test_malformed_content_propagates() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("users/u1/series", json!({"1": {"name": "no id"}}))
            .await
            .unwrap();

        let repo = StoreContentRepository::new(store);
        assert!(repo.load_user_content("u1").await.is_err());
    }

    #[tokio::test]
    async fn test_friend_count() {
        let store = Arc::new(MemoryStore::new());
        let repo = StoreSocialGraphRepository::new(store.clone());
        assert_eq!(repo.friend_count("u1").await.unwrap(), 0);

        store
            .set("users/u1/friends", json!({"u2": true, "u3": true}))
            .await
            .unwrap();
        assert_eq!(repo.friend_count("u1").await.unwrap(), 2);
    }
}

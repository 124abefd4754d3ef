//! 命令执行器
//!
//! 把命令行参数转化为引擎与计数器调用，结果以 JSON 返回给 main 输出。

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;
use serde_json::{Value, json};
use tracing::info;

use badge_shared::config::AppConfig;

use super::commands::RecordEvent;
use crate::clock::{Clock, SystemClock};
use crate::engine::{EngineContext, EngineRegistry};
use crate::models::SocialCounterKind;
use crate::repository::{StoreContentRepository, StoreSocialGraphRepository};
use crate::store::{KeyValueStore, RedisStore};

pub struct CommandRunner {
    registry: EngineRegistry,
    clock: Arc<dyn Clock>,
}

impl CommandRunner {
    /// 基于配置中的 Redis 创建执行器
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let store = RedisStore::new(&config.redis).context("创建 Redis 存储失败")?;
        store.health_check().await.context("Redis 连接失败")?;
        info!(url = %config.redis.url, "Redis 已连接");

        Self::with_store(Arc::new(store), Arc::new(SystemClock), config)
    }

    /// 使用任意存储创建执行器
    pub fn with_store(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: &AppConfig,
    ) -> Result<Self> {
        let ctx = EngineContext::new(
            store.clone(),
            Arc::new(StoreContentRepository::new(store.clone())),
            Arc::new(StoreSocialGraphRepository::new(store)),
            clock.clone(),
            &config.engine,
        )
        .context("初始化徽章引擎失败")?;

        Ok(Self {
            registry: EngineRegistry::new(ctx),
            clock,
        })
    }

    pub async fn run_check(&self, user_id: &str) -> Result<Value> {
        let engine = self.registry.engine_for(user_id)?;
        let badges = engine.check_for_new_badges().await?;
        info!(user_id, newly_earned = badges.len(), "徽章检查完成");
        Ok(serde_json::to_value(badges)?)
    }

    pub async fn run_progress(&self, user_id: &str, badge_id: Option<&str>) -> Result<Value> {
        let engine = self.registry.engine_for(user_id)?;
        match badge_id {
            Some(badge_id) => {
                let progress = engine.get_badge_progress(badge_id).await?;
                Ok(serde_json::to_value(progress)?)
            }
            None => Ok(serde_json::to_value(engine.get_all_badge_progress().await?)?),
        }
    }

    pub async fn run_badges(&self, user_id: &str) -> Result<Value> {
        let engine = self.registry.engine_for(user_id)?;
        Ok(serde_json::to_value(engine.get_user_badges().await?)?)
    }

    pub async fn run_recalculate(&self, user_id: &str) -> Result<Value> {
        let engine = self.registry.engine_for(user_id)?;
        Ok(serde_json::to_value(engine.recalculate_all_badges().await?)?)
    }

    pub async fn run_finalize(&self, user_id: &str) -> Result<Value> {
        let counters = self.registry.counters();
        counters.try_finalize_binge_session(user_id).await?;

        let windows = counters.read_binge_windows(user_id).await?;
        let now = self.clock.now();
        let active: Vec<&str> = windows
            .iter()
            .filter(|(_, window)| window.is_session_active(now))
            .map(|(timeframe, _)| timeframe.key())
            .collect();
        Ok(json!({ "userId": user_id, "activeWindows": active }))
    }

    pub async fn run_record(
        &self,
        user_id: &str,
        event: RecordEvent,
        count: u32,
        aired_hours_ago: Option<i64>,
    ) -> Result<Value> {
        let engine = self.registry.engine_for(user_id)?;
        let counters = self.registry.counters();
        let aired_at = aired_hours_ago.map(|hours| self.clock.now() - Duration::hours(hours));

        for _ in 0..count {
            match event {
                RecordEvent::Episode => counters.record_episode_watched(user_id, aired_at).await,
                RecordEvent::FriendRequestSent => {
                    counters
                        .increment_social_counter(user_id, SocialCounterKind::FriendRequestSent)
                        .await
                }
                RecordEvent::FriendRequestAccepted => {
                    counters
                        .increment_social_counter(
                            user_id,
                            SocialCounterKind::FriendRequestAccepted,
                        )
                        .await
                }
                RecordEvent::FriendAdded => {
                    counters
                        .increment_social_counter(user_id, SocialCounterKind::FriendAdded)
                        .await
                }
            }
        }
        engine.invalidate_cache().await;

        let snapshot = counters.read_snapshot(user_id).await?;
        Ok(json!({
            "userId": user_id,
            "quickwatchEpisodes": snapshot.quickwatch_episodes,
            "currentStreak": snapshot.streak.current_streak,
            "bestMarathonWeek": snapshot.best_marathon_week().map(|(week, n)| json!({ "week": week, "count": n })),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::{MemoryStore, StorePath};
    use chrono::{TimeZone, Utc};

    fn runner() -> (CommandRunner, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 4, 10, 12, 0, 0).unwrap());
        let runner =
            CommandRunner::with_store(store.clone(), Arc::new(clock), &AppConfig::default())
                .unwrap();
        (runner, store)
    }

    #[tokio::test]
    async fn test_record_then_check() {
        let (runner, _) = runner();
        let summary = runner
            .run_record("u1", RecordEvent::Episode, 3, Some(1))
            .await
            .unwrap();
        assert_eq!(summary["quickwatchEpisodes"], 3);
        assert_eq!(summary["currentStreak"], 1);
        assert_eq!(summary["bestMarathonWeek"]["count"], 3);

        let earned = runner.run_check("u1").await.unwrap();
        let ids: Vec<_> = earned
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["id"].as_str().unwrap().to_string())
            .collect();
        assert!(ids.contains(&"binge_10h_bronze".to_string()));
        assert!(ids.contains(&"quickwatch_bronze".to_string()));

        let badges = runner.run_badges("u1").await.unwrap();
        assert_eq!(badges.as_array().unwrap().len(), ids.len());
    }

    #[tokio::test]
    async fn test_progress_single_badge() {
        let (runner, store) = runner();
        store
            .set(
                &StorePath::friends("u1"),
                serde_json::json!({ "f1": true, "f2": true }),
            )
            .await
            .unwrap();

        let progress = runner
            .run_progress("u1", Some("social_silver"))
            .await
            .unwrap();
        assert_eq!(progress["current"], 2);
        assert_eq!(progress["total"], 3);

        assert!(runner.run_progress("u1", Some("missing")).await.is_err());
    }

    #[tokio::test]
    async fn test_finalize_reports_active_windows() {
        let (runner, _) = runner();
        runner
            .run_record("u1", RecordEvent::Episode, 1, None)
            .await
            .unwrap();

        let result = runner.run_finalize("u1").await.unwrap();
        assert_eq!(result["activeWindows"], serde_json::json!(["10h", "1d", "2d"]));
    }
}

//! 徽章引擎集成测试
//!
//! 使用内存存储与可拨动时钟，走完"计数器写入 -> 聚合 -> 评估 -> 写入已获得徽章"的完整流程。
//!
//! ## 运行方式
//!
//! ```bash
//! cargo test -p badge-engine --test engine_test
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::json;

use badge_engine::models::BingeTimeframe;
use badge_engine::{
    BadgeEngine, Clock, EngineContext, EngineRegistry, FixedClock, KeyValueStore, MemoryStore,
    StoreContentRepository, StorePath, StoreSocialGraphRepository,
};
use badge_shared::config::EngineConfig;

// ==================== 辅助函数 ====================

/// 2024-04-10 12:00 UTC，周三，ISO 周 2024-W15
fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 10, 12, 0, 0).unwrap()
}

struct Harness {
    store: Arc<MemoryStore>,
    clock: FixedClock,
    registry: EngineRegistry,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = FixedClock::new(start());
        let shared: Arc<dyn KeyValueStore> = store.clone();

        let ctx = EngineContext::new(
            shared.clone(),
            Arc::new(StoreContentRepository::new(shared.clone())),
            Arc::new(StoreSocialGraphRepository::new(shared)),
            Arc::new(clock.clone()),
            &EngineConfig::default(),
        )
        .expect("创建引擎上下文失败");

        Self {
            store,
            clock,
            registry: EngineRegistry::new(ctx),
        }
    }

    fn engine(&self, user_id: &str) -> Arc<BadgeEngine> {
        self.registry.engine_for(user_id).expect("创建引擎失败")
    }

    async fn seed(&self, path: String, value: serde_json::Value) {
        self.store.set(&path, value).await.expect("写入测试数据失败");
    }
}

fn ids(badges: &[badge_engine::EarnedBadge]) -> Vec<&'static str> {
    badges.iter().map(|b| b.id()).collect()
}

// ==================== 测试场景 ====================

/// 10 小时内看 3 集：首次检查获得一次，再次检查为空
#[tokio::test]
async fn test_binge_badge_awarded_exactly_once() {
    let h = Harness::new();
    let counters = h.registry.counters();
    for _ in 0..3 {
        counters.record_binge_episode("u1").await;
        h.clock.advance(Duration::hours(2));
    }

    let engine = h.engine("u1");
    let first = engine.check_for_new_badges().await.unwrap();
    assert_eq!(ids(&first), vec!["binge_10h_bronze"]);
    assert_eq!(
        first[0].detail.as_deref(),
        Some("Watched 3 episodes within 10 hours")
    );

    assert!(engine.check_for_new_badges().await.unwrap().is_empty());

    // 缓存失效后从存储重新读取，依然不会重复授予
    engine.invalidate_cache().await;
    assert!(engine.check_for_new_badges().await.unwrap().is_empty());
    assert!(engine.recalculate_all_badges().await.unwrap().is_empty());
}

/// 窗口内 N 次记录计数为 N，超过窗口时长的间隔后重新从 1 开始
#[tokio::test]
async fn test_binge_window_counts_and_resets() {
    let h = Harness::new();
    let counters = h.registry.counters();

    for _ in 0..5 {
        counters.record_binge_episode("u1").await;
        h.clock.advance(Duration::minutes(90));
    }
    let windows = counters.read_binge_windows("u1").await.unwrap();
    assert_eq!(windows[&BingeTimeframe::TenHours].active_count(h.clock.now()), 5);

    h.clock.advance(Duration::hours(49));
    counters.record_binge_episode("u1").await;
    let windows = counters.read_binge_windows("u1").await.unwrap();
    for timeframe in BingeTimeframe::ALL {
        assert_eq!(windows[&timeframe].active_count(h.clock.now()), 1);
    }
}

/// 窗口过期后进度归零，不保留历史峰值
#[tokio::test]
async fn test_expired_window_progress_is_zero() {
    let h = Harness::new();
    let counters = h.registry.counters();
    for _ in 0..14 {
        counters.record_binge_episode("u1").await;
    }

    let engine = h.engine("u1");
    let progress = engine
        .get_badge_progress("binge_1d_platinum")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(progress.current, 14);
    assert_eq!(progress.session_active, Some(true));

    h.clock.advance(Duration::hours(24));
    let progress = engine
        .get_badge_progress("binge_1d_platinum")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(progress.current, 0);
    assert_eq!(progress.time_remaining, Some(0));
    assert_eq!(progress.session_active, Some(false));
}

/// 历史某周 85 集，本周 0 集，80 集的马拉松徽章依然授予
#[tokio::test]
async fn test_marathon_uses_best_week_ever() {
    let h = Harness::new();
    h.seed(
        StorePath::marathon_weeks("u1"),
        json!({ "2024-W10": 85, "2024-W15": 0 }),
    )
    .await;

    let engine = h.engine("u1");
    let progress = engine
        .get_badge_progress("marathon_platinum")
        .await
        .unwrap()
        .unwrap();
    assert_eq!((progress.current, progress.total), (85, 80));

    let earned = engine.check_for_new_badges().await.unwrap();
    assert_eq!(
        ids(&earned),
        vec![
            "marathon_bronze",
            "marathon_silver",
            "marathon_gold",
            "marathon_platinum"
        ]
    );
}

/// 同一天不变，连续的下一天加一，跳过一天重置为 1
#[tokio::test]
async fn test_streak_progression() {
    let h = Harness::new();
    let counters = h.registry.counters();

    counters.update_streak_counter("u1").await;
    counters.update_streak_counter("u1").await;
    assert_eq!(counters.read_streak("u1").await.unwrap().current_streak, 1);

    for expected in 2..=4 {
        h.clock.advance(Duration::days(1));
        counters.update_streak_counter("u1").await;
        assert_eq!(
            counters.read_streak("u1").await.unwrap().current_streak,
            expected
        );
    }

    h.clock.advance(Duration::days(2));
    counters.update_streak_counter("u1").await;
    assert_eq!(counters.read_streak("u1").await.unwrap().current_streak, 1);
}

/// 最后活跃为昨天、连续 6 天：更新后为 7 天，最后活跃日期为今天
#[tokio::test]
async fn test_streak_continues_from_yesterday() {
    let h = Harness::new();
    h.seed(
        StorePath::streak("u1"),
        json!({ "currentStreak": 6, "lastActivityDate": "2024-04-09" }),
    )
    .await;

    let counters = h.registry.counters();
    counters.update_streak_counter("u1").await;

    let streak = counters.read_streak("u1").await.unwrap();
    assert_eq!(streak.current_streak, 7);
    assert_eq!(
        streak.last_activity_date,
        Some(NaiveDate::from_ymd_opt(2024, 4, 10).unwrap())
    );

    let earned = h.engine("u1").check_for_new_badges().await.unwrap();
    assert_eq!(ids(&earned), vec!["streak_bronze", "streak_silver"]);
}

/// 没有好友时，需要 3 个好友的社交徽章进度为 0/3
#[tokio::test]
async fn test_social_progress_without_friends() {
    let h = Harness::new();
    let progress = h
        .engine("u1")
        .get_badge_progress("social_silver")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(progress.current, 0);
    assert_eq!(progress.total, 3);
    assert_eq!(progress.time_remaining, None);
}

/// 好友变化后需要主动失效缓存才能被引擎观察到
#[tokio::test]
async fn test_friend_change_requires_invalidation() {
    let h = Harness::new();
    let engine = h.engine("u1");
    assert!(engine.check_for_new_badges().await.unwrap().is_empty());

    h.seed(StorePath::friends("u1"), json!({ "f1": true })).await;
    assert!(engine.check_for_new_badges().await.unwrap().is_empty());

    engine.invalidate_cache().await;
    let earned = engine.check_for_new_badges().await.unwrap();
    assert_eq!(ids(&earned), vec!["social_bronze"]);
}

/// 剧集、评分、重温统计来自内容记录
#[tokio::test]
async fn test_content_based_badges() {
    let h = Harness::new();
    let series: serde_json::Map<String, serde_json::Value> = (0..5)
        .map(|i| {
            let id = format!("s{}", i);
            let record = json!({
                "id": id,
                "name": format!("Series {}", i),
                "ratings": { "drama": if i < 3 { 4.0 } else { 0.0 } },
                "seasons": [{
                    "seasonNumber": 1,
                    "episodes": [
                        { "episodeNumber": 1, "watched": true, "watchCount": 2, "aired": true },
                        { "episodeNumber": 2, "watched": true, "watchCount": 1, "aired": true }
                    ]
                }]
            });
            (id, record)
        })
        .collect();
    h.seed(StorePath::series("u1"), serde_json::Value::Object(series))
        .await;

    let movies: serde_json::Map<String, serde_json::Value> = (0..7)
        .map(|i| {
            let id = format!("m{}", i);
            (id.clone(), json!({ "id": id, "ratings": { "action": 3.5 } }))
        })
        .collect();
    h.seed(StorePath::movies("u1"), serde_json::Value::Object(movies))
        .await;

    let engine = h.engine("u1");
    let earned = engine.check_for_new_badges().await.unwrap();
    let earned_ids = ids(&earned);
    // 5 部剧、10 项评分、5 集重温
    assert!(earned_ids.contains(&"series_explorer_bronze"));
    assert!(earned_ids.contains(&"collector_bronze"));
    assert!(earned_ids.contains(&"rewatch_bronze"));

    let explorer = engine
        .get_badge_progress("series_explorer_silver")
        .await
        .unwrap()
        .unwrap();
    assert_eq!((explorer.current, explorer.total), (5, 10));
}

/// 进度 current >= total 当且仅当下一次检查会授予该徽章
#[tokio::test]
async fn test_progress_matches_next_check() {
    let h = Harness::new();
    let counters = h.registry.counters();
    for _ in 0..6 {
        counters
            .record_episode_watched("u1", Some(h.clock.now() - Duration::hours(1)))
            .await;
    }
    h.seed(
        StorePath::friends("u1"),
        json!({ "f1": true, "f2": true, "f3": true, "f4": true }),
    )
    .await;

    let engine = h.engine("u1");
    let complete: HashSet<String> = engine
        .get_all_badge_progress()
        .await
        .unwrap()
        .into_iter()
        .filter(|p| p.is_complete())
        .map(|p| p.badge_id)
        .collect();

    let earned: HashSet<String> = engine
        .check_for_new_badges()
        .await
        .unwrap()
        .iter()
        .map(|b| b.id().to_string())
        .collect();

    assert!(!earned.is_empty());
    assert_eq!(complete, earned);
}

/// 连续两次查询进度结果一致，只有连刷倒计时减少
#[tokio::test]
async fn test_progress_is_idempotent() {
    let h = Harness::new();
    let counters = h.registry.counters();
    counters.record_episode_watched("u1", None).await;
    counters.record_episode_watched("u1", None).await;

    let engine = h.engine("u1");
    let first = engine.get_all_badge_progress().await.unwrap();
    h.clock.advance(Duration::seconds(1));
    let second = engine.get_all_badge_progress().await.unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.badge_id, b.badge_id);
        assert_eq!(a.current, b.current);
        assert_eq!(a.total, b.total);
        match (a.time_remaining, b.time_remaining) {
            (Some(before), Some(after)) => assert_eq!(after, before - 1),
            (before, after) => {
                assert_eq!(before, after);
                assert_eq!(a, b);
            }
        }
    }
}

/// 残缺的窗口文档视为没有进行中的连刷
#[tokio::test]
async fn test_malformed_window_reads_as_no_session() {
    let h = Harness::new();
    h.seed(
        StorePath::binge_window("u1", BingeTimeframe::TenHours),
        json!({ "count": 9, "windowStart": 1712750400000i64 }),
    )
    .await;

    let progress = h
        .engine("u1")
        .get_badge_progress("binge_10h_gold")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(progress.current, 0);
    assert_eq!(progress.session_active, Some(false));
}

/// 并发记录不丢失计数
#[tokio::test]
async fn test_concurrent_binge_records() {
    let h = Harness::new();
    let counters = h.registry.counters().clone();

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let counters = counters.clone();
            tokio::spawn(async move { counters.record_binge_episode("u1").await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let windows = counters.read_binge_windows("u1").await.unwrap();
    assert_eq!(windows[&BingeTimeframe::OneDay].active_count(h.clock.now()), 20);
}

/// 多个引擎（多设备）同时检查，同一徽章只会被授予一次
#[tokio::test]
async fn test_concurrent_engines_award_once() {
    let h = Harness::new();
    h.seed(StorePath::friends("u1"), json!({ "f1": true })).await;

    let a = h.engine("u1");
    h.registry.evict("u1");
    let b = h.engine("u1");
    assert!(!Arc::ptr_eq(&a, &b));

    let (first, second) = tokio::join!(a.check_for_new_badges(), b.check_for_new_badges());
    let total = first.unwrap().len() + second.unwrap().len();
    assert_eq!(total, 1);

    let badges = b.get_user_badges().await.unwrap();
    assert_eq!(badges.len(), 1);
    assert_eq!(badges[0].id(), "social_bronze");
}

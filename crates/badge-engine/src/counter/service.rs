//! 计数器服务
//!
//! 负责用户计数器的自增与读取，每次写入都通过存储事务完成读-改-写。
//!
//! ## 写入语义
//!
//! 计数器只是徽章的统计依据，写入失败不能影响触发它的观看/评分操作：
//! 公开的写入方法返回 `()`，存储错误只记录日志和指标，然后丢弃。
//! 需要感知错误的调用方（测试、维护任务）使用对应的 `try_*` 方法。

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use futures::future::try_join_all;
use serde_json::{Map, Value, json};
use tracing::{debug, instrument, warn};

use badge_shared::observability::metrics::record_counter_write_failure;

use crate::clock::{Clock, local_date};
use crate::error::Result;
use crate::models::counters::{marathon_weeks_from_value, scalar_from_value};
use crate::models::{
    BingeTimeframe, BingeWindow, CounterSnapshot, MarathonWeeks, SocialCounterKind, StreakState,
    iso_week_key,
};
use crate::store::{KeyValueStore, StorePath};

/// 标量计数器名称
pub mod names {
    pub const QUICKWATCH_EPISODES: &str = "quickwatchEpisodes";
    pub const SOCIAL_TOTAL: &str = "total";
}

/// 抢鲜观看的判定窗口：播出后 24 小时内
const QUICKWATCH_WINDOW_HOURS: i64 = 24;

/// 计数器服务
#[derive(Clone)]
pub struct CounterService {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    timezone: Tz,
}

impl CounterService {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, timezone: Tz) -> Self {
        Self {
            store,
            clock,
            timezone,
        }
    }

    /// 执行写入并吞掉错误
    async fn best_effort<F>(&self, counter: &str, user_id: &str, op: F)
    where
        F: Future<Output = Result<()>>,
    {
        if let Err(e) = op.await {
            record_counter_write_failure(counter);
            warn!(
                user_id = %user_id,
                counter = counter,
                error = %e,
                "计数器写入失败，已丢弃"
            );
        }
    }

    // ==================== 写入（尽力而为） ====================

    /// 标量计数器自增，不存在时以 amount 创建
    pub async fn increment_scalar(&self, user_id: &str, name: &str, amount: u64) {
        self.best_effort(name, user_id, self.try_increment_scalar(user_id, name, amount))
            .await
    }

    /// 记录一集连刷观看（三个时间窗口各自独立）
    pub async fn record_binge_episode(&self, user_id: &str) {
        self.best_effort("bingeWindows", user_id, self.try_record_binge_episode(user_id))
            .await
    }

    /// 记录一集马拉松观看（累加到当前 ISO 周）
    pub async fn record_marathon_episode(&self, user_id: &str) {
        self.best_effort(
            "marathonWeeks",
            user_id,
            self.try_record_marathon_episode(user_id),
        )
        .await
    }

    /// 更新连续观看天数
    pub async fn update_streak_counter(&self, user_id: &str) {
        self.best_effort("streak", user_id, self.try_update_streak_counter(user_id))
            .await
    }

    /// 社交计数：同时累加总数和对应类型
    pub async fn increment_social_counter(&self, user_id: &str, kind: SocialCounterKind) {
        self.best_effort(
            kind.key(),
            user_id,
            self.try_increment_social_counter(user_id, kind),
        )
        .await
    }

    /// 清理所有已过期的连刷窗口
    pub async fn finalize_binge_session(&self, user_id: &str) {
        self.best_effort(
            "bingeWindows",
            user_id,
            self.try_finalize_binge_session(user_id),
        )
        .await
    }

    /// 观看一集后的统一入口
    ///
    /// 并发更新连刷、马拉松、连续天数，播出 24 小时内观看的额外计入抢鲜
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn record_episode_watched(&self, user_id: &str, aired_at: Option<DateTime<Utc>>) {
        let now = self.clock.now();
        let quickwatch = async {
            if is_quickwatch(aired_at, now) {
                self.increment_scalar(user_id, names::QUICKWATCH_EPISODES, 1)
                    .await;
            }
        };

        futures::join!(
            self.record_binge_episode(user_id),
            self.record_marathon_episode(user_id),
            self.update_streak_counter(user_id),
            quickwatch,
        );
    }

    /// 在后台执行 [`CounterService::record_episode_watched`]，调用方无需等待
    pub fn spawn_episode_watched(
        &self,
        user_id: impl Into<String>,
        aired_at: Option<DateTime<Utc>>,
    ) -> tokio::task::JoinHandle<()> {
        let service = self.clone();
        let user_id = user_id.into();
        tokio::spawn(async move { service.record_episode_watched(&user_id, aired_at).await })
    }

    // ==================== 写入（返回错误） ====================

    pub async fn try_increment_scalar(&self, user_id: &str, name: &str, amount: u64) -> Result<()> {
        StorePath::validate_user_id(user_id)?;
        self.add_to(&StorePath::counter(user_id, name), amount).await
    }

    async fn add_to(&self, path: &str, amount: u64) -> Result<()> {
        let update = move |current: Option<Value>| {
            let value = scalar_from_value(current.as_ref()).saturating_add(amount);
            Some(json!(value))
        };
        self.store.transaction(path, &update).await?;
        Ok(())
    }

    /// 连刷窗口更新
    ///
    /// 到期作废与开窗/自增在同一个事务内依次执行，过期窗口不可能被自增，
    /// 并发读取方也不会观察到中间的"无窗口"状态。
    pub async fn try_record_binge_episode(&self, user_id: &str) -> Result<()> {
        StorePath::validate_user_id(user_id)?;
        let now = self.clock.now();

        for timeframe in BingeTimeframe::ALL {
            let duration = timeframe.duration();
            let update = move |current: Option<Value>| {
                BingeWindow::from_value(current.as_ref())
                    .expire(now)
                    .record(now, duration)
                    .to_value()
            };
            let resolved = self
                .store
                .transaction(&StorePath::binge_window(user_id, timeframe), &update)
                .await?;

            debug!(
                user_id = %user_id,
                timeframe = timeframe.key(),
                count = BingeWindow::from_value(resolved.as_ref()).active_count(now),
                "连刷窗口已更新"
            );
        }
        Ok(())
    }

    pub async fn try_record_marathon_episode(&self, user_id: &str) -> Result<()> {
        StorePath::validate_user_id(user_id)?;
        let week = iso_week_key(local_date(self.clock.now(), self.timezone));

        let update = |current: Option<Value>| {
            let mut weeks = match current {
                Some(Value::Object(map)) => map,
                _ => Map::new(),
            };
            let next = scalar_from_value(weeks.get(&week)).saturating_add(1);
            weeks.insert(week.clone(), json!(next));
            Some(Value::Object(weeks))
        };
        self.store
            .transaction(&StorePath::marathon_weeks(user_id), &update)
            .await?;
        Ok(())
    }

    /// 连续天数与最后活跃日期保存在同一文档中，一次事务整体更新
    pub async fn try_update_streak_counter(&self, user_id: &str) -> Result<()> {
        StorePath::validate_user_id(user_id)?;
        let today = local_date(self.clock.now(), self.timezone);

        let update = move |current: Option<Value>| {
            StreakState::from_value(current.as_ref())
                .advance(today)
                .to_value()
        };
        self.store
            .transaction(&StorePath::streak(user_id), &update)
            .await?;
        Ok(())
    }

    pub async fn try_increment_social_counter(
        &self,
        user_id: &str,
        kind: SocialCounterKind,
    ) -> Result<()> {
        StorePath::validate_user_id(user_id)?;
        self.add_to(&StorePath::social_counter(user_id, names::SOCIAL_TOTAL), 1)
            .await?;
        self.add_to(&StorePath::social_counter(user_id, kind.key()), 1)
            .await
    }

    /// 过期或残缺的窗口文档一并删除
    pub async fn try_finalize_binge_session(&self, user_id: &str) -> Result<()> {
        StorePath::validate_user_id(user_id)?;
        let now = self.clock.now();

        for timeframe in BingeTimeframe::ALL {
            let update = move |current: Option<Value>| {
                BingeWindow::from_value(current.as_ref())
                    .expire(now)
                    .to_value()
            };
            self.store
                .transaction(&StorePath::binge_window(user_id, timeframe), &update)
                .await?;
        }
        Ok(())
    }

    // ==================== 读取 ====================

    pub async fn read_scalar(&self, user_id: &str, name: &str) -> Result<u64> {
        let value = self.store.get(&StorePath::counter(user_id, name)).await?;
        Ok(scalar_from_value(value.as_ref()))
    }

    pub async fn read_social_counter(&self, user_id: &str, kind: SocialCounterKind) -> Result<u64> {
        let value = self
            .store
            .get(&StorePath::social_counter(user_id, kind.key()))
            .await?;
        Ok(scalar_from_value(value.as_ref()))
    }

    pub async fn read_streak(&self, user_id: &str) -> Result<StreakState> {
        let value = self.store.get(&StorePath::streak(user_id)).await?;
        Ok(StreakState::from_value(value.as_ref()))
    }

    pub async fn read_marathon_weeks(&self, user_id: &str) -> Result<MarathonWeeks> {
        let value = self.store.get(&StorePath::marathon_weeks(user_id)).await?;
        Ok(marathon_weeks_from_value(value.as_ref()))
    }

    pub async fn read_binge_windows(
        &self,
        user_id: &str,
    ) -> Result<BTreeMap<BingeTimeframe, BingeWindow>> {
        let windows = try_join_all(BingeTimeframe::ALL.into_iter().map(|timeframe| async move {
            let value = self
                .store
                .get(&StorePath::binge_window(user_id, timeframe))
                .await?;
            Ok::<_, crate::error::BadgeError>((timeframe, BingeWindow::from_value(value.as_ref())))
        }))
        .await?;

        Ok(windows.into_iter().collect())
    }

    /// 一次性读取评估所需的全部计数器
    pub async fn read_snapshot(&self, user_id: &str) -> Result<CounterSnapshot> {
        let (quickwatch_episodes, streak, marathon_weeks, binge_windows) = futures::try_join!(
            self.read_scalar(user_id, names::QUICKWATCH_EPISODES),
            self.read_streak(user_id),
            self.read_marathon_weeks(user_id),
            self.read_binge_windows(user_id),
        )?;

        Ok(CounterSnapshot {
            quickwatch_episodes: u32::try_from(quickwatch_episodes).unwrap_or(u32::MAX),
            streak,
            marathon_weeks,
            binge_windows,
        })
    }
}

/// 是否属于抢鲜观看：播出之后 24 小时以内
fn is_quickwatch(aired_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    aired_at.is_some_and(|aired| {
        now >= aired && now - aired <= Duration::hours(QUICKWATCH_WINDOW_HOURS)
    })
}

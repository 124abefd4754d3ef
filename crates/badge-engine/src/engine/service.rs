//! 徽章引擎服务
//!
//! 每个用户一个引擎实例，负责聚合评估输入、授予新徽章以及计算未获得徽章的进度。
//!
//! ## 缓存
//!
//! 三类缓存共用同一个 TTL（默认 30 分钟）：
//! - 聚合数据：观看内容、好友数、计数器快照
//! - 已获得徽章：`users/{uid}/badges` 文档
//! - 进度：非连刷类徽章的进度
//!
//! 连刷窗口会随时间到期，评估与进度计算每次都重新读取窗口，不使用缓存。
//!
//! ## 授予流程
//!
//! 先用纯函数 [`evaluate`] 得到候选徽章，再在同一个事务中逐个"不存在才插入"。
//! 写入失败按指数退避重试，重试耗尽后返回 [`BadgeError::CommitFailed`]，
//! 此时本次候选一个都没有写入，下次检查会重新授予并返回。
//!
//! 写入成功后以事务解析出的文档替换已获得徽章缓存，其他会话先写入的记录保持原样。

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use badge_shared::config::EngineConfig;
use badge_shared::observability::metrics::record_badge_evaluation;
use badge_shared::retry::{RetryPolicy, retry_with_policy};

use super::aggregate::UserBadgeData;
use super::cache::TtlCache;
use super::evaluator::{evaluate, measure, measure_window};
use crate::catalog;
use crate::clock::{Clock, parse_timezone};
use crate::counter::CounterService;
use crate::error::{BadgeError, Result};
use crate::models::{BadgeProgress, EarnedBadge, EarnedBadgeRecord};
use crate::repository::{ContentRepository, SocialGraphRepository};
use crate::store::{KeyValueStore, StorePath};

/// 已获得徽章：徽章 ID -> 记录
type EarnedMap = BTreeMap<String, EarnedBadgeRecord>;
/// 非连刷类徽章的进度：徽章 ID -> 进度
type ProgressMap = HashMap<String, BadgeProgress>;
/// 进度连同计算它所用的聚合数据一起缓存
type CachedProgress = (Arc<UserBadgeData>, Arc<ProgressMap>);

/// 一次写入的结果
struct CommitOutcome {
    /// 由本次调用写入的徽章 ID
    inserted: Vec<String>,
    /// 事务完成后的已获得徽章文档
    resolved: EarnedMap,
}

/// 引擎共享依赖
///
/// 同一进程内所有用户的引擎共用一份
#[derive(Clone)]
pub struct EngineContext {
    pub store: Arc<dyn KeyValueStore>,
    pub content_repo: Arc<dyn ContentRepository>,
    pub social_repo: Arc<dyn SocialGraphRepository>,
    pub counters: CounterService,
    pub clock: Arc<dyn Clock>,
    pub cache_ttl: chrono::Duration,
    pub commit_policy: RetryPolicy,
}

impl EngineContext {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        content_repo: Arc<dyn ContentRepository>,
        social_repo: Arc<dyn SocialGraphRepository>,
        clock: Arc<dyn Clock>,
        config: &EngineConfig,
    ) -> Result<Self> {
        let timezone = parse_timezone(&config.timezone)?;
        let cache_ttl = chrono::Duration::from_std(config.cache_ttl())
            .map_err(|e| BadgeError::Validation(format!("缓存 TTL 无效: {}", e)))?;

        Ok(Self {
            counters: CounterService::new(store.clone(), clock.clone(), timezone),
            store,
            content_repo,
            social_repo,
            clock,
            cache_ttl,
            commit_policy: RetryPolicy::new(
                config.commit_max_retries,
                config.commit_initial_delay(),
            ),
        })
    }
}

/// 单个用户的徽章引擎
pub struct BadgeEngine {
    user_id: String,
    ctx: EngineContext,
    data_cache: TtlCache<Arc<UserBadgeData>>,
    earned_cache: TtlCache<Arc<EarnedMap>>,
    progress_cache: TtlCache<CachedProgress>,
}

impl BadgeEngine {
    pub fn new(user_id: impl Into<String>, ctx: EngineContext) -> Result<Self> {
        let user_id = user_id.into();
        StorePath::validate_user_id(&user_id)?;

        let ttl = ctx.cache_ttl;
        Ok(Self {
            user_id,
            ctx,
            data_cache: TtlCache::new(ttl),
            earned_cache: TtlCache::new(ttl),
            progress_cache: TtlCache::new(ttl),
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// 检查并授予新徽章
    ///
    /// 只返回本次新获得的徽章，已获得的徽章不会重复返回
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn check_for_new_badges(&self) -> Result<Vec<EarnedBadge>> {
        let started = Instant::now();
        let result = self.check_and_commit().await;

        let status = if result.is_ok() { "success" } else { "failure" };
        record_badge_evaluation(
            status,
            result.as_ref().map_or(0, Vec::len),
            started.elapsed().as_secs_f64(),
        );
        result
    }

    async fn check_and_commit(&self) -> Result<Vec<EarnedBadge>> {
        let now = self.ctx.clock.now();
        let data = self.live_data(now).await?;
        let earned = self.earned_records(now).await?;

        let candidates = evaluate(
            catalog::definitions(),
            &data,
            |id| earned.contains_key(id),
            now,
        );
        if candidates.is_empty() {
            debug!(user_id = %self.user_id, "没有新达成的徽章");
            return Ok(Vec::new());
        }

        let outcome = self.commit(&candidates).await?;
        self.earned_cache
            .put(Arc::new(outcome.resolved), now)
            .await;

        let newly_earned: Vec<EarnedBadge> = candidates
            .into_iter()
            .filter(|badge| {
                let fresh = outcome.inserted.iter().any(|id| id == badge.id());
                if fresh {
                    info!(
                        user_id = %self.user_id,
                        badge_id = badge.id(),
                        detail = badge.detail.as_deref().unwrap_or_default(),
                        "用户获得新徽章"
                    );
                } else {
                    debug!(
                        user_id = %self.user_id,
                        badge_id = badge.id(),
                        "徽章已由其他会话写入，跳过"
                    );
                }
                fresh
            })
            .collect();

        Ok(newly_earned)
    }

    /// 在一个事务中写入全部候选徽章，已存在的不覆盖
    async fn commit(&self, badges: &[EarnedBadge]) -> Result<CommitOutcome> {
        let path = StorePath::earned_badges(&self.user_id);
        let records = badges
            .iter()
            .map(|badge| -> Result<(&str, Value)> {
                Ok((badge.id(), serde_json::to_value(badge.to_record())?))
            })
            .collect::<Result<Vec<_>>>()?;

        retry_with_policy(
            &self.ctx.commit_policy,
            "commit_earned_badges",
            BadgeError::is_retryable,
            || {
                let path = &path;
                let records = &records;
                async move {
                    let inserted = Mutex::new(Vec::new());
                    let update = |current: Option<Value>| {
                        let mut earned = match current {
                            Some(Value::Object(map)) => map,
                            _ => Map::new(),
                        };
                        let mut fresh = Vec::new();
                        for (badge_id, record) in records {
                            if !earned.contains_key(*badge_id) {
                                earned.insert(badge_id.to_string(), record.clone());
                                fresh.push(badge_id.to_string());
                            }
                        }
                        // 存储冲突重试时会再次调用
                        *inserted.lock() = fresh;
                        Some(Value::Object(earned))
                    };

                    let resolved = self.ctx.store.transaction(path, &update).await?;
                    Ok::<_, BadgeError>(CommitOutcome {
                        inserted: inserted.into_inner(),
                        resolved: parse_earned(&self.user_id, resolved),
                    })
                }
            },
        )
        .await
        .map_err(|e| {
            let badge_ids: Vec<String> = badges.iter().map(|b| b.id().to_string()).collect();
            warn!(
                user_id = %self.user_id,
                badge_ids = ?badge_ids,
                error = %e,
                "新徽章写入失败"
            );
            BadgeError::CommitFailed {
                user_id: self.user_id.clone(),
                badge_ids,
                reason: e.to_string(),
            }
        })
    }

    /// 全部未获得徽章的进度（按目录顺序）
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn get_all_badge_progress(&self) -> Result<Vec<BadgeProgress>> {
        let now = self.ctx.clock.now();
        let earned = self.earned_records(now).await?;
        let data = self.aggregate(now).await?;

        // 只复用由同一份聚合数据算出的进度
        let cached = self
            .progress_cache
            .get(now)
            .await
            .filter(|(source, _)| Arc::ptr_eq(source, &data))
            .map(|(_, progress)| progress);

        let mut progress: ProgressMap = match cached {
            Some(cached) => cached.as_ref().clone(),
            None => {
                let computed: ProgressMap = catalog::definitions()
                    .iter()
                    .filter(|badge| !badge.category.is_window_bound())
                    .filter(|badge| !earned.contains_key(badge.id))
                    .map(|badge| (badge.id.to_string(), measure(badge, &data, now)))
                    .collect();
                self.progress_cache
                    .put((data.clone(), Arc::new(computed.clone())), now)
                    .await;
                computed
            }
        };
        // 缓存之后才获得的徽章不再展示进度
        progress.retain(|badge_id, _| !earned.contains_key(badge_id));

        let windows = self
            .ctx
            .counters
            .read_binge_windows(&self.user_id)
            .await?;

        let mut result = Vec::with_capacity(progress.len() + windows.len());
        for badge in catalog::definitions() {
            if earned.contains_key(badge.id) {
                continue;
            }
            if badge.category.is_window_bound() {
                let window = badge
                    .requirement
                    .timeframe
                    .and_then(|timeframe| windows.get(&timeframe).copied())
                    .unwrap_or_default();
                result.push(measure_window(badge, &window, now));
            } else if let Some(entry) = progress.remove(badge.id) {
                result.push(entry);
            }
        }

        Ok(result)
    }

    /// 单个徽章的进度，已获得的徽章返回 None
    pub async fn get_badge_progress(&self, badge_id: &str) -> Result<Option<BadgeProgress>> {
        if catalog::find_by_id(badge_id).is_none() {
            return Err(BadgeError::BadgeNotFound(badge_id.to_string()));
        }

        let progress = self.get_all_badge_progress().await?;
        Ok(progress.into_iter().find(|p| p.badge_id == badge_id))
    }

    /// 已获得的徽章（按获得时间排序）
    ///
    /// 目录中已下线的徽章记录会被忽略
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn get_user_badges(&self) -> Result<Vec<EarnedBadge>> {
        let now = self.ctx.clock.now();
        let earned = self.earned_records(now).await?;

        let mut badges: Vec<EarnedBadge> = earned
            .values()
            .cloned()
            .filter_map(EarnedBadge::from_record)
            .collect();
        badges.sort_by_key(|badge| badge.earned_at);
        Ok(badges)
    }

    /// 清空全部缓存
    ///
    /// 好友变化、批量导入等绕过计数器的数据变更之后需要调用
    pub async fn invalidate_cache(&self) {
        self.data_cache.invalidate().await;
        self.earned_cache.invalidate().await;
        self.progress_cache.invalidate().await;
        debug!(user_id = %self.user_id, "徽章引擎缓存已清空");
    }

    /// 清空缓存后重新评估全部徽章
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn recalculate_all_badges(&self) -> Result<Vec<EarnedBadge>> {
        self.invalidate_cache().await;
        let badges = self.check_for_new_badges().await?;
        info!(
            user_id = %self.user_id,
            newly_earned = badges.len(),
            "徽章重新计算完成"
        );
        Ok(badges)
    }

    // ==================== 数据加载 ====================

    /// 聚合评估输入（带缓存）
    ///
    /// 重新聚合前先清理过期的连刷窗口
    async fn aggregate(&self, now: DateTime<Utc>) -> Result<Arc<UserBadgeData>> {
        if let Some(data) = self.data_cache.get(now).await {
            return Ok(data);
        }

        self.ctx.counters.finalize_binge_session(&self.user_id).await;

        let (content, friend_count, counters) = futures::try_join!(
            self.ctx.content_repo.load_user_content(&self.user_id),
            self.ctx.social_repo.friend_count(&self.user_id),
            self.ctx.counters.read_snapshot(&self.user_id),
        )?;

        let data = Arc::new(UserBadgeData::from_parts(&content, friend_count, counters));
        self.data_cache.put(data.clone(), now).await;

        debug!(
            user_id = %self.user_id,
            series_count = data.series_count,
            rated_items = data.rated_items,
            friend_count = data.friend_count,
            "用户数据聚合完成"
        );
        Ok(data)
    }

    /// 聚合数据叠加最新的连刷窗口
    async fn live_data(&self, now: DateTime<Utc>) -> Result<UserBadgeData> {
        let data = self.aggregate(now).await?;
        let windows = self
            .ctx
            .counters
            .read_binge_windows(&self.user_id)
            .await?;
        Ok(data.with_binge_windows(windows))
    }

    /// 已获得徽章（带缓存）
    async fn earned_records(&self, now: DateTime<Utc>) -> Result<Arc<EarnedMap>> {
        if let Some(earned) = self.earned_cache.get(now).await {
            return Ok(earned);
        }

        let value = self
            .ctx
            .store
            .get(&StorePath::earned_badges(&self.user_id))
            .await?;
        let earned = Arc::new(parse_earned(&self.user_id, value));
        self.earned_cache.put(earned.clone(), now).await;
        Ok(earned)
    }
}

/// 解析已获得徽章文档，跳过无法解析的条目
fn parse_earned(user_id: &str, value: Option<Value>) -> EarnedMap {
    let Some(Value::Object(map)) = value else {
        return EarnedMap::new();
    };

    map.into_iter()
        .filter_map(
            |(badge_id, raw)| match serde_json::from_value::<EarnedBadgeRecord>(raw) {
                Ok(record) => Some((badge_id, record)),
                Err(e) => {
                    warn!(
                        user_id = %user_id,
                        badge_id = %badge_id,
                        error = %e,
                        "已获得徽章记录格式异常，已忽略"
                    );
                    None
                }
            },
        )
        .collect()
}

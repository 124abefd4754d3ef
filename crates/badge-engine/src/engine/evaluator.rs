//! 徽章评估
//!
//! 纯函数：给定聚合数据与当前时间，计算每个徽章的进度并挑出已达成的徽章。
//! 是否达成完全由进度决定（`current >= total`），进度展示与实际授予不会出现分歧。
//! 持久化由引擎服务单独完成。

use chrono::{DateTime, Utc};

use super::aggregate::{UserBadgeData, saturating_u32};
use crate::models::{Badge, BadgeCategory, BadgeProgress, BingeWindow, EarnedBadge};

/// 计算单个徽章的进度
pub fn measure(badge: &Badge, data: &UserBadgeData, now: DateTime<Utc>) -> BadgeProgress {
    if badge.category.is_window_bound() {
        let window = badge
            .requirement
            .timeframe
            .map(|timeframe| data.counters.binge_window(timeframe))
            .unwrap_or_default();
        return measure_window(badge, &window, now);
    }

    BadgeProgress {
        badge_id: badge.id.to_string(),
        current: signal(badge.category, data),
        total: badge.requirement.count,
        last_updated: now,
        time_remaining: None,
        session_active: None,
    }
}

/// 连刷进度：只反映当前未过期窗口，过期窗口计为 0
pub fn measure_window(badge: &Badge, window: &BingeWindow, now: DateTime<Utc>) -> BadgeProgress {
    BadgeProgress {
        badge_id: badge.id.to_string(),
        current: window.active_count(now),
        total: badge.requirement.count,
        last_updated: now,
        time_remaining: Some(window.time_remaining(now)),
        session_active: Some(window.is_session_active(now)),
    }
}

/// 非窗口类徽章的度量值
fn signal(category: BadgeCategory, data: &UserBadgeData) -> u32 {
    match category {
        BadgeCategory::SeriesExplorer => data.series_count,
        BadgeCategory::Collector => data.rated_items,
        BadgeCategory::Social => data.friend_count,
        // 取历史上所有周的最大值，而非本周
        BadgeCategory::Marathon => data
            .counters
            .best_marathon_week()
            .map(|(_, count)| count)
            .unwrap_or(0),
        BadgeCategory::Streak => data.counters.streak.current_streak,
        BadgeCategory::Quickwatch => data.counters.quickwatch_episodes,
        BadgeCategory::Rewatch => saturating_u32(data.rewatch_episodes),
        BadgeCategory::Binge => 0,
    }
}

/// 达成说明
fn detail(badge: &Badge, progress: &BadgeProgress, data: &UserBadgeData) -> String {
    let current = progress.current;
    let episodes = |n| counted(n, "episode", "episodes");
    match badge.category {
        BadgeCategory::Binge => match badge.requirement.timeframe {
            Some(timeframe) => format!(
                "Watched {} within {}",
                episodes(current),
                timeframe.label()
            ),
            None => format!("Watched {} in one session", episodes(current)),
        },
        BadgeCategory::Quickwatch => format!(
            "Watched {} within 24 hours of airing",
            episodes(current)
        ),
        BadgeCategory::Marathon => match data.counters.best_marathon_week() {
            Some((week, count)) => format!("Watched {} in week {}", episodes(count), week),
            None => format!("Watched {} in one week", episodes(current)),
        },
        BadgeCategory::Streak => format!(
            "Watched for {}",
            counted(current, "consecutive day", "consecutive days")
        ),
        BadgeCategory::Rewatch => format!("Rewatched {}", episodes(current)),
        BadgeCategory::SeriesExplorer => {
            format!("Watched {}", counted(current, "series", "different series"))
        }
        BadgeCategory::Collector => format!(
            "Rated {}",
            counted(current, "series or movie", "series and movies")
        ),
        BadgeCategory::Social => format!("Made {}", counted(current, "friend", "friends")),
    }
}

fn counted(n: u32, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("1 {}", singular)
    } else {
        format!("{} {}", n, plural)
    }
}

/// 评估全部未获得的徽章，返回本次新达成的徽章（尚未持久化）
pub fn evaluate(
    catalog: &'static [Badge],
    data: &UserBadgeData,
    is_earned: impl Fn(&str) -> bool,
    now: DateTime<Utc>,
) -> Vec<EarnedBadge> {
    catalog
        .iter()
        .filter(|badge| !is_earned(badge.id))
        .filter_map(|badge| {
            let progress = measure(badge, data, now);
            progress
                .is_complete()
                .then(|| EarnedBadge::new(badge, now, Some(detail(badge, &progress, data))))
        })
        .collect()
}

//! 评估输入聚合
//!
//! 把观看内容、好友数与计数器快照合并成一份评估所需的统计数据，
//! 聚合结果由引擎缓存，评估与进度计算都只读取这份数据。

use std::collections::{BTreeMap, HashSet};

use crate::models::{BingeTimeframe, BingeWindow, CounterSnapshot, UserContent};

/// 聚合后的用户数据
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserBadgeData {
    /// 观看过的不同剧集数
    pub series_count: u32,
    /// 至少有一项正分评分的剧集与电影总数
    pub rated_items: u32,
    /// 全部剧集的重温集数之和
    pub rewatch_episodes: u64,
    pub friend_count: u32,
    pub counters: CounterSnapshot,
}

impl UserBadgeData {
    pub fn from_parts(content: &UserContent, friend_count: u32, counters: CounterSnapshot) -> Self {
        let distinct_series: HashSet<&str> =
            content.series.iter().map(|series| series.id.as_str()).collect();

        let rated_series: HashSet<&str> = content
            .series
            .iter()
            .filter(|s| s.is_rated())
            .map(|s| s.id.as_str())
            .collect();
        let rated_movies: HashSet<&str> = content
            .movies
            .iter()
            .filter(|m| m.is_rated())
            .map(|m| m.id.as_str())
            .collect();

        let rewatch_episodes = content
            .series
            .iter()
            .map(|series| series.rewatched_episodes())
            .sum();

        Self {
            series_count: saturating_u32(distinct_series.len() as u64),
            rated_items: saturating_u32((rated_series.len() + rated_movies.len()) as u64),
            rewatch_episodes,
            friend_count,
            counters,
        }
    }

    /// 用最新读取的连刷窗口替换快照中的窗口
    pub fn with_binge_windows(&self, windows: BTreeMap<BingeTimeframe, BingeWindow>) -> Self {
        let mut data = self.clone();
        data.counters.binge_windows = windows;
        data
    }
}

pub(crate) fn saturating_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

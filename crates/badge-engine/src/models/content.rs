//! 用户观看内容
//!
//! 由内容仓储提供的剧集与电影记录，只保留徽章计算所需的字段

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// 单集观看状态
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRecord {
    pub episode_number: u32,
    #[serde(default)]
    pub watched: bool,
    /// 累计观看次数，重温时大于 1
    #[serde(default)]
    pub watch_count: u32,
    #[serde(default)]
    pub aired: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonRecord {
    pub season_number: u32,
    #[serde(default)]
    pub episodes: Vec<EpisodeRecord>,
}

/// 用户观看过的剧集
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// 按类型（genre）打分，值大于 0 视为已评分
    #[serde(default)]
    pub ratings: HashMap<String, f64>,
    #[serde(default)]
    pub seasons: Vec<SeasonRecord>,
}

impl SeriesRecord {
    pub fn is_rated(&self) -> bool {
        has_positive_rating(&self.ratings)
    }

    /// 重温集数：每集 `watch_count - 1`（仅统计观看超过一次的集）
    pub fn rewatched_episodes(&self) -> u64 {
        self.seasons
            .iter()
            .flat_map(|season| season.episodes.iter())
            .filter(|episode| episode.watch_count > 1)
            .map(|episode| u64::from(episode.watch_count - 1))
            .sum()
    }
}

/// 用户观看过的电影
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ratings: HashMap<String, f64>,
}

impl MovieRecord {
    pub fn is_rated(&self) -> bool {
        has_positive_rating(&self.ratings)
    }
}

fn has_positive_rating(ratings: &HashMap<String, f64>) -> bool {
    ratings.values().any(|value| *value > 0.0)
}

/// 用户全部观看内容
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserContent {
    pub series: Vec<SeriesRecord>,
    pub movies: Vec<MovieRecord>,
}

//! 徽章引擎枚举类型定义
//!
//! 所有枚举都支持 JSON（serde）序列化，序列化值与存储中的键名保持一致

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// 徽章分类
///
/// 每个分类对应一种获取条件的计算方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    /// 连刷 - 在固定时间窗口内观看指定集数
    Binge,
    /// 抢鲜 - 在剧集播出后 24 小时内观看
    Quickwatch,
    /// 马拉松 - 单个自然周（ISO 周）内观看的集数
    Marathon,
    /// 连续打卡 - 连续观看的天数
    Streak,
    /// 重温 - 重复观看的集数
    Rewatch,
    /// 探索者 - 观看过的不同剧集数量
    SeriesExplorer,
    /// 收藏家 - 打过分的剧集与电影数量
    Collector,
    /// 社交 - 好友数量
    Social,
}

impl BadgeCategory {
    pub const ALL: [BadgeCategory; 8] = [
        Self::Binge,
        Self::Quickwatch,
        Self::Marathon,
        Self::Streak,
        Self::Rewatch,
        Self::SeriesExplorer,
        Self::Collector,
        Self::Social,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Binge => "binge",
            Self::Quickwatch => "quickwatch",
            Self::Marathon => "marathon",
            Self::Streak => "streak",
            Self::Rewatch => "rewatch",
            Self::SeriesExplorer => "series_explorer",
            Self::Collector => "collector",
            Self::Social => "social",
        }
    }

    /// 是否依赖时间窗口（进度需要返回倒计时）
    pub fn is_window_bound(&self) -> bool {
        matches!(self, Self::Binge)
    }
}

/// 徽章等级
///
/// 同一分类内等级越高，要求越高
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTier {
    #[default]
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

/// 稀有度（仅用于展示）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// 获取条件的度量维度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    Episodes,
    Days,
    Series,
    Ratings,
    Friends,
}

/// 连刷时间窗口
///
/// 每个窗口独立计数，窗口从第一次观看开始计时，到期后作废（不滚动）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BingeTimeframe {
    #[serde(rename = "10h")]
    TenHours,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "2d")]
    TwoDays,
}

impl BingeTimeframe {
    pub const ALL: [BingeTimeframe; 3] = [Self::TenHours, Self::OneDay, Self::TwoDays];

    /// 存储中的键名
    pub fn key(&self) -> &'static str {
        match self {
            Self::TenHours => "10h",
            Self::OneDay => "1d",
            Self::TwoDays => "2d",
        }
    }

    /// 窗口时长
    pub fn duration(&self) -> Duration {
        match self {
            Self::TenHours => Duration::hours(10),
            Self::OneDay => Duration::hours(24),
            Self::TwoDays => Duration::hours(48),
        }
    }

    /// 人类可读的描述，用于徽章获取说明
    pub fn label(&self) -> &'static str {
        match self {
            Self::TenHours => "10 hours",
            Self::OneDay => "24 hours",
            Self::TwoDays => "48 hours",
        }
    }
}

/// 社交计数类型
///
/// 每次社交行为同时累加总计数和对应类型的计数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialCounterKind {
    FriendRequestSent,
    FriendRequestAccepted,
    FriendAdded,
}

impl SocialCounterKind {
    pub fn key(&self) -> &'static str {
        match self {
            Self::FriendRequestSent => "friendRequestsSent",
            Self::FriendRequestAccepted => "friendRequestsAccepted",
            Self::FriendAdded => "friendsAdded",
        }
    }
}

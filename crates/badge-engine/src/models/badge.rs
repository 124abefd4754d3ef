//! 徽章定义与已获得徽章实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{BadgeCategory, BadgeTier, BingeTimeframe, Rarity, RequirementKind};

/// 徽章获取条件
///
/// `count` 为达成阈值；仅连刷类徽章携带 `timeframe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub kind: RequirementKind,
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<BingeTimeframe>,
}

impl Requirement {
    pub const fn episodes(count: u32) -> Self {
        Self {
            kind: RequirementKind::Episodes,
            count,
            timeframe: None,
        }
    }

    pub const fn episodes_within(count: u32, timeframe: BingeTimeframe) -> Self {
        Self {
            kind: RequirementKind::Episodes,
            count,
            timeframe: Some(timeframe),
        }
    }

    pub const fn days(count: u32) -> Self {
        Self {
            kind: RequirementKind::Days,
            count,
            timeframe: None,
        }
    }

    pub const fn series(count: u32) -> Self {
        Self {
            kind: RequirementKind::Series,
            count,
            timeframe: None,
        }
    }

    pub const fn ratings(count: u32) -> Self {
        Self {
            kind: RequirementKind::Ratings,
            count,
            timeframe: None,
        }
    }

    pub const fn friends(count: u32) -> Self {
        Self {
            kind: RequirementKind::Friends,
            count,
            timeframe: None,
        }
    }
}

/// 徽章定义
///
/// 编译期静态数据，由 [`crate::catalog`] 提供
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: BadgeCategory,
    pub tier: BadgeTier,
    pub requirement: Requirement,
    pub rarity: Rarity,
}

/// 已获得徽章的持久化记录
///
/// 存储在 `users/{uid}/badges` 下，以徽章 ID 为键，写入后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnedBadgeRecord {
    pub badge_id: String,
    pub earned_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// 已获得徽章
///
/// 由持久化记录和徽章定义拼装而成
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnedBadge {
    #[serde(flatten)]
    pub badge: &'static Badge,
    pub earned_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl EarnedBadge {
    pub fn new(badge: &'static Badge, earned_at: DateTime<Utc>, detail: Option<String>) -> Self {
        Self {
            badge,
            earned_at,
            detail,
        }
    }

    pub fn id(&self) -> &'static str {
        self.badge.id
    }

    pub fn to_record(&self) -> EarnedBadgeRecord {
        EarnedBadgeRecord {
            badge_id: self.badge.id.to_string(),
            earned_at: self.earned_at,
            detail: self.detail.clone(),
        }
    }

    /// 从持久化记录还原，目录中已不存在的徽章返回 None
    pub fn from_record(record: EarnedBadgeRecord) -> Option<Self> {
        crate::catalog::find_by_id(&record.badge_id).map(|badge| Self {
            badge,
            earned_at: record.earned_at,
            detail: record.detail,
        })
    }
}

//! 用户计数器模型
//!
//! 计数器在存储中以 JSON 文档保存，这里负责文档与领域类型之间的转换，
//! 以及各类计数器的纯状态迁移（不涉及 I/O）。
//!
//! 解析时对残缺或格式异常的文档一律按"无数据"处理，不返回错误。

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::enums::BingeTimeframe;

/// 连刷窗口
///
/// 窗口只在 `now < window_end` 时有效，到期后视为不存在，下一次观看重新开窗
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BingeWindow {
    #[default]
    Absent,
    Active {
        count: u32,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    },
}

/// 连刷窗口在存储中的文档结构（毫秒时间戳）
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingeWindowDoc {
    count: Option<u32>,
    window_start: Option<i64>,
    window_end: Option<i64>,
}

impl BingeWindow {
    /// 从存储值解析，缺少 count 或 windowEnd 时视为无窗口
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(doc) = value.and_then(|v| serde_json::from_value::<BingeWindowDoc>(v.clone()).ok())
        else {
            return Self::Absent;
        };

        let (Some(count), Some(end_ms)) = (doc.count, doc.window_end) else {
            return Self::Absent;
        };
        let Some(window_end) = DateTime::from_timestamp_millis(end_ms) else {
            return Self::Absent;
        };
        let window_start = doc
            .window_start
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or(window_end);

        Self::Active {
            count,
            window_start,
            window_end,
        }
    }

    /// 转换为存储值，Absent 对应删除
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Self::Absent => None,
            Self::Active {
                count,
                window_start,
                window_end,
            } => serde_json::to_value(BingeWindowDoc {
                count: Some(*count),
                window_start: Some(window_start.timestamp_millis()),
                window_end: Some(window_end.timestamp_millis()),
            })
            .ok(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self, Self::Active { window_end, .. } if now >= *window_end)
    }

    /// 到期迁移：过期窗口直接作废，已累计的集数不保留
    pub fn expire(self, now: DateTime<Utc>) -> Self {
        if self.is_expired(now) { Self::Absent } else { self }
    }

    /// 记录一集：无窗口时以当前时刻开窗，否则原地加一
    ///
    /// 调用方必须先执行 [`BingeWindow::expire`]
    pub fn record(self, now: DateTime<Utc>, duration: Duration) -> Self {
        match self {
            Self::Absent => Self::Active {
                count: 1,
                window_start: now,
                window_end: now + duration,
            },
            Self::Active {
                count,
                window_start,
                window_end,
            } => Self::Active {
                count: count.saturating_add(1),
                window_start,
                window_end,
            },
        }
    }

    /// 当前仍有效的集数，过期窗口为 0
    pub fn active_count(&self, now: DateTime<Utc>) -> u32 {
        match self {
            Self::Active {
                count, window_end, ..
            } if now < *window_end => *count,
            _ => 0,
        }
    }

    /// 是否存在未过期的窗口
    pub fn is_session_active(&self, now: DateTime<Utc>) -> bool {
        matches!(self, Self::Active { window_end, .. } if now < *window_end)
    }

    /// 距窗口结束的剩余秒数，无有效窗口时为 0
    pub fn time_remaining(&self, now: DateTime<Utc>) -> i64 {
        match self {
            Self::Active { window_end, .. } if now < *window_end => {
                (*window_end - now).num_seconds()
            }
            _ => 0,
        }
    }
}

/// 连续观看状态
///
/// `current_streak` 与 `last_activity_date` 存在同一个文档中，由一次事务整体更新
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub last_activity_date: Option<NaiveDate>,
}

impl StreakState {
    pub fn from_value(value: Option<&Value>) -> Self {
        value
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    pub fn to_value(&self) -> Option<Value> {
        serde_json::to_value(self).ok()
    }

    /// 以用户本地日期推进连续天数
    ///
    /// - 同一天：不变
    /// - 昨天：加一
    /// - 其他（断档或首次）：重置为 1
    pub fn advance(self, today: NaiveDate) -> Self {
        let current_streak = match self.last_activity_date {
            Some(last) if last == today => return self,
            Some(last) if last.succ_opt() == Some(today) => self.current_streak.saturating_add(1),
            _ => 1,
        };

        Self {
            current_streak,
            last_activity_date: Some(today),
        }
    }
}

/// 马拉松周计数：ISO 周键 -> 当周集数
pub type MarathonWeeks = BTreeMap<String, u32>;

/// 生成 ISO-8601 周键，例如 `2024-W09`
///
/// 使用 ISO 周所属年份，跨年周归属到周四所在的年份
pub fn iso_week_key(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

/// 解析马拉松周计数，忽略非数字的条目
pub fn marathon_weeks_from_value(value: Option<&Value>) -> MarathonWeeks {
    let Some(Value::Object(map)) = value else {
        return MarathonWeeks::new();
    };

    map.iter()
        .filter_map(|(week, count)| {
            count
                .as_u64()
                .map(|c| (week.clone(), u32::try_from(c).unwrap_or(u32::MAX)))
        })
        .collect()
}

/// 解析标量计数器，缺失或格式异常时为 0
pub fn scalar_from_value(value: Option<&Value>) -> u64 {
    value.and_then(Value::as_u64).unwrap_or(0)
}

/// 计数器快照
///
/// 聚合时一次性读取的全部计数器
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub quickwatch_episodes: u32,
    pub streak: StreakState,
    pub marathon_weeks: MarathonWeeks,
    pub binge_windows: BTreeMap<BingeTimeframe, BingeWindow>,
}

impl CounterSnapshot {
    /// 历史上所有周中的最大单周集数
    pub fn best_marathon_week(&self) -> Option<(&str, u32)> {
        self.marathon_weeks
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(week, count)| (week.as_str(), *count))
    }

    pub fn binge_window(&self, timeframe: BingeTimeframe) -> BingeWindow {
        self.binge_windows
            .get(&timeframe)
            .copied()
            .unwrap_or_default()
    }
}

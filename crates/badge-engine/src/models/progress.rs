//! 徽章进度（派生数据，不持久化）

use chrono::{DateTime, Utc};
use serde::Serialize;

/// 单个未获得徽章的进度
///
/// `time_remaining` 与 `session_active` 只在连刷类徽章上出现
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeProgress {
    pub badge_id: String,
    pub current: u32,
    pub total: u32,
    pub last_updated: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_active: Option<bool>,
}

impl BadgeProgress {
    /// 当前值是否已达到要求
    pub fn is_complete(&self) -> bool {
        self.current >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(current: u32, total: u32) -> BadgeProgress {
        BadgeProgress {
            badge_id: "social_bronze".to_string(),
            current,
            total,
            last_updated: Utc::now(),
            time_remaining: None,
            session_active: None,
        }
    }

    #[test]
    fn test_progress_completion() {
        assert!(!progress(0, 3).is_complete());
        assert!(progress(3, 3).is_complete());
        assert!(progress(9, 3).is_complete());
    }

    #[test]
    fn test_window_fields_skipped_when_absent() {
        let json = serde_json::to_value(progress(1, 2)).unwrap();
        assert!(json.get("timeRemaining").is_none());
        assert!(json.get("sessionActive").is_none());
        assert_eq!(json["badgeId"], "social_bronze");
    }
}

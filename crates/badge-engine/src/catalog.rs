//! 徽章目录
//!
//! 编译期确定的全部徽章定义。目录只读、无副作用，徽章 ID 一经发布不得修改，
//! 否则已持久化的获得记录将无法还原。

use crate::models::BadgeCategory as C;
use crate::models::BadgeTier as T;
use crate::models::BingeTimeframe as W;
use crate::models::{Badge, BadgeCategory, BadgeTier, Rarity, Requirement};

const fn badge(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: BadgeCategory,
    tier: BadgeTier,
    requirement: Requirement,
    rarity: Rarity,
) -> Badge {
    Badge {
        id,
        name,
        description,
        category,
        tier,
        requirement,
        rarity,
    }
}

static BADGES: &[Badge] = &[
    // ==================== 连刷 ====================
    badge(
        "binge_10h_bronze",
        "Evening Binger",
        "Watch 3 episodes within 10 hours",
        C::Binge,
        T::Bronze,
        Requirement::episodes_within(3, W::TenHours),
        Rarity::Common,
    ),
    badge(
        "binge_10h_silver",
        "Night Owl",
        "Watch 5 episodes within 10 hours",
        C::Binge,
        T::Silver,
        Requirement::episodes_within(5, W::TenHours),
        Rarity::Uncommon,
    ),
    badge(
        "binge_10h_gold",
        "One More Episode",
        "Watch 8 episodes within 10 hours",
        C::Binge,
        T::Gold,
        Requirement::episodes_within(8, W::TenHours),
        Rarity::Rare,
    ),
    badge(
        "binge_1d_silver",
        "Day Off",
        "Watch 10 episodes within 24 hours",
        C::Binge,
        T::Silver,
        Requirement::episodes_within(10, W::OneDay),
        Rarity::Uncommon,
    ),
    badge(
        "binge_1d_gold",
        "Couch Commander",
        "Watch 12 episodes within 24 hours",
        C::Binge,
        T::Gold,
        Requirement::episodes_within(12, W::OneDay),
        Rarity::Rare,
    ),
    badge(
        "binge_1d_platinum",
        "Sunrise to Sunrise",
        "Watch 15 episodes within 24 hours",
        C::Binge,
        T::Platinum,
        Requirement::episodes_within(15, W::OneDay),
        Rarity::Epic,
    ),
    badge(
        "binge_2d_gold",
        "Weekend Warrior",
        "Watch 20 episodes within 48 hours",
        C::Binge,
        T::Gold,
        Requirement::episodes_within(20, W::TwoDays),
        Rarity::Rare,
    ),
    badge(
        "binge_2d_platinum",
        "Season Swallower",
        "Watch 25 episodes within 48 hours",
        C::Binge,
        T::Platinum,
        Requirement::episodes_within(25, W::TwoDays),
        Rarity::Epic,
    ),
    badge(
        "binge_2d_diamond",
        "Binge Legend",
        "Watch 30 episodes within 48 hours",
        C::Binge,
        T::Diamond,
        Requirement::episodes_within(30, W::TwoDays),
        Rarity::Legendary,
    ),
    // ==================== 抢鲜 ====================
    badge(
        "quickwatch_bronze",
        "Fresh Off the Air",
        "Watch an episode within 24 hours of its release",
        C::Quickwatch,
        T::Bronze,
        Requirement::episodes(1),
        Rarity::Common,
    ),
    badge(
        "quickwatch_silver",
        "Early Bird",
        "Watch 5 episodes within 24 hours of release",
        C::Quickwatch,
        T::Silver,
        Requirement::episodes(5),
        Rarity::Uncommon,
    ),
    badge(
        "quickwatch_gold",
        "Spoiler Shield",
        "Watch 10 episodes within 24 hours of release",
        C::Quickwatch,
        T::Gold,
        Requirement::episodes(10),
        Rarity::Rare,
    ),
    badge(
        "quickwatch_platinum",
        "Premiere Regular",
        "Watch 25 episodes within 24 hours of release",
        C::Quickwatch,
        T::Platinum,
        Requirement::episodes(25),
        Rarity::Epic,
    ),
    badge(
        "quickwatch_diamond",
        "Day One Devotee",
        "Watch 50 episodes within 24 hours of release",
        C::Quickwatch,
        T::Diamond,
        Requirement::episodes(50),
        Rarity::Legendary,
    ),
    badge(
        "quickwatch_diamond_plus",
        "Always First",
        "Watch 100 episodes within 24 hours of release",
        C::Quickwatch,
        T::Diamond,
        Requirement::episodes(100),
        Rarity::Legendary,
    ),
    // ==================== 马拉松 ====================
    badge(
        "marathon_bronze",
        "Weekly Regular",
        "Watch 20 episodes in a single week",
        C::Marathon,
        T::Bronze,
        Requirement::episodes(20),
        Rarity::Common,
    ),
    badge(
        "marathon_silver",
        "Weekly Runner",
        "Watch 40 episodes in a single week",
        C::Marathon,
        T::Silver,
        Requirement::episodes(40),
        Rarity::Uncommon,
    ),
    badge(
        "marathon_gold",
        "Half Marathon",
        "Watch 60 episodes in a single week",
        C::Marathon,
        T::Gold,
        Requirement::episodes(60),
        Rarity::Rare,
    ),
    badge(
        "marathon_platinum",
        "Full Marathon",
        "Watch 80 episodes in a single week",
        C::Marathon,
        T::Platinum,
        Requirement::episodes(80),
        Rarity::Epic,
    ),
    badge(
        "marathon_diamond",
        "Ultramarathon",
        "Watch 100 episodes in a single week",
        C::Marathon,
        T::Diamond,
        Requirement::episodes(100),
        Rarity::Legendary,
    ),
    // ==================== 连续打卡 ====================
    badge(
        "streak_bronze",
        "Three in a Row",
        "Watch something 3 days in a row",
        C::Streak,
        T::Bronze,
        Requirement::days(3),
        Rarity::Common,
    ),
    badge(
        "streak_silver",
        "Full Week",
        "Watch something 7 days in a row",
        C::Streak,
        T::Silver,
        Requirement::days(7),
        Rarity::Uncommon,
    ),
    badge(
        "streak_gold",
        "Fortnight Focus",
        "Watch something 14 days in a row",
        C::Streak,
        T::Gold,
        Requirement::days(14),
        Rarity::Rare,
    ),
    badge(
        "streak_platinum",
        "Monthly Ritual",
        "Watch something 30 days in a row",
        C::Streak,
        T::Platinum,
        Requirement::days(30),
        Rarity::Epic,
    ),
    badge(
        "streak_diamond",
        "Unbroken",
        "Watch something 60 days in a row",
        C::Streak,
        T::Diamond,
        Requirement::days(60),
        Rarity::Legendary,
    ),
    badge(
        "streak_diamond_100",
        "Centurion",
        "Watch something 100 days in a row",
        C::Streak,
        T::Diamond,
        Requirement::days(100),
        Rarity::Legendary,
    ),
    badge(
        "streak_diamond_365",
        "Year of Screens",
        "Watch something 365 days in a row",
        C::Streak,
        T::Diamond,
        Requirement::days(365),
        Rarity::Legendary,
    ),
    // ==================== 重温 ====================
    badge(
        "rewatch_bronze",
        "Déjà Vu",
        "Rewatch 5 episodes",
        C::Rewatch,
        T::Bronze,
        Requirement::episodes(5),
        Rarity::Common,
    ),
    badge(
        "rewatch_silver",
        "Comfort Show",
        "Rewatch 10 episodes",
        C::Rewatch,
        T::Silver,
        Requirement::episodes(10),
        Rarity::Uncommon,
    ),
    badge(
        "rewatch_gold",
        "Know It by Heart",
        "Rewatch 25 episodes",
        C::Rewatch,
        T::Gold,
        Requirement::episodes(25),
        Rarity::Rare,
    ),
    badge(
        "rewatch_platinum",
        "Quote Machine",
        "Rewatch 50 episodes",
        C::Rewatch,
        T::Platinum,
        Requirement::episodes(50),
        Rarity::Epic,
    ),
    badge(
        "rewatch_diamond",
        "Eternal Rerun",
        "Rewatch 100 episodes",
        C::Rewatch,
        T::Diamond,
        Requirement::episodes(100),
        Rarity::Legendary,
    ),
    // ==================== 探索者 ====================
    badge(
        "series_explorer_bronze",
        "Channel Surfer",
        "Watch 5 different series",
        C::SeriesExplorer,
        T::Bronze,
        Requirement::series(5),
        Rarity::Common,
    ),
    badge(
        "series_explorer_silver",
        "Genre Hopper",
        "Watch 10 different series",
        C::SeriesExplorer,
        T::Silver,
        Requirement::series(10),
        Rarity::Uncommon,
    ),
    badge(
        "series_explorer_gold",
        "Curious Viewer",
        "Watch 25 different series",
        C::SeriesExplorer,
        T::Gold,
        Requirement::series(25),
        Rarity::Rare,
    ),
    badge(
        "series_explorer_platinum",
        "Series Scholar",
        "Watch 50 different series",
        C::SeriesExplorer,
        T::Platinum,
        Requirement::series(50),
        Rarity::Epic,
    ),
    badge(
        "series_explorer_diamond",
        "Walking Encyclopedia",
        "Watch 100 different series",
        C::SeriesExplorer,
        T::Diamond,
        Requirement::series(100),
        Rarity::Legendary,
    ),
    badge(
        "series_explorer_diamond_200",
        "Seen It All",
        "Watch 200 different series",
        C::SeriesExplorer,
        T::Diamond,
        Requirement::series(200),
        Rarity::Legendary,
    ),
    // ==================== 收藏家 ====================
    badge(
        "collector_bronze",
        "First Opinions",
        "Rate 10 series or movies",
        C::Collector,
        T::Bronze,
        Requirement::ratings(10),
        Rarity::Common,
    ),
    badge(
        "collector_silver",
        "Armchair Critic",
        "Rate 25 series or movies",
        C::Collector,
        T::Silver,
        Requirement::ratings(25),
        Rarity::Uncommon,
    ),
    badge(
        "collector_gold",
        "Taste Maker",
        "Rate 50 series or movies",
        C::Collector,
        T::Gold,
        Requirement::ratings(50),
        Rarity::Rare,
    ),
    badge(
        "collector_platinum",
        "Archivist",
        "Rate 100 series or movies",
        C::Collector,
        T::Platinum,
        Requirement::ratings(100),
        Rarity::Epic,
    ),
    badge(
        "collector_diamond",
        "Grand Curator",
        "Rate 250 series or movies",
        C::Collector,
        T::Diamond,
        Requirement::ratings(250),
        Rarity::Legendary,
    ),
    // ==================== 社交 ====================
    badge(
        "social_bronze",
        "Plus One",
        "Add your first friend",
        C::Social,
        T::Bronze,
        Requirement::friends(1),
        Rarity::Common,
    ),
    badge(
        "social_silver",
        "Watch Party",
        "Have 3 friends",
        C::Social,
        T::Silver,
        Requirement::friends(3),
        Rarity::Uncommon,
    ),
    badge(
        "social_gold",
        "Group Chat",
        "Have 5 friends",
        C::Social,
        T::Gold,
        Requirement::friends(5),
        Rarity::Rare,
    ),
    badge(
        "social_platinum",
        "Screening Room",
        "Have 10 friends",
        C::Social,
        T::Platinum,
        Requirement::friends(10),
        Rarity::Epic,
    ),
    badge(
        "social_diamond",
        "Festival Host",
        "Have 25 friends",
        C::Social,
        T::Diamond,
        Requirement::friends(25),
        Rarity::Legendary,
    ),
];

/// 全部徽章定义（按分类、等级排列）
pub fn definitions() -> &'static [Badge] {
    BADGES
}

/// 按 ID 查找徽章
pub fn find_by_id(id: &str) -> Option<&'static Badge> {
    BADGES.iter().find(|badge| badge.id == id)
}

/// 某分类下的全部徽章
pub fn by_category(category: BadgeCategory) -> impl Iterator<Item = &'static Badge> {
    BADGES.iter().filter(move |badge| badge.category == category)
}

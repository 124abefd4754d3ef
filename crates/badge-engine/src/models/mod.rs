//! 徽章引擎领域模型

pub mod badge;
pub mod content;
pub mod counters;
pub mod enums;
pub mod progress;

pub use badge::{Badge, EarnedBadge, EarnedBadgeRecord, Requirement};
pub use content::{EpisodeRecord, MovieRecord, SeasonRecord, SeriesRecord, UserContent};
pub use counters::{BingeWindow, CounterSnapshot, MarathonWeeks, StreakState, iso_week_key};
pub use enums::{
    BadgeCategory, BadgeTier, BingeTimeframe, Rarity, RequirementKind, SocialCounterKind,
};
pub use progress::BadgeProgress;

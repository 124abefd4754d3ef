//! 观看徽章引擎
//!
//! 追踪用户的观看、评分与社交行为，按徽章目录评估并授予成就徽章。
//!
//! ## 核心功能
//!
//! - **徽章目录**：编译期确定的全部徽章定义，覆盖连刷、抢鲜、马拉松、连续打卡、
//!   重温、探索者、收藏家、社交八个分类
//! - **计数器**：观看/社交钩子触发的计数器写入，写入失败只记录日志，不影响调用方
//! - **评估引擎**：聚合用户数据，授予新达成的徽章，计算未获得徽章的实时进度
//!
//! ## 模块结构
//!
//! - `catalog`: 徽章目录
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `clock`: 时钟抽象与时区换算
//! - `store`: 键值存储抽象及内存、Redis 实现
//! - `repository`: 观看内容与社交关系仓储
//! - `counter`: 计数器服务
//! - `engine`: 评估引擎与用户引擎注册表
//! - `cli`: badge-cli 命令行

pub mod catalog;
pub mod cli;
pub mod clock;
pub mod counter;
pub mod engine;
pub mod error;
pub mod models;
pub mod repository;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use counter::CounterService;
pub use engine::{BadgeEngine, EngineContext, EngineRegistry, UserBadgeData};
pub use error::{BadgeError, Result};
pub use models::*;
pub use repository::{
    ContentRepository, SocialGraphRepository, StoreContentRepository, StoreSocialGraphRepository,
};
pub use store::{KeyValueStore, KeyValueStoreExt, MemoryStore, RedisStore, StorePath};

//! 徽章评估引擎

pub mod aggregate;
pub mod cache;
pub mod evaluator;
pub mod registry;
pub mod service;

pub use aggregate::UserBadgeData;
pub use evaluator::{evaluate, measure};
pub use registry::EngineRegistry;
pub use service::{BadgeEngine, EngineContext};

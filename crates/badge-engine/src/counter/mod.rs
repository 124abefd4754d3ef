//! 用户计数器
//!
//! 观看、评分、社交行为触发的计数器写入，以及徽章评估使用的计数器读取

pub mod service;

pub use service::{CounterService, names};

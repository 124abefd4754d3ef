//! 共享库
//!
//! 包含徽章引擎与命令行工具共用的配置、可观测性与重试等基础设施代码。

pub mod config;
pub mod observability;
pub mod retry;

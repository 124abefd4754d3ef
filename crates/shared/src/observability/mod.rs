//! 统一可观测性模块
//!
//! 提供 logging 与 metrics 的统一初始化。
//! 引擎和命令行工具通过单一入口点配置可观测性，确保一致的日志格式和指标命名。

pub mod metrics;
pub mod tracing;

use ::tracing::info;
use anyhow::Result;

use crate::config::ObservabilityConfig;

/// 统一初始化可观测性
///
/// 初始化顺序：
/// 1. Tracing（日志）
/// 2. Metrics（指标描述注册，recorder 由宿主应用安装）
///
/// # Example
///
/// ```ignore
/// use badge_shared::{config::AppConfig, observability};
///
/// let config = AppConfig::load("badge-cli")?;
/// observability::init(&config.service_name, &config.observability)?;
/// ```
pub fn init(service_name: &str, config: &ObservabilityConfig) -> Result<()> {
    tracing::init(config)?;

    if config.metrics_enabled {
        metrics::describe_engine_metrics();
    }

    info!(
        service = %service_name,
        log_format = %config.log_format,
        metrics_enabled = config.metrics_enabled,
        "Observability initialized"
    );

    Ok(())
}

//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Redis 配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
    /// 所有存储路径的统一前缀，便于多个环境共用一个实例
    pub key_prefix: String,
    /// 乐观事务（CAS）冲突时的最大尝试次数
    pub max_transaction_attempts: u32,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            key_prefix: "watchbadges:".to_string(),
            max_transaction_attempts: 25,
        }
    }
}

/// 徽章引擎配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 聚合数据、已获得徽章、进度三类缓存共用的 TTL
    pub cache_ttl_seconds: u64,
    /// 计算连续观看天数时使用的用户时区（IANA 名称）
    pub timezone: String,
    /// 新徽章写入失败时的最大重试次数
    pub commit_max_retries: u32,
    /// 写入重试的初始退避时间
    pub commit_initial_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: 1800,
            timezone: "UTC".to_string(),
            commit_max_retries: 3,
            commit_initial_delay_ms: 200,
        }
    }
}

impl EngineConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn commit_initial_delay(&self) -> Duration {
        Duration::from_millis(self.commit_initial_delay_ms)
    }
}

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// 日志输出格式：json（结构化）或 pretty（人类可读）
    pub log_format: String,
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: true,
        }
    }
}

impl ObservabilityConfig {
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub redis: RedisConfig,
    pub engine: EngineConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（BADGE_ 前缀，双下划线分隔层级，如 BADGE_REDIS__URL -> redis.url）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("BADGE_ENV").unwrap_or_else(|_| "development".to_string());

        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env.clone())?
            .add_source(File::from(Path::new(&config_dir).join("default.toml")).required(false))
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", env))).required(false),
            )
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", service_name)))
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("BADGE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.engine.cache_ttl_seconds, 1800);
        assert_eq!(config.engine.cache_ttl(), Duration::from_secs(30 * 60));
        assert_eq!(config.engine.timezone, "UTC");
        assert_eq!(config.redis.key_prefix, "watchbadges:");
    }

    #[test]
    fn test_partial_engine_section_keeps_defaults() {
        let config: AppConfig = Config::builder()
            .add_source(config::File::from_str(
                "[engine]\ntimezone = \"Europe/Berlin\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.engine.timezone, "Europe/Berlin");
        assert_eq!(config.engine.commit_max_retries, 3);
        assert_eq!(config.redis.max_transaction_attempts, 25);
    }

    #[test]
    fn test_log_format() {
        let mut obs = ObservabilityConfig::default();
        assert!(!obs.json_logs());
        obs.log_format = "JSON".to_string();
        assert!(obs.json_logs());
    }
}

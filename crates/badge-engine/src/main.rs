//! badge-cli
//!
//! 徽章引擎的命令行入口，结果以 JSON 输出到标准输出。

use anyhow::Context;
use clap::Parser;

use badge_engine::cli::{Cli, CommandRunner, Commands};
use badge_shared::config::AppConfig;
use badge_shared::observability;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load("badge-cli").context("加载配置失败")?;
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    if let Some(url) = cli.redis_url {
        config.redis.url = url;
    }
    observability::init(&config.service_name, &config.observability)?;

    let runner = CommandRunner::connect(&config).await?;

    let output = match cli.command {
        Commands::Check { user_id } => runner.run_check(&user_id).await?,
        Commands::Progress { user_id, badge } => {
            runner.run_progress(&user_id, badge.as_deref()).await?
        }
        Commands::Badges { user_id } => runner.run_badges(&user_id).await?,
        Commands::Recalculate { user_id } => runner.run_recalculate(&user_id).await?,
        Commands::Finalize { user_id } => runner.run_finalize(&user_id).await?,
        Commands::Record {
            user_id,
            event,
            count,
            aired_hours_ago,
        } => {
            runner
                .run_record(&user_id, event, count, aired_hours_ago)
                .await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

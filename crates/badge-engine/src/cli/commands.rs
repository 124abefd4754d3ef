//! CLI 命令定义
//!
//! 使用 clap derive 宏定义命令行接口结构，每个子命令对应一个引擎或计数器操作。

use clap::{Parser, Subcommand, ValueEnum};

/// 徽章引擎命令行工具
///
/// 针对配置中的 Redis 存储执行徽章评估、进度查询和计数器维护。
#[derive(Parser, Debug)]
#[command(name = "badge-cli")]
#[command(version, about = "观看徽章引擎运维工具")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别，覆盖配置文件 (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Redis 地址，覆盖配置文件
    #[arg(long)]
    pub redis_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 检查并授予新徽章
    Check {
        #[arg(short, long)]
        user_id: String,
    },

    /// 查看未获得徽章的进度
    Progress {
        #[arg(short, long)]
        user_id: String,

        /// 只查看指定徽章
        #[arg(short, long)]
        badge: Option<String>,
    },

    /// 查看已获得的徽章
    Badges {
        #[arg(short, long)]
        user_id: String,
    },

    /// 清空缓存后重新评估全部徽章（数据回填时使用）
    Recalculate {
        #[arg(short, long)]
        user_id: String,
    },

    /// 清理已过期的连刷窗口
    Finalize {
        #[arg(short, long)]
        user_id: String,
    },

    /// 手动写入计数器事件
    Record {
        #[arg(short, long)]
        user_id: String,

        #[arg(short, long, value_enum)]
        event: RecordEvent,

        /// 重复次数
        #[arg(short, long, default_value = "1")]
        count: u32,

        /// 剧集播出距今的小时数（仅 episode 事件，用于抢鲜统计）
        #[arg(long)]
        aired_hours_ago: Option<i64>,
    },
}

/// 可手动写入的计数器事件
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordEvent {
    /// 观看一集
    Episode,
    FriendRequestSent,
    FriendRequestAccepted,
    FriendAdded,
}

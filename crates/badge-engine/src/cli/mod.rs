//! badge-cli 命令行
//!
//! ```bash
//! # 检查并授予新徽章
//! badge-cli check -u user-001
//!
//! # 查看进度
//! badge-cli progress -u user-001 -b binge_10h_bronze
//!
//! # 写入 3 集观看记录（播出 2 小时后观看）
//! badge-cli record -u user-001 -e episode -c 3 --aired-hours-ago 2
//! ```

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands, RecordEvent};
pub use runner::CommandRunner;

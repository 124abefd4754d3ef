//! 仓储 Trait 定义
//!
//! 徽章引擎依赖的外部协作方，便于服务层依赖抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;

use crate::error::Result;
use crate::models::UserContent;

/// 观看内容仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// 获取用户观看过的全部剧集与电影
    async fn load_user_content(&self, user_id: &str) -> Result<UserContent>;
}

/// 社交关系仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SocialGraphRepository: Send + Sync {
    /// 获取用户好友数量
    async fn friend_count(&self, user_id: &str) -> Result<u32>;
}

//! 仓储层
//!
//! 观看内容与社交关系属于外部系统，这里只定义读取接口及基于共享存储的默认实现

pub mod store_repo;
pub mod traits;

pub use store_repo::{StoreContentRepository, StoreSocialGraphRepository};
pub use traits::{ContentRepository, SocialGraphRepository};

#[cfg(test)]
pub use traits::{MockContentRepository, MockSocialGraphRepository};

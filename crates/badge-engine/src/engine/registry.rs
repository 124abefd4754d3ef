//! 用户引擎注册表
//!
//! 按用户 ID 懒加载并持有徽章引擎，生命周期由持有注册表的应用决定

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::service::{BadgeEngine, EngineContext};
use crate::counter::CounterService;
use crate::error::Result;

pub struct EngineRegistry {
    ctx: EngineContext,
    engines: DashMap<String, Arc<BadgeEngine>>,
}

impl EngineRegistry {
    pub fn new(ctx: EngineContext) -> Self {
        Self {
            ctx,
            engines: DashMap::new(),
        }
    }

    /// 获取用户的引擎，不存在时创建
    ///
    /// 并发首次访问时只有一个实例会被保留
    pub fn engine_for(&self, user_id: &str) -> Result<Arc<BadgeEngine>> {
        if let Some(engine) = self.engines.get(user_id) {
            return Ok(engine.clone());
        }

        let engine = Arc::new(BadgeEngine::new(user_id, self.ctx.clone())?);
        let engine = self
            .engines
            .entry(user_id.to_string())
            .or_insert(engine)
            .clone();
        debug!(user_id = %user_id, engines = self.engines.len(), "徽章引擎已创建");
        Ok(engine)
    }

    /// 移除用户的引擎，返回是否存在
    pub fn evict(&self, user_id: &str) -> bool {
        self.engines.remove(user_id).is_some()
    }

    pub fn clear(&self) {
        self.engines.clear();
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// 计数器写入入口，供观看、评分、社交钩子使用
    pub fn counters(&self) -> &CounterService {
        &self.ctx.counters
    }
}

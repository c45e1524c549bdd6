//! 缓存容器装饰器
//!
//! 每个服务名在装饰器的生命周期内至多解析一次：
//! - 缓存按服务名持有一个可重入锁，同名的并发解析会串行化
//! - 只有成功的结果才会被缓存，失败的解析下次会重试
//! - `has` 始终委托给内层容器

use super::{Container, ServiceProviderContainer};
use crate::errors::ContainerError;
use crate::infrastructure::module::Module;
use crate::services::ServiceValue;
use dashmap::DashMap;
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

/// 单个服务名的缓存槽；`None` 表示尚未成功解析
type Slot = Arc<ReentrantMutex<RefCell<Option<ServiceValue>>>>;

pub struct CachingContainer<C> {
    inner: C,
    /// 服务缓存 - 使用DashMap提供更好的并发性能
    cache: DashMap<String, Slot>,
    /// 容器统计信息（内部原子计数器）
    stats: InnerStats,
}

/// 内部容器统计信息（原子计数器）
#[derive(Default)]
struct InnerStats {
    total_resolutions: AtomicUsize,
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
}

impl<C: Container> CachingContainer<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
            stats: InnerStats::default(),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// 服务是否已成功解析并缓存
    pub fn is_cached(&self, key: &str) -> bool {
        // 先释放分片锁再等待槽位锁，否则会与正在解析依赖的 `get` 互相等待
        let slot = match self.cache.get(key) {
            Some(entry) => Arc::clone(entry.value()),
            None => return false,
        };

        let guard = slot.lock();
        let cached = guard.borrow().is_some();
        cached
    }

    /// 获取容器统计信息
    pub fn stats(&self) -> ContainerStats {
        ContainerStats {
            total_resolutions: self.stats.total_resolutions.load(Ordering::Relaxed),
            cache_hits: self.stats.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.stats.cache_misses.load(Ordering::Relaxed),
        }
    }

    fn slot(&self, key: &str) -> Slot {
        // 先克隆出槽位，避免在解析期间持有 DashMap 的分片锁
        self.cache
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(ReentrantMutex::new(RefCell::new(None))))
            .clone()
    }
}

impl CachingContainer<ServiceProviderContainer> {
    /// 为模块构建标准的容器栈：缓存层包裹提供者，
    /// 提供者的依赖经由缓存层解析
    pub fn for_module(module: &dyn Module) -> Arc<Self> {
        Arc::new_cyclic(|this: &Weak<Self>| {
            let root: Weak<dyn Container> = this.clone();
            CachingContainer::new(ServiceProviderContainer::with_root(module, root))
        })
    }
}

impl<C: Container> Container for CachingContainer<C> {
    fn get(&self, key: &str) -> Result<ServiceValue, ContainerError> {
        self.stats.total_resolutions.fetch_add(1, Ordering::Relaxed);

        // 未声明的服务不占用缓存槽位
        if !self.inner.has(key) {
            self.stats.cache_misses.fetch_add(1, Ordering::Relaxed);
            return self.inner.get(key);
        }

        let slot = self.slot(key);
        let guard = slot.lock();

        if let Some(value) = guard.borrow().as_ref() {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            log::debug!("缓存命中: {key}");
            return Ok(value.clone());
        }

        self.stats.cache_misses.fetch_add(1, Ordering::Relaxed);
        let value = self.inner.get(key)?;
        *guard.borrow_mut() = Some(value.clone());
        Ok(value)
    }

    fn has(&self, key: &str) -> bool {
        self.inner.has(key)
    }
}

/// 容器统计信息
#[derive(Debug, Clone)]
pub struct ContainerStats {
    pub total_resolutions: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
}

impl ContainerStats {
    /// 获取总解析次数
    pub fn total(&self) -> usize {
        self.total_resolutions
    }

    /// 获取缓存命中率
    pub fn hit_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.total() as f64
        }
    }
}

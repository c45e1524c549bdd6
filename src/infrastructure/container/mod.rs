//! 服务容器
//!
//! - [`ServiceProviderContainer`]：从模块的工厂与扩展快照解析服务
//! - [`CachingContainer`]：为内层容器的解析结果做记忆化
//! - [`KeyConvertingContainer`]：查找前先转换服务名的容器视图

pub mod caching;
pub mod key_converting;
pub mod provider;

pub use caching::{CachingContainer, ContainerStats};
pub use key_converting::KeyConvertingContainer;
pub use provider::ServiceProviderContainer;

use crate::errors::ContainerError;
use crate::services::ServiceValue;
use std::any::Any;
use std::sync::Arc;

/// 容器接口：按名称解析服务
pub trait Container: Send + Sync {
    /// 解析服务；未声明时返回 `ContainerError::NotFound`
    fn get(&self, key: &str) -> Result<ServiceValue, ContainerError>;

    /// 服务是否可解析
    fn has(&self, key: &str) -> bool;
}

impl<C: Container + ?Sized> Container for &C {
    fn get(&self, key: &str) -> Result<ServiceValue, ContainerError> {
        (**self).get(key)
    }

    fn has(&self, key: &str) -> bool {
        (**self).has(key)
    }
}

impl<C: Container + ?Sized> Container for Arc<C> {
    fn get(&self, key: &str) -> Result<ServiceValue, ContainerError> {
        (**self).get(key)
    }

    fn has(&self, key: &str) -> bool {
        (**self).has(key)
    }
}

/// 类型化的便捷方法
pub trait ContainerExt: Container {
    /// 解析并转换为具体类型
    fn resolve<T: Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>, ContainerError> {
        self.get(key)?.expect_type::<T>(key)
    }

    /// 解析并渲染为字符串
    fn resolve_string(&self, key: &str) -> Result<String, ContainerError> {
        let value = self.get(key)?;
        value.render().ok_or_else(|| ContainerError::NotRenderable {
            key: key.to_string(),
            type_name: value.type_name(),
        })
    }
}

impl<C: Container + ?Sized> ContainerExt for C {}

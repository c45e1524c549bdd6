//! 键转换容器视图
//!
//! 在委托给内层容器之前先转换服务名。主要配合
//! [`KeyConvertingModule`](crate::infrastructure::key_converting::KeyConvertingModule)
//! 使用：被装饰模块的 `run` 可以继续使用原始（未加前缀的）服务名。

use super::Container;
use crate::errors::ContainerError;
use crate::infrastructure::key_converting::KeyTransform;
use crate::services::ServiceValue;

pub struct KeyConvertingContainer<'a> {
    inner: &'a dyn Container,
    transform: KeyTransform,
}

impl<'a> KeyConvertingContainer<'a> {
    pub fn new(inner: &'a dyn Container, transform: KeyTransform) -> Self {
        Self { inner, transform }
    }

    fn actual_key(&self, key: &str) -> String {
        (self.transform)(key)
    }
}

impl Container for KeyConvertingContainer<'_> {
    fn get(&self, key: &str) -> Result<ServiceValue, ContainerError> {
        self.inner.get(&self.actual_key(key))
    }

    fn has(&self, key: &str) -> bool {
        self.inner.has(&self.actual_key(key))
    }
}

//! 键转换模块装饰器
//!
//! 用一个转换函数改写内层模块的所有工厂键、扩展键，以及库内描述符
//! （[`Service`](crate::services::Service) 与 [`Extension`](crate::services::Extension)）
//! 中引用的依赖名，使模块内部的依赖关系在改名后依然成立。
//!
//! 前缀装饰与前缀替换装饰只是两种不同的转换函数。

use super::container::{Container, KeyConvertingContainer};
use super::module::{Module, RunReferences};
use crate::errors::ModuleError;
use crate::services::{ExtensionMap, ServiceMap};
use std::collections::BTreeSet;
use std::sync::Arc;

/// 服务名转换函数
pub type KeyTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// 只为内层模块自己声明的工厂键加前缀；对外部服务的依赖保持不变
pub fn prefix_transform(prefix: impl Into<String>, module: &dyn Module) -> KeyTransform {
    let prefix = prefix.into();
    let declared: BTreeSet<String> = module.factories().into_keys().collect();

    Arc::new(move |key: &str| {
        if declared.contains(key) {
            format!("{prefix}{key}")
        } else {
            key.to_string()
        }
    })
}

/// 把以 `prefix` 开头的键改为以 `replacement` 开头
pub fn prefix_change_transform(prefix: impl Into<String>, replacement: impl Into<String>) -> KeyTransform {
    let prefix = prefix.into();
    let replacement = replacement.into();

    Arc::new(move |key: &str| match key.strip_prefix(prefix.as_str()) {
        Some(rest) => format!("{replacement}{rest}"),
        None => key.to_string(),
    })
}

pub struct KeyConvertingModule<M> {
    module: M,
    transform: KeyTransform,
}

impl<M: Module> KeyConvertingModule<M> {
    pub fn new(module: M, transform: KeyTransform) -> Self {
        Self { module, transform }
    }

    /// 为内层模块声明的工厂键加前缀
    pub fn prefixed(module: M, prefix: impl Into<String>) -> Self {
        let transform = prefix_transform(prefix, &module);
        Self::new(module, transform)
    }

    /// 替换键的前缀
    pub fn prefix_changed(module: M, prefix: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self::new(module, prefix_change_transform(prefix, replacement))
    }

    pub fn inner(&self) -> &M {
        &self.module
    }

    pub fn convert_key(&self, key: &str) -> String {
        (self.transform)(key)
    }
}

impl<M: Module> Module for KeyConvertingModule<M> {
    fn factories(&self) -> ServiceMap {
        let convert = |key: &str| (self.transform)(key);
        self.module
            .factories()
            .iter()
            .map(|(key, service)| (convert(key.as_str()), service.map_keys(&convert)))
            .collect()
    }

    fn extensions(&self) -> ExtensionMap {
        let convert = |key: &str| (self.transform)(key);
        self.module
            .extensions()
            .iter()
            .map(|(key, extension)| (convert(key.as_str()), extension.map_keys(&convert)))
            .collect()
    }

    fn run(&self, container: &dyn Container) -> Result<(), ModuleError> {
        let view = KeyConvertingContainer::new(container, Arc::clone(&self.transform));
        self.module.run(&view)
    }

    fn run_references(&self) -> RunReferences {
        self.module.run_references().map_keys(|key| (self.transform)(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::module::ServiceModule;
    use crate::services::SELF_KEY;

    #[test]
    fn prefix_only_applies_to_declared_factories() {
        let module = ServiceModule::new().factory("name", crate::services::Service::value("x"));
        let transform = prefix_transform("p/", &module);

        assert_eq!(transform("name"), "p/name");
        assert_eq!(transform("global"), "global");
    }

    #[test]
    fn prefix_change_only_touches_matching_keys() {
        let transform = prefix_change_transform("hello/", "hello_time/");

        assert_eq!(transform("hello/name"), "hello_time/name");
        assert_eq!(transform("other/hello/name"), "other/hello/name");
        assert_eq!(transform("hello"), "hello");
    }

    #[test]
    fn self_key_survives_conversion() {
        let module = ServiceModule::new()
            .factory(SELF_KEY, crate::services::Service::value(1u8))
            .factory(
                "uses_container",
                crate::services::Service::factory([SELF_KEY], |_| Ok(())),
            );
        let prefixed = KeyConvertingModule::prefixed(module, "p/");
        let factories = prefixed.factories();

        assert_eq!(factories["p/uses_container"].dependencies(), vec![SELF_KEY]);
    }
}

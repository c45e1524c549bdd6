//! 服务提供者容器
//!
//! 在构造时对模块的工厂与扩展做快照，之后不可变。
//! 可选的根作用域用于依赖解析：提供者位于缓存层之下时，
//! 依赖应当经由顶层（缓存）容器解析，而不是提供者自身。

use super::Container;
use crate::errors::ContainerError;
use crate::infrastructure::module::Module;
use crate::services::{ExtensionMap, ServiceMap, ServiceValue};
use std::sync::{Arc, Weak};

pub struct ServiceProviderContainer {
    factories: ServiceMap,
    extensions: ExtensionMap,
    root: Option<Weak<dyn Container>>,
}

impl ServiceProviderContainer {
    /// 创建以自身为依赖作用域的容器
    pub fn new(module: &dyn Module) -> Self {
        Self::from_maps(module.factories(), module.extensions(), None)
    }

    /// 创建在 `root` 中解析依赖的容器
    pub fn with_root(module: &dyn Module, root: Weak<dyn Container>) -> Self {
        Self::from_maps(module.factories(), module.extensions(), Some(root))
    }

    pub fn from_maps(
        factories: ServiceMap,
        extensions: ExtensionMap,
        root: Option<Weak<dyn Container>>,
    ) -> Self {
        log::debug!(
            "创建服务提供者容器: {} 个工厂, {} 个扩展",
            factories.len(),
            extensions.len()
        );
        Self {
            factories,
            extensions,
            root,
        }
    }

    /// 已声明的服务名
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    fn resolve_in(&self, key: &str, scope: &dyn Container) -> Result<ServiceValue, ContainerError> {
        let factory = self
            .factories
            .get(key)
            .ok_or_else(|| ContainerError::NotFound(key.to_string()))?;

        let value = factory.compute(scope).map_err(|e| e.for_service(key))?;

        match self.extensions.get(key) {
            Some(extension) => extension
                .compute(scope, value)
                .map_err(|e| e.for_service(key)),
            None => Ok(value),
        }
    }
}

impl Container for ServiceProviderContainer {
    fn get(&self, key: &str) -> Result<ServiceValue, ContainerError> {
        if !self.has(key) {
            return Err(ContainerError::NotFound(key.to_string()));
        }

        log::debug!("解析服务: {key}");

        match &self.root {
            Some(root) => {
                let scope: Arc<dyn Container> = root
                    .upgrade()
                    .ok_or_else(|| ContainerError::ScopeUnavailable(key.to_string()))?;
                self.resolve_in(key, &*scope)
            }
            None => self.resolve_in(key, self),
        }
    }

    fn has(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::container::ContainerExt;
    use crate::services::{Extension, Service};
    use std::collections::BTreeMap;

    fn provider(factories: Vec<(&str, Service)>, extensions: Vec<(&str, Extension)>) -> ServiceProviderContainer {
        ServiceProviderContainer::from_maps(
            factories.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            extensions.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            None,
        )
    }

    #[test]
    fn missing_service_is_not_found() {
        let container = provider(vec![], vec![]);
        assert!(container.get("nope").unwrap_err().is_not_found());
        assert!(!container.has("nope"));
    }

    #[test]
    fn extension_alone_does_not_make_a_service_resolvable() {
        let container = provider(
            vec![],
            vec![("x", Extension::new(Vec::<String>::new(), |prev, _| Ok(prev)))],
        );
        assert!(!container.has("x"));
        assert!(container.get("x").unwrap_err().is_not_found());
    }

    #[test]
    fn factory_result_is_passed_through_extension() {
        let container = provider(
            vec![("n", Service::value(2i64))],
            vec![(
                "n",
                Extension::new(Vec::<String>::new(), |prev, _| {
                    let n = prev.downcast::<i64>().unwrap_or_default();
                    Ok(*n * 10)
                }),
            )],
        );
        assert_eq!(*container.resolve::<i64>("n").unwrap(), 20);
    }

    #[test]
    fn dependencies_resolve_in_declared_order() {
        let container = provider(
            vec![
                ("a", Service::value("A")),
                ("b", Service::value("B")),
                (
                    "ab",
                    Service::factory(["b", "a"], |args| {
                        Ok(format!("{}{}", args.get::<&str>(0)?, args.get::<&str>(1)?))
                    }),
                ),
            ],
            vec![],
        );
        assert_eq!(container.resolve_string("ab").unwrap(), "BA");
    }

    #[test]
    fn self_key_passes_the_container() {
        let container = provider(
            vec![
                ("flag", Service::value(true)),
                (
                    "pick",
                    Service::factory(["c"], |args| {
                        let c = args.container(0)?;
                        Ok(if c.has("flag") { "yes" } else { "no" })
                    }),
                ),
            ],
            vec![],
        );
        assert_eq!(container.resolve_string("pick").unwrap(), "yes");
    }

    #[test]
    fn callback_failures_name_the_service() {
        let container = provider(
            vec![("bad", Service::factory(Vec::<String>::new(), |_| -> anyhow::Result<u8> {
                anyhow::bail!("cannot connect")
            }))],
            vec![],
        );
        match container.get("bad") {
            Err(ContainerError::ServiceFailed { key, .. }) => assert_eq!(key, "bad"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn dropped_root_is_reported() {
        let root: Arc<dyn Container> = Arc::new(provider(vec![], vec![]));
        let weak = Arc::downgrade(&root);
        drop(root);

        let container = ServiceProviderContainer::from_maps(
            BTreeMap::from([("x".to_string(), Service::value(1u8))]),
            BTreeMap::new(),
            Some(weak),
        );
        assert!(matches!(container.get("x"), Err(ContainerError::ScopeUnavailable(_))));
    }
}

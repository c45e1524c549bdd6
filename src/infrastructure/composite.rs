//! 组合模块
//!
//! 把一组有序的子模块聚合为一个模块：
//! - 工厂按子模块顺序拼接，同名时后者覆盖前者（此处不检测重复）
//! - 同名扩展按子模块顺序串联成一条链
//! - `run` 按顺序依次运行每个子模块

use super::container::Container;
use super::module::{Module, RunReferences};
use crate::errors::ModuleError;
use crate::services::{ExtensionMap, ServiceMap};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct CompositeModule {
    modules: Vec<Arc<dyn Module>>,
}

impl CompositeModule {
    pub fn new<I>(modules: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Module>>,
    {
        Self {
            modules: modules.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn modules(&self) -> &[Arc<dyn Module>] {
        &self.modules
    }
}

impl FromIterator<Arc<dyn Module>> for CompositeModule {
    fn from_iter<T: IntoIterator<Item = Arc<dyn Module>>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl Module for CompositeModule {
    fn factories(&self) -> ServiceMap {
        let mut factories = ServiceMap::new();
        for module in &self.modules {
            for (key, service) in module.factories() {
                if factories.insert(key.clone(), service).is_some() {
                    log::debug!("工厂 '{key}' 被后续模块覆盖");
                }
            }
        }
        factories
    }

    fn extensions(&self) -> ExtensionMap {
        let mut extensions = ExtensionMap::new();
        for module in &self.modules {
            for (key, extension) in module.extensions() {
                let merged = match extensions.remove(&key) {
                    Some(current) => current.then(&extension),
                    None => extension,
                };
                extensions.insert(key, merged);
            }
        }
        extensions
    }

    fn run(&self, container: &dyn Container) -> Result<(), ModuleError> {
        for (index, module) in self.modules.iter().enumerate() {
            log::debug!("运行第 {} 个子模块", index + 1);
            module.run(container)?;
        }
        Ok(())
    }

    fn run_references(&self) -> RunReferences {
        self.modules
            .iter()
            .fold(RunReferences::none(), |refs, module| refs.merge(module.run_references()))
    }
}

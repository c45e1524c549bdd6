//! 模块抽象层
//!
//! 模块声明一组工厂、一组对其它模块服务的扩展，并可以在容器就绪后运行。

use super::container::Container;
use crate::errors::ModuleError;
use crate::services::{Extension, ExtensionMap, Service, ServiceMap};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// 模块在 `run` 中直接使用的服务名
///
/// 检查器把这些服务视为"已使用"。未声明的模块无法被完整检查，
/// 检查器会为其给出诊断。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReferences {
    keys: BTreeSet<String>,
    /// 未声明 run 引用的模块数量
    undeclared: usize,
}

impl RunReferences {
    /// `run` 不使用任何服务
    pub fn none() -> Self {
        Self::default()
    }

    pub fn declared<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            undeclared: 0,
        }
    }

    /// 模块没有声明它在 `run` 中使用的服务
    pub fn undeclared() -> Self {
        Self {
            keys: BTreeSet::new(),
            undeclared: 1,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn undeclared_count(&self) -> usize {
        self.undeclared
    }

    pub fn is_complete(&self) -> bool {
        self.undeclared == 0
    }

    /// 合并另一个模块的引用
    pub fn merge(mut self, other: RunReferences) -> Self {
        self.keys.extend(other.keys);
        self.undeclared += other.undeclared;
        self
    }

    pub fn map_keys(self, convert: impl Fn(&str) -> String) -> Self {
        Self {
            keys: self.keys.iter().map(|k| convert(k)).collect(),
            undeclared: self.undeclared,
        }
    }
}

/// 模块接口
pub trait Module: Send + Sync {
    /// 模块声明的工厂
    fn factories(&self) -> ServiceMap;

    /// 模块声明的扩展
    fn extensions(&self) -> ExtensionMap {
        ExtensionMap::new()
    }

    /// 运行模块
    fn run(&self, _container: &dyn Container) -> Result<(), ModuleError> {
        Ok(())
    }

    /// `run` 中直接使用的服务
    fn run_references(&self) -> RunReferences {
        RunReferences::undeclared()
    }
}

impl<M: Module + ?Sized> Module for Arc<M> {
    fn factories(&self) -> ServiceMap {
        (**self).factories()
    }

    fn extensions(&self) -> ExtensionMap {
        (**self).extensions()
    }

    fn run(&self, container: &dyn Container) -> Result<(), ModuleError> {
        (**self).run(container)
    }

    fn run_references(&self) -> RunReferences {
        (**self).run_references()
    }
}

impl<M: Module + ?Sized> Module for Box<M> {
    fn factories(&self) -> ServiceMap {
        (**self).factories()
    }

    fn extensions(&self) -> ExtensionMap {
        (**self).extensions()
    }

    fn run(&self, container: &dyn Container) -> Result<(), ModuleError> {
        (**self).run(container)
    }

    fn run_references(&self) -> RunReferences {
        (**self).run_references()
    }
}

type RunFn = Arc<dyn Fn(&dyn Container) -> Result<(), ModuleError> + Send + Sync>;

/// 以构建器方式声明的模块
#[derive(Clone, Default)]
pub struct ServiceModule {
    factories: ServiceMap,
    extensions: ExtensionMap,
    run: Option<RunFn>,
    uses: BTreeSet<String>,
}

impl ServiceModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// 声明工厂；同名工厂后者覆盖前者
    pub fn factory(mut self, key: impl Into<String>, service: Service) -> Self {
        self.factories.insert(key.into(), service);
        self
    }

    /// 声明扩展；同名扩展在本模块内按声明顺序串联
    pub fn extension(mut self, key: impl Into<String>, extension: Extension) -> Self {
        let key = key.into();
        let merged = match self.extensions.remove(&key) {
            Some(existing) => existing.then(&extension),
            None => extension,
        };
        self.extensions.insert(key, merged);
        self
    }

    /// 设置 `run` 行为以及它直接使用的服务
    pub fn on_run<I, S, F>(mut self, uses: I, run: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&dyn Container) -> Result<(), ModuleError> + Send + Sync + 'static,
    {
        self.uses.extend(uses.into_iter().map(Into::into));
        self.run = Some(Arc::new(run));
        self
    }
}

impl Module for ServiceModule {
    fn factories(&self) -> ServiceMap {
        self.factories.clone()
    }

    fn extensions(&self) -> ExtensionMap {
        self.extensions.clone()
    }

    fn run(&self, container: &dyn Container) -> Result<(), ModuleError> {
        match &self.run {
            Some(run) => run(container),
            None => Ok(()),
        }
    }

    fn run_references(&self) -> RunReferences {
        RunReferences::declared(self.uses.iter().cloned())
    }
}

impl fmt::Debug for ServiceModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceModule")
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .field("extensions", &self.extensions.keys().collect::<Vec<_>>())
            .field("uses", &self.uses)
            .finish()
    }
}

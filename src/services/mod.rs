//! 服务描述符
//!
//! 服务描述符声明了计算一个服务所需的依赖名称以及实际的回调。
//! 依赖对外可见，因此模块检查器可以在不执行任何回调的情况下
//! 构建依赖图，键转换装饰器也可以重写内部引用。

pub mod args;
pub mod callback;
pub mod template;
pub mod value;

pub use args::{Arg, Args};
pub use callback::Invocable;
pub use template::Template;
pub use value::ServiceValue;

use crate::errors::ContainerError;
use crate::infrastructure::container::Container;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// 保留的依赖名：解析为容器本身而不是查找服务
pub const SELF_KEY: &str = "c";

/// 服务名 → 服务描述符
pub type ServiceMap = BTreeMap<String, Service>;

/// 服务名 → 扩展
pub type ExtensionMap = BTreeMap<String, Extension>;

pub type FactoryFn = Arc<dyn Fn(&Args<'_>) -> anyhow::Result<ServiceValue> + Send + Sync>;

pub type ExtensionFn =
    Arc<dyn Fn(ServiceValue, &Args<'_>) -> anyhow::Result<ServiceValue> + Send + Sync>;

/// 重写单个依赖名；保留名 [`SELF_KEY`] 永远不会被重写
pub(crate) fn convert_key(key: &str, convert: &dyn Fn(&str) -> String) -> String {
    if key == SELF_KEY {
        key.to_string()
    } else {
        convert(key)
    }
}

fn convert_keys(keys: &[String], convert: &dyn Fn(&str) -> String) -> Vec<String> {
    keys.iter().map(|k| convert_key(k, convert)).collect()
}

/// 依赖驱动的工厂
#[derive(Clone)]
pub struct Factory {
    deps: Vec<String>,
    callback: FactoryFn,
}

impl Factory {
    pub fn new<I, S, F, T>(deps: I, callback: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Args<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        Self {
            deps: deps.into_iter().map(Into::into).collect(),
            callback: Arc::new(move |args: &Args<'_>| callback(args).map(ServiceValue::new)),
        }
    }

    pub fn dependencies(&self) -> &[String] {
        &self.deps
    }

    /// 以新的依赖列表重建工厂，回调共享
    pub fn with_dependencies(&self, deps: Vec<String>) -> Self {
        Self {
            deps,
            callback: Arc::clone(&self.callback),
        }
    }

    pub fn compute(&self, scope: &dyn Container) -> Result<ServiceValue, ContainerError> {
        let args = Args::resolve(&self.deps, scope)?;
        (self.callback)(&args).map_err(ContainerError::Callback)
    }

    /// 解析依赖并绑定回调，推迟到调用时执行
    pub fn bind(&self, scope: &dyn Container) -> Result<ServiceValue, ContainerError> {
        let args = Args::resolve(&self.deps, scope)?.into_owned()?;
        Ok(ServiceValue::new(Invocable::bind(Arc::clone(&self.callback), args)))
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory").field("deps", &self.deps).finish_non_exhaustive()
    }
}

/// 服务别名，可选地在目标不存在时回退到默认工厂
#[derive(Debug, Clone)]
pub struct Alias {
    key: String,
    default: Option<Factory>,
}

impl Alias {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            default: None,
        }
    }

    pub fn with_default(key: impl Into<String>, default: Factory) -> Self {
        Self {
            key: key.into(),
            default: Some(default),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn default(&self) -> Option<&Factory> {
        self.default.as_ref()
    }

    pub fn compute(&self, scope: &dyn Container) -> Result<ServiceValue, ContainerError> {
        match &self.default {
            Some(default) if !scope.has(&self.key) => default.compute(scope),
            _ => scope.get(&self.key),
        }
    }
}

/// 服务描述符
#[derive(Debug, Clone)]
pub enum Service {
    /// 常量值，无依赖
    Value(ServiceValue),
    /// 由依赖计算的工厂
    Factory(Factory),
    /// 解析为 [`Invocable`] 的惰性回调
    Callback(Factory),
    /// 指向另一个服务
    Alias(Alias),
    /// 字符串插值
    Template(Template),
}

impl Service {
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Service::Value(ServiceValue::new(value))
    }

    pub fn factory<I, S, F, T>(deps: I, callback: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Args<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        Service::Factory(Factory::new(deps, callback))
    }

    pub fn callback<I, S, F, T>(deps: I, callback: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Args<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        Service::Callback(Factory::new(deps, callback))
    }

    pub fn alias(key: impl Into<String>) -> Self {
        Service::Alias(Alias::new(key))
    }

    pub fn alias_or(key: impl Into<String>, default: Factory) -> Self {
        Service::Alias(Alias::with_default(key, default))
    }

    pub fn template<I, P, K>(template: impl Into<String>, placeholders: I) -> Self
    where
        I: IntoIterator<Item = (P, K)>,
        P: Into<String>,
        K: Into<String>,
    {
        Service::Template(Template::new(template, placeholders))
    }

    /// 计算服务值
    pub fn compute(&self, scope: &dyn Container) -> Result<ServiceValue, ContainerError> {
        match self {
            Service::Value(value) => Ok(value.clone()),
            Service::Factory(factory) => factory.compute(scope),
            Service::Callback(factory) => factory.bind(scope),
            Service::Alias(alias) => alias.compute(scope),
            Service::Template(template) => template.compute(scope),
        }
    }

    /// 必须存在的依赖（按声明顺序）
    pub fn dependencies(&self) -> Vec<&str> {
        match self {
            Service::Value(_) => Vec::new(),
            Service::Factory(factory) | Service::Callback(factory) => {
                factory.dependencies().iter().map(String::as_str).collect()
            }
            Service::Alias(alias) => match alias.default() {
                Some(default) => default.dependencies().iter().map(String::as_str).collect(),
                None => vec![alias.key()],
            },
            Service::Template(template) => template.dependencies().collect(),
        }
    }

    /// 所有引用到的服务名，包括带默认值的别名目标
    pub fn references(&self) -> Vec<&str> {
        let mut refs = self.dependencies();
        if let Service::Alias(alias) = self {
            if alias.default().is_some() {
                refs.push(alias.key());
            }
        }
        refs
    }

    /// 以重写后的依赖名重建描述符，原描述符不变
    pub fn map_keys(&self, convert: &dyn Fn(&str) -> String) -> Self {
        match self {
            Service::Value(value) => Service::Value(value.clone()),
            Service::Factory(factory) => {
                Service::Factory(factory.with_dependencies(convert_keys(factory.dependencies(), convert)))
            }
            Service::Callback(factory) => {
                Service::Callback(factory.with_dependencies(convert_keys(factory.dependencies(), convert)))
            }
            Service::Alias(alias) => Service::Alias(Alias {
                key: convert_key(alias.key(), convert),
                default: alias
                    .default()
                    .map(|d| d.with_dependencies(convert_keys(d.dependencies(), convert))),
            }),
            Service::Template(template) => Service::Template(template.map_keys(convert)),
        }
    }
}

/// 扩展链中的一环
#[derive(Clone)]
enum ExtensionLink {
    /// 接收先前值的回调
    Callback { deps: Vec<String>, callback: ExtensionFn },
    /// 忽略先前值，直接计算另一个描述符
    Replace(Service),
}

impl ExtensionLink {
    fn dependencies(&self) -> Vec<&str> {
        match self {
            ExtensionLink::Callback { deps, .. } => deps.iter().map(String::as_str).collect(),
            ExtensionLink::Replace(service) => service.dependencies(),
        }
    }

    fn map_keys(&self, convert: &dyn Fn(&str) -> String) -> Self {
        match self {
            ExtensionLink::Callback { deps, callback } => ExtensionLink::Callback {
                deps: convert_keys(deps, convert),
                callback: Arc::clone(callback),
            },
            ExtensionLink::Replace(service) => ExtensionLink::Replace(service.map_keys(convert)),
        }
    }

    fn compute(
        &self,
        scope: &dyn Container,
        previous: ServiceValue,
    ) -> Result<ServiceValue, ContainerError> {
        match self {
            ExtensionLink::Callback { deps, callback } => {
                let args = Args::resolve(deps, scope)?;
                callback(previous, &args).map_err(ContainerError::Callback)
            }
            ExtensionLink::Replace(service) => service.compute(scope),
        }
    }
}

/// 服务扩展：接收同名服务先前计算出的值并返回替换值
///
/// 多个扩展可以首尾相连组成一条链，按声明顺序依次应用。
#[derive(Clone)]
pub struct Extension {
    links: Vec<ExtensionLink>,
}

impl Extension {
    pub fn new<I, S, F, T>(deps: I, callback: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(ServiceValue, &Args<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        let callback: ExtensionFn = Arc::new(move |prev: ServiceValue, args: &Args<'_>| {
            callback(prev, args).map(ServiceValue::new)
        });
        Self {
            links: vec![ExtensionLink::Callback {
                deps: deps.into_iter().map(Into::into).collect(),
                callback,
            }],
        }
    }

    /// 用另一个描述符的结果替换先前的值
    pub fn replace(service: Service) -> Self {
        Self {
            links: vec![ExtensionLink::Replace(service)],
        }
    }

    /// 将 `next` 接在本扩展之后，返回新的扩展链
    pub fn then(&self, next: &Extension) -> Self {
        let mut links = self.links.clone();
        links.extend(next.links.iter().cloned());
        Self { links }
    }

    /// 链长度
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// 链上所有环节的依赖
    pub fn dependencies(&self) -> Vec<&str> {
        self.links.iter().flat_map(ExtensionLink::dependencies).collect()
    }

    pub fn map_keys(&self, convert: &dyn Fn(&str) -> String) -> Self {
        Self {
            links: self.links.iter().map(|link| link.map_keys(convert)).collect(),
        }
    }

    /// 依次应用扩展链
    pub fn compute(
        &self,
        scope: &dyn Container,
        previous: ServiceValue,
    ) -> Result<ServiceValue, ContainerError> {
        let mut value = previous;
        for (position, link) in self.links.iter().enumerate() {
            log::trace!("应用扩展 #{} ({} 个)", position + 1, self.links.len());
            value = link.compute(scope, value)?;
        }
        Ok(value)
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let deps: Vec<Vec<&str>> = self.links.iter().map(ExtensionLink::dependencies).collect();
        f.debug_struct("Extension").field("links", &deps).finish()
    }
}

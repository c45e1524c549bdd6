//! 依赖参数列表
//!
//! 按声明顺序（从左到右）解析依赖，保留位置信息传给回调。

use super::value::ServiceValue;
use super::SELF_KEY;
use crate::errors::ContainerError;
use crate::infrastructure::container::Container;
use std::any::Any;
use std::sync::Arc;

/// 单个已解析的参数
#[derive(Clone)]
pub enum Arg<'a> {
    /// 普通服务值
    Service(ServiceValue),
    /// 保留依赖名 [`SELF_KEY`] 对应的容器本身
    Container(&'a dyn Container),
}

/// 按位置排列的已解析依赖
pub struct Args<'a> {
    keys: Vec<String>,
    items: Vec<Arg<'a>>,
}

impl<'a> Args<'a> {
    /// 在给定作用域内依次解析 `deps`
    pub fn resolve(deps: &[String], scope: &'a dyn Container) -> Result<Self, ContainerError> {
        let mut items = Vec::with_capacity(deps.len());
        for key in deps {
            let arg = if key == SELF_KEY {
                Arg::Container(scope)
            } else {
                Arg::Service(scope.get(key)?)
            };
            items.push(arg);
        }

        Ok(Self {
            keys: deps.to_vec(),
            items,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 第 `index` 个依赖的服务名
    pub fn key(&self, index: usize) -> Option<&str> {
        self.keys.get(index).map(String::as_str)
    }

    fn arg(&self, index: usize) -> Result<&Arg<'a>, ContainerError> {
        self.items.get(index).ok_or(ContainerError::ArgumentOutOfRange {
            index,
            len: self.items.len(),
        })
    }

    /// 原始服务值
    pub fn value(&self, index: usize) -> Result<ServiceValue, ContainerError> {
        match self.arg(index)? {
            Arg::Service(value) => Ok(value.clone()),
            Arg::Container(_) => Err(ContainerError::TypeMismatch {
                key: SELF_KEY.to_string(),
                expected: std::any::type_name::<ServiceValue>(),
                actual: "container",
            }),
        }
    }

    /// 按类型取出第 `index` 个依赖
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>, ContainerError> {
        let value = self.value(index)?;
        value.expect_type::<T>(&self.keys[index])
    }

    /// 取出容器本身（依赖名为 [`SELF_KEY`] 的位置）
    pub fn container(&self, index: usize) -> Result<&'a dyn Container, ContainerError> {
        match self.arg(index)? {
            Arg::Container(container) => Ok(*container),
            Arg::Service(_) => Err(ContainerError::NotAContainer { index }),
        }
    }

    /// 脱离解析作用域，供之后调用的回调持有；容器本身无法被持有
    pub fn into_owned(self) -> Result<Args<'static>, ContainerError> {
        let items = self
            .items
            .into_iter()
            .enumerate()
            .map(|(index, arg)| match arg {
                Arg::Service(value) => Ok(Arg::Service(value)),
                Arg::Container(_) => Err(ContainerError::ContainerNotRetainable { index }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Args {
            keys: self.keys,
            items,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arg<'a>)> {
        self.keys.iter().map(String::as_str).zip(self.items.iter())
    }
}

//! 类型擦除的服务值
//!
//! 服务值以 `Arc<dyn Any + Send + Sync>` 保存，并记录原始类型名，
//! 便于在类型转换失败时给出可读的错误信息。

use crate::errors::ContainerError;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 已解析的服务值
#[derive(Clone)]
pub struct ServiceValue {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl ServiceValue {
    /// 包装任意值；传入的若已是 `ServiceValue` 则原样返回，不会二次包装
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        let boxed: Box<dyn Any + Send + Sync> = Box::new(value);
        match boxed.downcast::<ServiceValue>() {
            Ok(existing) => *existing,
            Err(other) => Self {
                inner: Arc::from(other),
                type_name: std::any::type_name::<T>(),
            },
        }
    }

    /// 原始类型名称（用于错误信息）
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// 安全的类型转换
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.inner.clone().downcast::<T>().ok()
    }

    /// 类型转换，失败时返回带服务名的 `TypeMismatch`
    pub fn expect_type<T: Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>, ContainerError> {
        self.downcast::<T>().ok_or_else(|| ContainerError::TypeMismatch {
            key: key.to_string(),
            expected: std::any::type_name::<T>(),
            actual: self.type_name,
        })
    }

    /// 将常见的标量值渲染为字符串；其它类型返回 `None`
    pub fn render(&self) -> Option<String> {
        let any: &(dyn Any + Send + Sync) = &*self.inner;

        if let Some(s) = any.downcast_ref::<String>() {
            return Some(s.clone());
        }
        if let Some(s) = any.downcast_ref::<&'static str>() {
            return Some((*s).to_string());
        }

        macro_rules! render_as {
            ($($ty:ty),*) => {
                $(
                    if let Some(v) = any.downcast_ref::<$ty>() {
                        return Some(v.to_string());
                    }
                )*
            };
        }

        render_as!(char, bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);
        None
    }

    /// 两个值是否指向同一个实例
    pub fn ptr_eq(&self, other: &ServiceValue) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ServiceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Some(rendered) => write!(f, "ServiceValue<{}>({:?})", self.type_name, rendered),
            None => write!(f, "ServiceValue<{}>", self.type_name),
        }
    }
}

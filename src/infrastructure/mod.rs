//! 基础设施层
//!
//! 提供模块化依赖注入的具体实现，包括：
//! - 服务容器（解析、缓存、键转换视图）
//! - 模块抽象与组合
//! - 键转换模块装饰器

pub mod composite;
pub mod container;
pub mod key_converting;
pub mod module;

// 重新导出API
pub use composite::CompositeModule;
pub use container::{
    CachingContainer, Container, ContainerExt, ContainerStats, KeyConvertingContainer, ServiceProviderContainer,
};
pub use key_converting::{prefix_change_transform, prefix_transform, KeyConvertingModule, KeyTransform};
pub use module::{Module, RunReferences, ServiceModule};

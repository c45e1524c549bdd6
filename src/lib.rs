pub mod config;
pub mod errors;
pub mod infrastructure;
pub mod services;
pub mod tools;

#[cfg(feature = "demo")]
pub mod demo;

// Re-export commonly used items for convenience
pub use config::InspectorConfig;
pub use errors::{AppError, ContainerError, ModuleError};
pub use infrastructure::{
    CachingContainer, CompositeModule, Container, ContainerExt, KeyConvertingModule, Module, ServiceModule,
    ServiceProviderContainer,
};
pub use services::{Args, Extension, Factory, Invocable, Service, ServiceValue, SELF_KEY};
pub use tools::{inspect, InspectionReport, ModuleInspector};

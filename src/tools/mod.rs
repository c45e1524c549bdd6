//! 开发工具

pub mod inspector;

pub use inspector::{inspect, Finding, InspectionReport, ModuleInspector};

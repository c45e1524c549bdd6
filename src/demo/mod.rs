//! 示例应用
//!
//! 两个带前缀的问候模块、一个改名前缀的 hello 模块、一个时钟模块，
//! 以及通过扩展把它们连接起来的主模块。

pub mod clock;
pub mod greeting;
pub mod hello;
pub mod main_module;

use crate::errors::ModuleError;
use crate::infrastructure::{CachingContainer, CompositeModule, KeyConvertingModule, Module};
use std::sync::Arc;

/// 组装示例应用
pub fn build_app() -> CompositeModule {
    CompositeModule::new([
        Arc::new(KeyConvertingModule::prefixed(greeting::greeting_module(), "admin_greet/")) as Arc<dyn Module>,
        Arc::new(KeyConvertingModule::prefixed(greeting::greeting_module(), "comp_greet/")),
        Arc::new(KeyConvertingModule::prefix_changed(hello::hello_module(), "hello/", "hello_time/")),
        Arc::new(KeyConvertingModule::prefixed(clock::clock_module(), "jap_time/")),
        Arc::new(main_module::main_module()),
    ])
}

/// 构建缓存容器并运行所有模块
pub fn run_app() -> Result<(), ModuleError> {
    let app = build_app();
    let container = CachingContainer::for_module(&app);
    app.run(container.as_ref())?;

    let stats = container.stats();
    log::debug!(
        "示例应用运行完成: {} 次解析, 命中率 {:.0}%",
        stats.total(),
        stats.hit_rate() * 100.0
    );
    Ok(())
}

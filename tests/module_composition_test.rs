//! 模块组合与键转换的集成测试

use modular::infrastructure::{
    CachingContainer, CompositeModule, Container, ContainerExt, KeyConvertingModule, Module, ServiceModule,
};
use modular::services::{Extension, Service};
use parking_lot::Mutex;
use std::sync::Arc;

fn append(tag: &'static str) -> Extension {
    Extension::new(Vec::<String>::new(), move |prev, _| {
        let prev = prev.render().unwrap_or_default();
        Ok(format!("{prev}{tag}"))
    })
}

fn chained(order: &[&'static str]) -> String {
    let mut modules: Vec<Arc<dyn Module>> = vec![Arc::new(ServiceModule::new().factory("x", Service::value("0")))];
    modules.extend(
        order
            .iter()
            .map(|&tag| Arc::new(ServiceModule::new().extension("x", append(tag))) as Arc<dyn Module>),
    );
    let composite = CompositeModule::new(modules);

    CachingContainer::for_module(&composite).resolve_string("x").unwrap()
}

fn greeting() -> ServiceModule {
    ServiceModule::new()
        .factory("name", Service::value("admin"))
        .factory("message", Service::template("Hello, {name}", [("name", "name")]))
}

#[test]
fn test_extension_chain_follows_module_order() {
    assert_eq!(chained(&["A", "B"]), "0AB");
    assert_eq!(chained(&["B", "A"]), "0BA");
}

#[test]
fn test_later_factory_overrides_earlier() {
    let composite = CompositeModule::new([
        Arc::new(ServiceModule::new().factory("x", Service::value("first"))) as Arc<dyn Module>,
        Arc::new(ServiceModule::new().factory("x", Service::value("second"))),
    ]);

    assert_eq!(
        CachingContainer::for_module(&composite).resolve_string("x").unwrap(),
        "second"
    );
}

#[test]
fn test_prefixing_preserves_internal_wiring() {
    let composite = CompositeModule::new([
        Arc::new(KeyConvertingModule::prefixed(greeting(), "p/")) as Arc<dyn Module>,
        // 同名的未加前缀服务不应被使用
        Arc::new(ServiceModule::new().factory("name", Service::value("outsider"))),
    ]);
    let container = CachingContainer::for_module(&composite);

    assert!(container.has("p/name"));
    assert!(container.has("p/message"));
    assert_eq!(container.resolve_string("p/message").unwrap(), "Hello, admin");
}

#[test]
fn test_prefixing_leaves_external_dependencies_alone() {
    let module = ServiceModule::new().factory(
        "message",
        Service::template("Hello, {name}", [("name", "global/name")]),
    );
    let composite = CompositeModule::new([
        Arc::new(KeyConvertingModule::prefixed(module, "p/")) as Arc<dyn Module>,
        Arc::new(ServiceModule::new().factory("global/name", Service::value("world"))),
    ]);

    assert_eq!(
        CachingContainer::for_module(&composite).resolve_string("p/message").unwrap(),
        "Hello, world"
    );
}

#[test]
fn test_prefix_change_renames_keys_and_extensions() {
    let module = ServiceModule::new()
        .factory("hello/name", Service::value("admin"))
        .factory("hello/message", Service::template("Hi {n}", [("n", "hello/name")]))
        .extension("hello/name", Extension::replace(Service::value("renamed")));
    let converted = KeyConvertingModule::prefix_changed(module, "hello/", "hi/");

    let factories = converted.factories();
    assert!(factories.contains_key("hi/name"));
    assert!(factories.contains_key("hi/message"));
    assert!(!factories.contains_key("hello/name"));

    let container = CachingContainer::for_module(&converted);
    assert_eq!(container.resolve_string("hi/message").unwrap(), "Hi renamed");
}

#[test]
fn test_decorated_run_uses_original_names() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let module = greeting().on_run(["message"], move |c| {
        sink.lock().push(c.resolve_string("message")?);
        Ok(())
    });
    let app = CompositeModule::new([
        Arc::new(KeyConvertingModule::prefixed(module.clone(), "a/")) as Arc<dyn Module>,
        Arc::new(KeyConvertingModule::prefixed(module, "b/")),
        Arc::new(ServiceModule::new().extension("b/name", Extension::replace(Service::value("guest")))),
    ]);

    let container = CachingContainer::for_module(&app);
    app.run(container.as_ref()).unwrap();

    assert_eq!(*seen.lock(), vec!["Hello, admin", "Hello, guest"]);
}

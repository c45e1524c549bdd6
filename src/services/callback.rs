//! 惰性回调服务
//!
//! 回调服务解析出的值不是回调的结果，而是一个 [`Invocable`]：
//! 依赖在解析时按声明顺序取出，回调本身在每次调用时才执行。

use super::args::Args;
use super::value::ServiceValue;
use super::FactoryFn;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

type InvokeFn = Arc<dyn Fn() -> anyhow::Result<ServiceValue> + Send + Sync>;

/// 可反复调用的回调
#[derive(Clone)]
pub struct Invocable {
    call: InvokeFn,
}

impl Invocable {
    pub(crate) fn bind(callback: FactoryFn, args: Args<'static>) -> Self {
        Self {
            call: Arc::new(move || callback(&args)),
        }
    }

    /// 执行回调
    pub fn invoke(&self) -> anyhow::Result<ServiceValue> {
        (self.call)()
    }

    /// 执行回调并转换结果类型
    pub fn invoke_as<T: Any + Send + Sync>(&self) -> anyhow::Result<Arc<T>> {
        let value = self.invoke()?;
        value.downcast::<T>().ok_or_else(|| {
            anyhow::anyhow!(
                "callback returned {}, expected {}",
                value.type_name(),
                std::any::type_name::<T>()
            )
        })
    }
}

impl fmt::Debug for Invocable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Invocable")
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::ContainerError;
    use crate::infrastructure::container::{Container, ContainerExt, ServiceProviderContainer};
    use crate::infrastructure::module::ServiceModule;
    use crate::services::{Invocable, Service, SELF_KEY};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn callback_runs_on_every_invocation_only() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let module = ServiceModule::new()
            .factory("name", Service::value("admin"))
            .factory(
                "greet",
                Service::callback(["name"], move |args| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(format!("Hello, {}", args.value(0)?.render().unwrap_or_default()))
                }),
            );
        let container = ServiceProviderContainer::new(&module);

        let greet = container.resolve::<Invocable>("greet").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(*greet.invoke_as::<String>().unwrap(), "Hello, admin");
        assert_eq!(*greet.invoke_as::<String>().unwrap(), "Hello, admin");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn callback_errors_surface_on_invocation() {
        let module = ServiceModule::new().factory(
            "fail",
            Service::callback(Vec::<String>::new(), |_| -> anyhow::Result<()> { anyhow::bail!("offline") }),
        );
        let container = ServiceProviderContainer::new(&module);

        let fail = container.resolve::<Invocable>("fail").unwrap();
        assert_eq!(fail.invoke().unwrap_err().to_string(), "offline");
        assert!(fail.invoke_as::<String>().is_err());
    }

    #[test]
    fn callback_cannot_retain_the_container() {
        let module = ServiceModule::new().factory("dynamic", Service::callback([SELF_KEY], |_| Ok(())));
        let container = ServiceProviderContainer::new(&module);

        assert!(matches!(
            container.get("dynamic"),
            Err(ContainerError::ContainerNotRetainable { index: 0 })
        ));
    }

    #[test]
    fn callback_dependencies_are_key_converted() {
        let module = ServiceModule::new()
            .factory("name", Service::value("admin"))
            .factory("greet", Service::callback(["name"], |_| Ok(())));
        let prefixed = crate::infrastructure::KeyConvertingModule::prefixed(module, "p/");

        let factories = crate::infrastructure::Module::factories(&prefixed);
        assert_eq!(factories["p/greet"].dependencies(), vec!["p/name"]);
    }
}

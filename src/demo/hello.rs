use crate::errors::ModuleError;
use crate::infrastructure::{ContainerExt, ServiceModule};
use crate::services::{Invocable, Service};

/// 服务名都以 `hello/` 开头的问候模块
pub fn hello_module() -> ServiceModule {
    ServiceModule::new()
        .factory(
            "hello/message",
            Service::template("Hello there, {name}", [("name", "hello/name")]),
        )
        .factory("hello/name", Service::value("admin"))
        .factory(
            "hello/run",
            Service::callback(["hello/message"], |args| {
                let message = args.get::<String>(0)?;
                println!("{message}");
                Ok(message.len())
            }),
        )
        .on_run(["hello/run"], |c| {
            c.resolve::<Invocable>("hello/run")?
                .invoke()
                .map_err(|e| ModuleError::Run {
                    module: "hello".to_string(),
                    reason: e.to_string(),
                })?;
            Ok(())
        })
}

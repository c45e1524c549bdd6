use crate::infrastructure::{ContainerExt, ServiceModule};
use crate::services::Service;

/// 打印 `message` 的问候模块，服务名不带前缀
pub fn greeting_module() -> ServiceModule {
    ServiceModule::new()
        .factory("message", Service::template("Hello there, {name}", [("name", "name")]))
        .factory("name", Service::value("admin"))
        .on_run(["message"], |c| {
            println!("{}", c.resolve_string("message")?);
            Ok(())
        })
}

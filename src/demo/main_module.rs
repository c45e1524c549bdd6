use crate::infrastructure::ServiceModule;
use crate::services::template::interpolate;
use crate::services::{Extension, Service};
use std::collections::HashMap;

/// 应用自身的配置，以及把各模块连接起来的扩展
pub fn main_module() -> ServiceModule {
    ServiceModule::new()
        .factory(
            "main/name/pattern",
            Service::value(String::from("the time in Tokyo right now is {time}")),
        )
        .extension("admin_greet/name", Extension::replace(Service::value("Administrator")))
        .extension("comp_greet/name", Extension::replace(Service::value("Computer")))
        .extension(
            "hello_time/name",
            Extension::new(["jap_time/time", "main/name/pattern"], |_, args| {
                let time = args.get::<String>(0)?;
                let pattern = args.get::<String>(1)?;
                let context = HashMap::from([("time", time.to_string())]);
                Ok(interpolate(&pattern, &context))
            }),
        )
        .on_run(Vec::<String>::new(), |_| Ok(()))
}

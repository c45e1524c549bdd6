pub mod inspector_config;
pub mod loader;

pub use inspector_config::{InspectorConfig, PartialInspectorConfig};
pub use loader::ConfigLoader;

pub use inspector_config::{CONFIG_FILE_NAME, ENV_DENY_WARNINGS, ENV_INSPECT_IGNORE, USER_CONFIG_PATH};

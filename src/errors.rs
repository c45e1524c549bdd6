use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),
    #[error("Module error: {0}")]
    Module(#[from] ModuleError),
    #[error("Inspection failed with {errors} error(s) and {warnings} warning(s)")]
    Inspection { errors: usize, warnings: usize },
    #[error("Failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),
}

/// 容器解析错误
#[derive(Debug, Error)]
pub enum ContainerError {
    /// 服务未声明
    #[error("Service '{0}' was not found")]
    NotFound(String),
    /// 类型转换失败
    #[error("Service '{key}' has type {actual}, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("Argument index {index} is out of range ({len} argument(s))")]
    ArgumentOutOfRange { index: usize, len: usize },
    /// 参数位置不是容器自身
    #[error("Argument {index} is not the container")]
    NotAContainer { index: usize },
    /// 惰性回调不能持有容器本身
    #[error("Argument {index} is the container, which a callback cannot retain")]
    ContainerNotRetainable { index: usize },
    /// 插值时遇到无法字符串化的值
    #[error("Value of '{key}' ({type_name}) cannot be rendered into a string")]
    NotRenderable {
        key: String,
        type_name: &'static str,
    },
    /// 根容器已被释放
    #[error("Root scope for '{0}' is no longer available")]
    ScopeUnavailable(String),
    /// 回调失败（尚未关联服务名）
    #[error(transparent)]
    Callback(anyhow::Error),
    /// 服务回调失败
    #[error("Service '{key}' failed: {source}")]
    ServiceFailed {
        key: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ContainerError {
    /// 将回调错误关联到具体服务名；其它错误原样返回
    pub fn for_service(self, key: &str) -> Self {
        match self {
            ContainerError::Callback(source) => ContainerError::ServiceFailed {
                key: key.to_string(),
                source,
            },
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ContainerError::NotFound(_))
    }
}

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),
    #[error("Module '{module}' failed to run: {reason}")]
    Run { module: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from file '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

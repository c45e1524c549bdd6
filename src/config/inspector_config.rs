use crate::errors::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;

pub const USER_CONFIG_PATH: &str = "~/.config/modular";
pub const CONFIG_FILE_NAME: &str = "inspector.toml";

/// 逗号分隔的忽略列表，追加到文件中的列表之后
pub const ENV_INSPECT_IGNORE: &str = "MODULAR_INSPECT_IGNORE";
pub const ENV_DENY_WARNINGS: &str = "MODULAR_DENY_WARNINGS";

/// 模块检查器配置
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectorConfig {
    /// 视为已使用的服务名
    pub ignore: Vec<String>,
    /// 把警告当作失败
    pub deny_warnings: bool,
    /// 未声明 run 引用时报告错误
    pub require_run_references: bool,
}

/// Partial inspector configuration for loading from files
#[derive(Deserialize, Debug, Default)]
pub struct PartialInspectorConfig {
    pub ignore: Option<Vec<String>>,
    pub deny_warnings: Option<bool>,
    pub require_run_references: Option<bool>,
}

impl InspectorConfig {
    /// Create configuration from partial config and environment
    pub fn from_partial_and_env(
        partial: Option<PartialInspectorConfig>,
        env_map: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let partial = partial.unwrap_or_default();

        let mut ignore = partial.ignore.unwrap_or_default();
        if let Some(extra) = env_map.get(ENV_INSPECT_IGNORE) {
            ignore.extend(
                extra
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            );
        }

        let deny_warnings = match env_map.get(ENV_DENY_WARNINGS) {
            Some(raw) => parse_bool(ENV_DENY_WARNINGS, raw)?,
            None => partial.deny_warnings.unwrap_or(false),
        };

        let config = Self {
            ignore,
            deny_warnings,
            require_run_references: partial.require_run_references.unwrap_or(false),
        };
        config.validate()?;
        Ok(config)
    }

    /// 命令行参数覆盖
    pub fn with_ignored<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(extra.into_iter().map(Into::into));
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(pos) = self.ignore.iter().position(|s| s.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "ignore".to_string(),
                reason: format!("entry #{} is empty", pos + 1),
            });
        }
        Ok(())
    }
}

fn parse_bool(field: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("'{other}' is not a boolean"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file_or_env() {
        let config = InspectorConfig::from_partial_and_env(None, &HashMap::new()).unwrap();
        assert_eq!(config, InspectorConfig::default());
    }

    #[test]
    fn env_extends_ignore_and_overrides_deny_warnings() {
        let partial: PartialInspectorConfig = toml::from_str(
            r#"
            ignore = ["a"]
            deny_warnings = true
            "#,
        )
        .unwrap();
        let env_map = HashMap::from([
            (ENV_INSPECT_IGNORE.to_string(), "b, ,c".to_string()),
            (ENV_DENY_WARNINGS.to_string(), "off".to_string()),
        ]);

        let config = InspectorConfig::from_partial_and_env(Some(partial), &env_map).unwrap();
        assert_eq!(config.ignore, vec!["a", "b", "c"]);
        assert!(!config.deny_warnings);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let env_map = HashMap::from([(ENV_DENY_WARNINGS.to_string(), "maybe".to_string())]);
        assert!(matches!(
            InspectorConfig::from_partial_and_env(None, &env_map),
            Err(ConfigError::InvalidValue { .. })
        ));

        let partial = PartialInspectorConfig {
            ignore: Some(vec!["ok".to_string(), "  ".to_string()]),
            ..Default::default()
        };
        let err = InspectorConfig::from_partial_and_env(Some(partial), &HashMap::new()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for 'ignore': entry #2 is empty");
    }
}

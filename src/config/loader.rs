use super::inspector_config::{
    InspectorConfig, PartialInspectorConfig, CONFIG_FILE_NAME, ENV_DENY_WARNINGS, ENV_INSPECT_IGNORE,
    USER_CONFIG_PATH,
};
use crate::errors::ConfigError;
use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
};

/// Configuration loader responsible for loading config from files and environment
pub struct ConfigLoader {
    base_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader with default paths
    pub fn new() -> Self {
        Self { base_path: None }
    }

    /// Create a config loader with custom base path (for testing)
    pub fn with_base_path(base_path: PathBuf) -> Self {
        Self {
            base_path: Some(base_path),
        }
    }

    /// Load inspector configuration from the user config file
    pub fn load(&self) -> Result<InspectorConfig, ConfigError> {
        let config_path = self.config_path();
        self.load_from_path(&config_path)
    }

    /// Load inspector configuration from an explicit file
    ///
    /// 文件不存在时使用默认值；环境变量总是参与合并。
    pub fn load_from_path(&self, config_path: &Path) -> Result<InspectorConfig, ConfigError> {
        let partial = self.load_partial_config(config_path)?;
        let env_map = self.collect_env_vars();
        InspectorConfig::from_partial_and_env(partial, &env_map)
    }

    /// Path of the user config file, with tilde expansion and base path override
    pub fn config_path(&self) -> PathBuf {
        let base = match &self.base_path {
            Some(base_path) => base_path.join(USER_CONFIG_PATH.trim_start_matches("~/")),
            None => PathBuf::from(shellexpand::tilde(USER_CONFIG_PATH).as_ref()),
        };
        base.join(CONFIG_FILE_NAME)
    }

    /// Load partial configuration from TOML file
    fn load_partial_config(&self, config_path: &Path) -> Result<Option<PartialInspectorConfig>, ConfigError> {
        if !config_path.exists() {
            log::debug!("配置文件不存在，使用默认配置: {}", config_path.display());
            return Ok(None);
        }

        let display = config_path.to_string_lossy().to_string();
        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::FileRead(display.clone(), e))?;
        let partial = toml::from_str(&content).map_err(|e| ConfigError::TomlParse(display.clone(), e))?;

        log::debug!("已加载配置文件: {display}");
        Ok(Some(partial))
    }

    /// Collect relevant environment variables
    fn collect_env_vars(&self) -> HashMap<String, String> {
        [ENV_INSPECT_IGNORE, ENV_DENY_WARNINGS]
            .into_iter()
            .filter_map(|key| env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_loader() -> (ConfigLoader, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_base_path(temp_dir.path().to_path_buf());
        (loader, temp_dir)
    }

    #[test]
    fn config_path_respects_base_path() {
        let (loader, temp_dir) = create_test_loader();
        let path = loader.config_path();

        assert!(path.starts_with(temp_dir.path()));
        assert!(path.ends_with(".config/modular/inspector.toml"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let (loader, temp_dir) = create_test_loader();
        let config = loader.load_partial_config(&temp_dir.path().join("nope.toml")).unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn reads_user_config_file() {
        let (loader, _temp_dir) = create_test_loader();
        let config_path = loader.config_path();
        fs::create_dir_all(config_path.parent().unwrap()).unwrap();
        fs::write(&config_path, "ignore = [\"main\"]\nrequire_run_references = true\n").unwrap();

        let partial = loader.load_partial_config(&config_path).unwrap().unwrap();
        assert_eq!(partial.ignore, Some(vec!["main".to_string()]));
        assert_eq!(partial.require_run_references, Some(true));
    }

    #[test]
    fn malformed_toml_is_reported_with_path() {
        let (loader, temp_dir) = create_test_loader();
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "ignore = [").unwrap();

        match loader.load_partial_config(&config_path) {
            Err(ConfigError::TomlParse(path, _)) => assert!(path.ends_with("broken.toml")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}

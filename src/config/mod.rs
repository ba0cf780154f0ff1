// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::error::{CacheError, Result};
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. CLI arguments (highest, applied by the caller)
    /// 2. Environment variables (`COMMIT_MSG_CACHE__MAX_ENTRIES=50`)
    /// 3. Config file
    /// 4. Defaults (lowest)
    ///
    /// An explicit `config_file` must exist; the default one is optional.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let file_source = match config_file {
            Some(path) => File::from(path.to_path_buf()).required(true),
            None => File::from(Self::default_config_path()).required(false),
        };

        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            .add_source(file_source)
            .add_source(
                Environment::with_prefix("COMMIT_MSG")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| CacheError::Config(e.to_string()))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| CacheError::Config(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CacheError::Config(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.cache.max_entries == 0 {
            return Err(CacheError::Config(
                "cache.max_entries must be at least 1".to_string(),
            ));
        }
        if self.cache.cache_file_path.as_os_str().is_empty() {
            return Err(CacheError::Config(
                "cache.cache_file_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("commit-msg")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[cache]\nmax_entries = 25\nmax_age_days = 7\ncache_file_path = \"/tmp/commit-msg-test.json\"\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.cache.max_entries, 25);
        assert_eq!(config.cache.max_age_days, 7);
        assert_eq!(config.cache.cleanup_interval_hours, 24);
        assert_eq!(
            config.cache.cache_file_path,
            PathBuf::from("/tmp/commit-msg-test.json")
        );
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "compact");
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[cache]\nmax_entries = 0\n").unwrap();

        assert!(matches!(
            AppConfig::load(Some(&path)),
            Err(CacheError::Config(_))
        ));
    }

    #[test]
    fn test_to_toml_contains_sections() {
        let rendered = AppConfig::default().to_toml().unwrap();
        assert!(rendered.contains("[cache]"));
        assert!(rendered.contains("max_entries = 1000"));
        assert!(rendered.contains("[logging]"));
    }
}

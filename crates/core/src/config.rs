//! Platform configuration
//!
//! Loaded from `lektora.toml` under the platform data directory; every field
//! has a default so a missing file or empty sections still yield a usable
//! configuration.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Could not determine config directory")]
    NoProjectDirs,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub media: EndpointConfig,
    #[serde(default)]
    pub mail: EndpointConfig,
    #[serde(default)]
    pub tutor: TutorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    /// Path to the SQLite file; `None` means the default data-dir location
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Base URL and API key for an external HTTP service
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EndpointConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    /// Model name sent with every question
    #[serde(default = "default_tutor_model")]
    pub model: String,
}

fn default_tutor_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            model: default_tutor_model(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load from the default location; a missing file yields defaults
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// Default config file path under the platform data dir
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("dev", "lektora", "lektora").ok_or(ConfigError::NoProjectDirs)?;
        Ok(dirs.data_dir().join("lektora.toml"))
    }

    /// Database path, falling back to the platform data dir
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }
        let dirs = ProjectDirs::from("dev", "lektora", "lektora").ok_or(ConfigError::NoProjectDirs)?;
        Ok(dirs.data_dir().join("lektora.db"))
    }

    /// Parse from TOML content (for testing)
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert!(config.database.path.is_none());
        assert!(config.media.base_url.is_empty());
        assert_eq!(config.tutor.model, "gpt-4o-mini");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[database]
path = "/var/lib/lektora/lektora.db"

[media]
base_url = "https://media.example.com"
api_key = "media-key"

[mail]
base_url = "https://mail.example.com"
api_key = "mail-key"

[tutor]
base_url = "https://tutor.example.com"
api_key = "tutor-key"
model = "gpt-4o"
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(
            config.database.path.as_deref(),
            Some(Path::new("/var/lib/lektora/lektora.db"))
        );
        assert_eq!(config.media.base_url, "https://media.example.com");
        assert_eq!(config.mail.api_key, "mail-key");
        assert_eq!(config.tutor.model, "gpt-4o");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lektora.toml");
        std::fs::write(&path, "[media]\nbase_url = \"https://m.example.com\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.media.base_url, "https://m.example.com");
    }
}

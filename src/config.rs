//! Configuration module
//!
//! Application settings are read from a TOML file
//! (`~/.config/evmap-cache/config.toml` by default). Every section is
//! optional and falls back to its defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::DatabaseConfig;

const APP_DIR: &str = "evmap-cache";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseSection,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// Full connection URL; takes precedence over `path`
    pub url: Option<String>,
    /// SQLite file, created on first use
    pub path: PathBuf,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: None,
            path: default_database_path(),
        }
    }
}

impl DatabaseSection {
    pub fn connection_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => DatabaseConfig::sqlite(&self.path).url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "evmap_cache=debug"
    pub level: String,
    /// "text" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database.connection_url(),
        }
    }
}

/// `<config dir>/evmap-cache/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

/// `<data dir>/evmap-cache/locations.db`
pub fn default_database_path() -> PathBuf {
    dirs_next::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("locations.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.logging.format, "text");
        assert_eq!(cfg.database, DatabaseSection::default());
    }

    #[test]
    fn url_takes_precedence_over_path() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [database]
            url = "sqlite::memory:"
            path = "/var/lib/evmap/locations.db"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.database_config().url, "sqlite::memory:");
    }

    #[test]
    fn path_becomes_sqlite_url() {
        let section = DatabaseSection {
            url: None,
            path: PathBuf::from("/var/lib/evmap/locations.db"),
        };
        assert_eq!(
            section.connection_url(),
            "sqlite:///var/lib/evmap/locations.db?mode=rwc"
        );
    }

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = AppConfig::load(Path::new("/nonexistent/evmap-cache/config.toml")).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("evmap-cache-{}.toml", std::process::id()));
        std::fs::write(&path, "[logging\nlevel = ").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}

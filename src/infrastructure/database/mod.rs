pub mod entities;
pub mod migrator;
pub mod repositories;

pub use repositories::SeaOrmChargeLocationRepository;

use std::path::Path;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

const DEFAULT_DATABASE_URL: &str = "sqlite://./locations.db?mode=rwc";
const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./locations.db?mode=rwc")
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Create config for SQLite
    pub fn sqlite(path: &Path) -> Self {
        Self {
            url: format!("sqlite://{}?mode=rwc", path.display()),
        }
    }

    /// Private in-memory SQLite database, gone once the connection closes
    pub fn in_memory() -> Self {
        Self {
            url: IN_MEMORY_URL.to_string(),
        }
    }

    /// Create config from environment variable
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
        }
    }

    fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

/// Initialize database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!("Connecting to database: {}", config.url);

    let mut options = ConnectOptions::new(config.url.clone());
    if config.is_in_memory() {
        // Every pooled connection would otherwise open its own empty database.
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options).await?;
    info!("Database connected successfully");
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_url_from_path() {
        let config = DatabaseConfig::sqlite(Path::new("/tmp/cache.db"));
        assert_eq!(config.url, "sqlite:///tmp/cache.db?mode=rwc");
        assert!(!config.is_in_memory());
    }

    #[test]
    fn in_memory_is_detected() {
        assert!(DatabaseConfig::in_memory().is_in_memory());
    }
}

//! evmap-cache
//!
//! Opens the local charge location cache and reports what it holds.
//! Reads configuration from TOML file (~/.config/evmap-cache/config.toml),
//! or from the path in `EVMAP_CONFIG`.

use std::collections::BTreeMap;
use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use evmap_cache::infrastructure::database::migrator::Migrator;
use evmap_cache::infrastructure::SeaOrmChargeLocationRepository;
use evmap_cache::logging::init_tracing;
use evmap_cache::{default_config_path, init_database, AppConfig, ChargeLocationStore, MainContext};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("EVMAP_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg.logging);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            init_tracing(&AppConfig::default().logging);
            error!("Failed to load config: {}", e);
            return Err(e.into());
        }
    };

    // ── Database ───────────────────────────────────────────────
    if app_cfg.database.url.is_none() {
        if let Some(dir) = app_cfg.database.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
    }

    let db = match init_database(&app_cfg.database_config()).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    info!("Running database migrations...");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    info!("Migrations completed");

    // ── Store ──────────────────────────────────────────────────
    let main_context = MainContext::spawn();
    let repository = Arc::new(SeaOrmChargeLocationRepository::new(db.clone()));
    let store = ChargeLocationStore::open(repository, main_context).await?;

    let snapshot = store.all_live().next_value().await;
    let mut per_network: BTreeMap<&str, usize> = BTreeMap::new();
    for location in snapshot.iter() {
        *per_network
            .entry(location.network.as_deref().unwrap_or("independent"))
            .or_default() += 1;
    }

    info!(count = snapshot.len(), "Cached charge locations");
    for (network, count) in &per_network {
        info!(network, count, "Locations per network");
    }

    if let Err(e) = db.close().await {
        warn!("Error closing database connection: {}", e);
    } else {
        info!("Database connection closed");
    }

    Ok(())
}

//! # evmap-cache
//!
//! Local cache of EV charging locations, with a reactive live view.
//!
//! ## Architecture
//!
//! - **domain**: the ChargeLocation entity and its repository port
//! - **application**: the location store (push, async and blocking reads)
//! - **infrastructure**: SeaORM/SQLite and in-memory repositories
//! - **support**: main context, observables and the one-shot await bridge

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod support;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};

pub use application::{ChargeLocationStore, LocationSnapshot};
pub use support::{await_value, MainContext, Observable};

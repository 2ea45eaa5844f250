//! Database repository implementations

pub mod charge_location_repository;

pub use charge_location_repository::SeaOrmChargeLocationRepository;

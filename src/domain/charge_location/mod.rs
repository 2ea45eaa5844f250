//! Charge Location aggregate
//!
//! Contains the ChargeLocation entity, value objects, and repository interface.

pub mod model;
pub mod repository;

pub use model::{latest_by_id, Address, ChargeLocation, Chargepoint, Coordinate};
pub use repository::ChargeLocationRepository;

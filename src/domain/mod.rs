pub mod charge_location;

// Re-export commonly used types
pub use charge_location::{
    Address, ChargeLocation, ChargeLocationRepository, Chargepoint, Coordinate,
};

// Re-export DomainError from support for convenience
pub use crate::support::errors::{DomainError, DomainResult};

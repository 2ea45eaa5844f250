//! Database entities module

pub mod charge_location;

pub use charge_location::Entity as ChargeLocation;

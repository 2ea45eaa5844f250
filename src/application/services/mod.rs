//! Application services

mod location_store;

pub use location_store::{ChargeLocationStore, LocationSnapshot};

//! Charge Location domain entity

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::support::collections::max_opt;

/// WGS84 position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub country: Option<String>,
    pub postcode: Option<String>,
    pub street: Option<String>,
}

/// A group of identical connectors at a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chargepoint {
    /// Connector standard, e.g. "Type2" or "CCS"
    pub connector_type: String,
    /// Rated power in kW
    pub power_kw: f64,
    /// Number of connectors of this kind
    pub count: u32,
}

impl Chargepoint {
    pub fn new(connector_type: impl Into<String>, power_kw: f64, count: u32) -> Self {
        Self {
            connector_type: connector_type.into(),
            power_kw,
            count,
        }
    }
}

/// Charge Location entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeLocation {
    /// Primary key, also used to resolve insert conflicts
    pub id: i64,
    pub name: String,
    pub coordinates: Coordinate,
    pub address: Address,
    pub chargepoints: Vec<Chargepoint>,
    /// Operating network, if any
    pub network: Option<String>,
    /// Detail page upstream
    pub url: String,
    pub verified: bool,
    /// When this record was fetched from upstream
    pub retrieved_at: DateTime<Utc>,
}

impl ChargeLocation {
    pub fn new(id: i64, name: impl Into<String>, coordinates: Coordinate) -> Self {
        Self {
            id,
            name: name.into(),
            coordinates,
            address: Address::default(),
            chargepoints: Vec::new(),
            network: None,
            url: String::new(),
            verified: false,
            retrieved_at: Utc::now(),
        }
    }

    pub fn with_chargepoint(mut self, chargepoint: Chargepoint) -> Self {
        self.chargepoints.push(chargepoint);
        self
    }

    /// Highest rated power across all chargepoints
    pub fn max_power_kw(&self) -> Option<f64> {
        self.chargepoints
            .iter()
            .fold(None, |max, cp| max_opt(max, Some(cp.power_kw)))
    }

    pub fn total_chargepoints(&self) -> u32 {
        self.chargepoints.iter().map(|cp| cp.count).sum()
    }

    pub fn connector_types(&self) -> BTreeSet<&str> {
        self.chargepoints
            .iter()
            .map(|cp| cp.connector_type.as_str())
            .collect()
    }
}

/// Collapse records sharing an id, keeping the last occurrence of each.
///
/// The result is ordered by the position of those last occurrences.
pub fn latest_by_id(locations: &[ChargeLocation]) -> Vec<&ChargeLocation> {
    let mut seen = HashSet::new();
    let mut latest: Vec<&ChargeLocation> = locations
        .iter()
        .rev()
        .filter(|location| seen.insert(location.id))
        .collect();
    latest.reverse();
    latest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_location() -> ChargeLocation {
        ChargeLocation::new(42, "Marktplatz", Coordinate::new(50.94, 6.96))
            .with_chargepoint(Chargepoint::new("Type2", 22.0, 2))
            .with_chargepoint(Chargepoint::new("CCS", 150.0, 1))
            .with_chargepoint(Chargepoint::new("Type2", 11.0, 1))
    }

    #[test]
    fn max_power_over_chargepoints() {
        assert_eq!(sample_location().max_power_kw(), Some(150.0));
    }

    #[test]
    fn max_power_without_chargepoints() {
        let location = ChargeLocation::new(1, "Empty", Coordinate::new(0.0, 0.0));
        assert_eq!(location.max_power_kw(), None);
    }

    #[test]
    fn counts_and_connector_types() {
        let location = sample_location();
        assert_eq!(location.total_chargepoints(), 4);
        assert_eq!(
            location.connector_types(),
            BTreeSet::from(["CCS", "Type2"])
        );
    }

    #[test]
    fn latest_by_id_keeps_last_occurrence() {
        let first = ChargeLocation::new(1, "old", Coordinate::new(0.0, 0.0));
        let other = ChargeLocation::new(2, "other", Coordinate::new(0.0, 0.0));
        let replacement = ChargeLocation::new(1, "new", Coordinate::new(1.0, 1.0));
        let batch = vec![first, other, replacement];

        let names: Vec<&str> = latest_by_id(&batch)
            .into_iter()
            .map(|l| l.name.as_str())
            .collect();

        assert_eq!(names, vec!["other", "new"]);
    }
}

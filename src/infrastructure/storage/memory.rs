//! In-memory storage implementation

use std::collections::BTreeMap;

use async_trait::async_trait;
use log::debug;
use tokio::sync::{watch, RwLock};

use crate::domain::charge_location::{ChargeLocation, ChargeLocationRepository};
use crate::domain::DomainResult;
use crate::support::ChangeFeed;

/// In-memory charge location storage for development and testing.
///
/// Reads return records ordered by id.
#[derive(Default)]
pub struct InMemoryChargeLocationRepository {
    locations: RwLock<BTreeMap<i64, ChargeLocation>>,
    changes: ChangeFeed,
}

impl InMemoryChargeLocationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChargeLocationRepository for InMemoryChargeLocationRepository {
    async fn insert(&self, locations: &[ChargeLocation]) -> DomainResult<()> {
        if locations.is_empty() {
            return Ok(());
        }
        let mut stored = self.locations.write().await;
        for location in locations {
            stored.insert(location.id, location.clone());
        }
        self.changes.notify();
        debug!("Charge locations saved: {}", locations.len());
        Ok(())
    }

    async fn delete(&self, locations: &[ChargeLocation]) -> DomainResult<()> {
        let mut stored = self.locations.write().await;
        let before = stored.len();
        for location in locations {
            stored.remove(&location.id);
        }
        if stored.len() != before {
            self.changes.notify();
        }
        Ok(())
    }

    async fn find_all(&self) -> DomainResult<Vec<ChargeLocation>> {
        Ok(self.locations.read().await.values().cloned().collect())
    }

    fn changes(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}

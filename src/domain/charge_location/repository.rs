//! Charge Location repository interface

use async_trait::async_trait;
use tokio::sync::watch;

use super::model::ChargeLocation;
use crate::domain::DomainResult;

#[async_trait]
pub trait ChargeLocationRepository: Send + Sync {
    /// Create or replace by id. All records of one call are written atomically.
    async fn insert(&self, locations: &[ChargeLocation]) -> DomainResult<()>;
    /// Remove the records sharing an id with `locations`; unknown ids are ignored.
    async fn delete(&self, locations: &[ChargeLocation]) -> DomainResult<()>;
    async fn find_all(&self) -> DomainResult<Vec<ChargeLocation>>;
    /// Version of the stored table, advanced after every committed write
    /// that changed it.
    fn changes(&self) -> watch::Receiver<u64>;
}

//! Local cache of charge locations
//!
//! One capability, three access modes: every read goes through the same
//! repository query, whether it is pushed to observers of the live view,
//! awaited, or fetched on a blocking thread.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::{ChargeLocation, ChargeLocationRepository, DomainResult};
use crate::support::{MainContext, Observable};

/// Shared snapshot published by the live view
pub type LocationSnapshot = Arc<Vec<ChargeLocation>>;

pub struct ChargeLocationStore {
    repository: Arc<dyn ChargeLocationRepository>,
    live: Observable<LocationSnapshot>,
    changes: watch::Receiver<u64>,
    // Table version the live view last caught up with.
    published: watch::Receiver<u64>,
    refresher: JoinHandle<()>,
    runtime: Handle,
}

impl ChargeLocationStore {
    /// Open the store, publish the current contents to the live view and
    /// follow every later change of the repository.
    pub async fn open(
        repository: Arc<dyn ChargeLocationRepository>,
        main: MainContext,
    ) -> DomainResult<Self> {
        let mut changes = repository.changes();
        let version = *changes.borrow_and_update();
        let locations = repository.find_all().await?;
        let count = locations.len();

        let live = Observable::new(main);
        publish(&live, locations);

        let (published_tx, published) = watch::channel(version);
        let refresher = tokio::spawn(follow_changes(
            repository.clone(),
            live.clone(),
            changes.clone(),
            published_tx,
        ));

        info!(count, "Charge location store opened");
        Ok(Self {
            repository,
            live,
            changes,
            published,
            refresher,
            runtime: Handle::current(),
        })
    }

    /// Create or replace `locations` by id.
    pub async fn insert(&self, locations: &[ChargeLocation]) -> DomainResult<()> {
        if locations.is_empty() {
            return Ok(());
        }
        self.repository.insert(locations).await?;
        self.live_caught_up().await;
        Ok(())
    }

    /// Blocking form of [`insert`](Self::insert).
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context.
    pub fn insert_blocking(&self, locations: &[ChargeLocation]) -> DomainResult<()> {
        self.runtime.block_on(self.insert(locations))
    }

    pub async fn delete(&self, locations: &[ChargeLocation]) -> DomainResult<()> {
        if locations.is_empty() {
            return Ok(());
        }
        self.repository.delete(locations).await?;
        self.live_caught_up().await;
        Ok(())
    }

    /// Live view of all locations, republished whenever the repository
    /// reports a committed change, whoever wrote it.
    pub fn all_live(&self) -> Observable<LocationSnapshot> {
        self.live.clone()
    }

    pub async fn all(&self) -> DomainResult<Vec<ChargeLocation>> {
        self.repository.find_all().await
    }

    /// Blocking form of [`all`](Self::all).
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context.
    pub fn all_blocking(&self) -> DomainResult<Vec<ChargeLocation>> {
        self.runtime.block_on(self.all())
    }

    /// Wait until the live view has been refreshed past every change seen
    /// so far, so a write is visible to `all_live` once it returns.
    async fn live_caught_up(&self) {
        let target = *self.changes.borrow();
        let mut published = self.published.clone();
        let caught_up = published.wait_for(|version| *version >= target).await.is_ok();
        if !caught_up {
            warn!(target, "Live charge locations stopped following changes");
        }
    }
}

impl Drop for ChargeLocationStore {
    fn drop(&mut self) {
        self.refresher.abort();
    }
}

fn publish(live: &Observable<LocationSnapshot>, locations: Vec<ChargeLocation>) {
    let count = locations.len();
    if let Err(e) = live.post_value(Arc::new(locations)) {
        warn!(error = %e, "Live charge locations not updated");
        return;
    }
    debug!(count, "Published charge location snapshot");
}

/// Re-query after every change. A failed query leaves the previous snapshot
/// in place; the write itself already succeeded.
async fn follow_changes(
    repository: Arc<dyn ChargeLocationRepository>,
    live: Observable<LocationSnapshot>,
    mut changes: watch::Receiver<u64>,
    published: watch::Sender<u64>,
) {
    while changes.changed().await.is_ok() {
        let version = *changes.borrow_and_update();
        match repository.find_all().await {
            Ok(locations) => publish(&live, locations),
            Err(e) => warn!(error = %e, version, "Failed to refresh live charge locations"),
        }
        published.send_replace(version);
    }
    debug!("Charge location change feed closed");
}

//! Table-level change notification
//!
//! Writers bump a version after every committed change. Readers hold a
//! [`watch::Receiver`] and re-query when it moves; a burst of writes wakes
//! them once.

use tokio::sync::watch;
use tracing::trace;

#[derive(Debug)]
pub struct ChangeFeed {
    version: watch::Sender<u64>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self { version }
    }

    /// Record a committed change and return the new version.
    pub fn notify(&self) -> u64 {
        self.version.send_modify(|v| *v += 1);
        let version = *self.version.borrow();
        trace!(version, "Table changed");
        version
    }

    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use futures_util::FutureExt;

    use super::*;

    #[test]
    fn notify_without_subscribers_still_counts() {
        let feed = ChangeFeed::new();
        assert_eq!(feed.notify(), 1);
        assert_eq!(feed.notify(), 2);
        assert_eq!(*feed.subscribe().borrow(), 2);
    }

    #[tokio::test]
    async fn bursts_wake_subscribers_once() {
        let feed = ChangeFeed::new();
        let mut changes = feed.subscribe();

        feed.notify();
        feed.notify();
        feed.notify();

        changes.changed().await.unwrap();
        assert_eq!(*changes.borrow_and_update(), 3);
        assert!(changes.changed().now_or_never().is_none());
    }
}

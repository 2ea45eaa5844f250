//! One-shot await over a push-based observable source

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::main_context::MainContext;
use super::observable::{Observation, ObservableSource, ObserverId};

/// Suspend until `source` produces its current or next value, then detach.
///
/// The observer is registered on `main` (inline when the caller already runs
/// there) and delivers at most one value. Dropping the returned future before
/// a value arrives removes the registration; the removal is queued on `main`
/// behind the registration, so it cannot be skipped.
///
/// There is no timeout. A source that never emits, or a main context that has
/// shut down, leaves the caller suspended.
pub async fn await_value<T, S>(source: S, main: MainContext) -> T
where
    T: Clone + Send + 'static,
    S: ObservableSource<T> + Clone + 'static,
{
    let (tx, rx) = oneshot::channel();
    let mut tx = Some(tx);
    let observer = move |value: &T| {
        if let Some(tx) = tx.take() {
            let _ = tx.send(value.clone());
        }
        Observation::Detach
    };

    let mut subscription = Subscription::new(source.clone(), main.clone());
    let slot = subscription.slot.clone();

    let registered = main
        .run(move || {
            let id = source.observe_forever(Box::new(observer));
            slot.store(id.as_u64(), Ordering::SeqCst);
            id
        })
        .await;

    match registered {
        Ok(id) => debug!(observer = id.as_u64(), "Awaiting observable value"),
        Err(e) => {
            subscription.disarm();
            warn!(error = %e, "Cannot observe value");
            return std::future::pending().await;
        }
    }

    // Once the observer fired or was dropped it is no longer registered.
    let received = rx.await;
    subscription.disarm();
    match received {
        Ok(value) => value,
        Err(_) => {
            warn!("Observable released the observer without a value");
            std::future::pending().await
        }
    }
}

/// Removes the registration when the awaiting future is dropped early.
struct Subscription<T, S>
where
    T: 'static,
    S: ObservableSource<T> + 'static,
{
    source: Option<S>,
    main: MainContext,
    slot: Arc<AtomicU64>,
    _value: PhantomData<fn() -> T>,
}

impl<T, S> Subscription<T, S>
where
    T: 'static,
    S: ObservableSource<T> + 'static,
{
    fn new(source: S, main: MainContext) -> Self {
        Self {
            source: Some(source),
            main,
            slot: Arc::new(AtomicU64::new(0)),
            _value: PhantomData,
        }
    }

    fn disarm(&mut self) {
        self.source = None;
    }
}

impl<T, S> Drop for Subscription<T, S>
where
    T: 'static,
    S: ObservableSource<T> + 'static,
{
    fn drop(&mut self) {
        let Some(source) = self.source.take() else {
            return;
        };
        let slot = self.slot.clone();
        let queued = self.main.dispatch(move || {
            if let Some(id) = ObserverId::from_u64(slot.swap(0, Ordering::SeqCst)) {
                source.remove_observer(id);
                debug!(observer = id.as_u64(), "Cancelled observable await");
            }
        });
        if queued.is_err() {
            warn!("Main context closed before the observer could be removed");
        }
    }
}

//! Push-based single-value container
//!
//! An [`Observable`] holds zero or one current value and notifies its
//! observers whenever the value is set. It belongs to a [`MainContext`]:
//! mutation happens on that context only, either directly through
//! [`Observable::set_value`] from a job of the context or by marshaling
//! through [`Observable::post_value`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::warn;

use super::errors::{MainContextError, ObservableError};
use super::main_context::MainContext;

static NEXT_OBSERVER_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one registration on an observable source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Allocate a process-wide unique id.
    pub fn next() -> Self {
        Self(NEXT_OBSERVER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }

    pub(crate) fn from_u64(raw: u64) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }
}

/// What an observer wants after handling a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    Keep,
    Detach,
}

pub trait Observer<T>: Send {
    fn on_changed(&mut self, value: &T) -> Observation;
}

impl<T, F> Observer<T> for F
where
    F: FnMut(&T) -> Observation + Send,
{
    fn on_changed(&mut self, value: &T) -> Observation {
        self(value)
    }
}

/// Anything that pushes values to registered observers.
pub trait ObservableSource<T>: Send + Sync {
    /// Register `observer` regardless of any consumer lifecycle.
    ///
    /// When the source already holds a value it is delivered before this
    /// returns, unless the call comes from inside another observer; then it
    /// arrives before that dispatch completes. An observer answering
    /// [`Observation::Detach`] to it is dropped right away.
    fn observe_forever(&self, observer: Box<dyn Observer<T>>) -> ObserverId;

    /// Unregister `id`. Returns `false` when nothing was registered under it.
    fn remove_observer(&self, id: ObserverId) -> bool;
}

struct Registration<T> {
    id: ObserverId,
    observer: Box<dyn Observer<T>>,
    /// Version of the last value delivered to this observer.
    seen: u64,
}

struct State<T> {
    value: Option<T>,
    version: u64,
    observers: Vec<Registration<T>>,
    dispatching: bool,
    // Taken out of `observers` by the running dispatch pass.
    in_flight: Vec<ObserverId>,
    removed_while_dispatching: Vec<ObserverId>,
}

pub struct Observable<T> {
    state: Arc<Mutex<State<T>>>,
    main: MainContext,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            main: self.main.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Observable<T> {
    pub fn new(main: MainContext) -> Self {
        Self::from_state(main, None)
    }

    pub fn with_value(main: MainContext, value: T) -> Self {
        Self::from_state(main, Some(value))
    }

    fn from_state(main: MainContext, value: Option<T>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                version: u64::from(value.is_some()),
                value,
                observers: Vec::new(),
                dispatching: false,
                in_flight: Vec::new(),
                removed_while_dispatching: Vec::new(),
            })),
            main,
        }
    }

    pub fn main_context(&self) -> &MainContext {
        &self.main
    }

    /// Current value, if one was ever set.
    pub fn value(&self) -> Option<T> {
        self.lock().value.clone()
    }

    pub fn observer_count(&self) -> usize {
        self.lock().observers.len()
    }

    pub fn has_observers(&self) -> bool {
        self.observer_count() > 0
    }

    /// Replace the value and notify every observer, synchronously.
    ///
    /// Must be called from a job of the owning main context.
    pub fn set_value(&self, value: T) -> Result<(), ObservableError> {
        if !self.main.is_current() {
            return Err(ObservableError::NotOnMainContext);
        }

        {
            let mut state = self.lock();
            state.value = Some(value);
            state.version += 1;
            // A set from inside an observer is picked up by the running dispatch.
            if state.dispatching {
                return Ok(());
            }
            state.dispatching = true;
        }

        self.dispatch_latest();
        Ok(())
    }

    /// Queue a [`set_value`](Self::set_value) on the owning main context.
    pub fn post_value(&self, value: T) -> Result<(), MainContextError> {
        let observable = self.clone();
        self.main.dispatch(move || {
            if let Err(e) = observable.set_value(value) {
                warn!(error = %e, "Posted value was not applied");
            }
        })
    }

    /// Wait for the current or next value.
    ///
    /// See [`await_value`](super::await_value::await_value).
    pub async fn next_value(&self) -> T {
        super::await_value::await_value(self.clone(), self.main.clone()).await
    }

    /// Deliver the current value to every observer that has not seen it,
    /// until a pass ends with nobody behind.
    fn dispatch_latest(&self) {
        loop {
            let (value, version, mut observers) = {
                let mut state = self.lock();
                let Some(value) = state.value.clone() else {
                    state.dispatching = false;
                    return;
                };
                let observers = std::mem::take(&mut state.observers);
                state.in_flight = observers.iter().map(|r| r.id).collect();
                (value, state.version, observers)
            };

            observers.retain_mut(|r| {
                if r.seen >= version {
                    return true;
                }
                if self.lock().removed_while_dispatching.contains(&r.id) {
                    return false;
                }
                r.seen = version;
                let keep = r.observer.on_changed(&value) == Observation::Keep;
                if !keep {
                    self.lock().in_flight.retain(|id| *id != r.id);
                }
                keep
            });

            let mut state = self.lock();
            let removed = std::mem::take(&mut state.removed_while_dispatching);
            state.in_flight.clear();
            observers.retain(|r| !removed.contains(&r.id));
            let added = std::mem::replace(&mut state.observers, observers);
            state.observers.extend(added);

            let current = state.version;
            if state.observers.iter().all(|r| r.seen >= current) {
                state.dispatching = false;
                return;
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone + Send + 'static> ObservableSource<T> for Observable<T> {
    fn observe_forever(&self, observer: Box<dyn Observer<T>>) -> ObserverId {
        if !self.main.is_current() {
            warn!("Observer registered off the main context");
        }

        let id = ObserverId::next();
        {
            let mut state = self.lock();
            state.observers.push(Registration {
                id,
                observer,
                seen: 0,
            });
            // A running dispatch reaches the new observer before it finishes.
            if state.value.is_none() || state.dispatching {
                return id;
            }
            state.dispatching = true;
        }

        self.dispatch_latest();
        id
    }

    fn remove_observer(&self, id: ObserverId) -> bool {
        let mut state = self.lock();
        if let Some(pos) = state.observers.iter().position(|r| r.id == id) {
            state.observers.remove(pos);
            return true;
        }
        if state.in_flight.contains(&id) && !state.removed_while_dispatching.contains(&id) {
            state.removed_while_dispatching.push(id);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use super::*;

    fn recorder(seen: Arc<StdMutex<Vec<i32>>>, then: Observation) -> Box<dyn Observer<i32>> {
        Box::new(move |value: &i32| {
            seen.lock().unwrap().push(*value);
            then
        })
    }

    #[tokio::test]
    async fn set_value_off_main_context_is_rejected() {
        let main = MainContext::spawn();
        let observable = Observable::new(main);

        assert_eq!(observable.set_value(1), Err(ObservableError::NotOnMainContext));
        assert_eq!(observable.value(), None);
    }

    #[tokio::test]
    async fn post_value_marshals_onto_main_context() {
        let main = MainContext::spawn();
        let observable = Observable::new(main.clone());

        observable.post_value(3).unwrap();
        main.run(|| ()).await.unwrap();

        assert_eq!(observable.value(), Some(3));
    }

    #[tokio::test]
    async fn observers_receive_current_value_on_registration() {
        let main = MainContext::spawn();
        let observable = Observable::with_value(main.clone(), 9);
        let seen = Arc::new(StdMutex::new(Vec::new()));

        let o = observable.clone();
        let s = seen.clone();
        main.run(move || o.observe_forever(recorder(s, Observation::Keep)))
            .await
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![9]);
        assert_eq!(observable.observer_count(), 1);
    }

    #[tokio::test]
    async fn detaching_observer_is_not_stored() {
        let main = MainContext::spawn();
        let observable = Observable::with_value(main.clone(), 1);
        let seen = Arc::new(StdMutex::new(Vec::new()));

        let o = observable.clone();
        let s = seen.clone();
        let id = main
            .run(move || o.observe_forever(recorder(s, Observation::Detach)))
            .await
            .unwrap();

        assert_eq!(observable.observer_count(), 0);
        let o = observable.clone();
        assert_eq!(main.run(move || o.remove_observer(id)).await, Ok(false));
    }

    #[tokio::test]
    async fn keeping_observers_see_every_value() {
        let main = MainContext::spawn();
        let observable = Observable::new(main.clone());
        let seen = Arc::new(StdMutex::new(Vec::new()));

        let o = observable.clone();
        let s = seen.clone();
        main.run(move || {
            o.observe_forever(recorder(s, Observation::Keep));
            o.set_value(1).unwrap();
            o.set_value(2).unwrap();
        })
        .await
        .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn removed_observer_stops_receiving() {
        let main = MainContext::spawn();
        let observable = Observable::new(main.clone());
        let seen = Arc::new(StdMutex::new(Vec::new()));

        let o = observable.clone();
        let s = seen.clone();
        main.run(move || {
            let id = o.observe_forever(recorder(s, Observation::Keep));
            o.set_value(1).unwrap();
            assert!(o.remove_observer(id));
            o.set_value(2).unwrap();
        })
        .await
        .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1]);
        assert!(!observable.has_observers());
    }

    #[tokio::test]
    async fn set_from_inside_observer_redispatches_latest() {
        let main = MainContext::spawn();
        let observable = Observable::new(main.clone());
        let seen = Arc::new(StdMutex::new(Vec::new()));

        let o = observable.clone();
        let s = seen.clone();
        main.run(move || {
            let inner = o.clone();
            o.observe_forever(Box::new(move |value: &i32| {
                s.lock().unwrap().push(*value);
                if *value == 1 {
                    inner.set_value(10).unwrap();
                }
                Observation::Keep
            }));
            o.set_value(1).unwrap();
        })
        .await
        .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 10]);
        assert_eq!(observable.value(), Some(10));
    }

    #[tokio::test]
    async fn observer_removed_by_an_earlier_one_is_skipped() {
        let main = MainContext::spawn();
        let observable = Observable::new(main.clone());
        let seen = Arc::new(StdMutex::new(Vec::new()));

        let o = observable.clone();
        let s = seen.clone();
        main.run(move || {
            let victim = Arc::new(AtomicU64::new(0));
            let target = victim.clone();
            let inner = o.clone();
            o.observe_forever(Box::new(move |_: &i32| {
                if let Some(id) = ObserverId::from_u64(target.load(Ordering::SeqCst)) {
                    assert!(inner.remove_observer(id));
                }
                Observation::Keep
            }));
            let id = o.observe_forever(recorder(s, Observation::Keep));
            victim.store(id.as_u64(), Ordering::SeqCst);
            o.set_value(1).unwrap();
        })
        .await
        .unwrap();

        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(observable.observer_count(), 1);
    }

    #[tokio::test]
    async fn removing_unknown_id_during_dispatch_reports_false() {
        let main = MainContext::spawn();
        let observable = Observable::new(main.clone());
        let answers = Arc::new(StdMutex::new(Vec::new()));

        let o = observable.clone();
        let a = answers.clone();
        main.run(move || {
            let inner = o.clone();
            o.observe_forever(Box::new(move |_: &i32| {
                a.lock().unwrap().push(inner.remove_observer(ObserverId::next()));
                Observation::Keep
            }));
            o.set_value(1).unwrap();
        })
        .await
        .unwrap();

        assert_eq!(*answers.lock().unwrap(), vec![false]);
        assert_eq!(observable.observer_count(), 1);
    }

    #[tokio::test]
    async fn registering_observer_sees_value_it_sets() {
        let main = MainContext::spawn();
        let observable = Observable::with_value(main.clone(), 1);
        let seen = Arc::new(StdMutex::new(Vec::new()));

        let o = observable.clone();
        let s = seen.clone();
        main.run(move || {
            let inner = o.clone();
            o.observe_forever(Box::new(move |value: &i32| {
                s.lock().unwrap().push(*value);
                if *value == 1 {
                    inner.set_value(2).unwrap();
                }
                Observation::Keep
            }));
        })
        .await
        .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
        assert_eq!(observable.value(), Some(2));
    }

    #[tokio::test]
    async fn observer_registered_during_dispatch_gets_value_once() {
        let main = MainContext::spawn();
        let observable = Observable::new(main.clone());
        let early = Arc::new(StdMutex::new(Vec::new()));
        let late = Arc::new(StdMutex::new(Vec::new()));

        let o = observable.clone();
        let (e, l) = (early.clone(), late.clone());
        main.run(move || {
            let inner = o.clone();
            let mut late = Some(l);
            o.observe_forever(Box::new(move |value: &i32| {
                e.lock().unwrap().push(*value);
                if let Some(l) = late.take() {
                    inner.observe_forever(recorder(l, Observation::Keep));
                }
                Observation::Keep
            }));
            o.set_value(4).unwrap();
        })
        .await
        .unwrap();

        assert_eq!(*early.lock().unwrap(), vec![4]);
        assert_eq!(*late.lock().unwrap(), vec![4]);
        assert_eq!(observable.observer_count(), 2);
    }
}

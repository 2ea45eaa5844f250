//! Single serialized execution context
//!
//! Observables are owned by one main context: a tokio task that runs
//! submitted jobs one at a time, in submission order. Code that is already
//! running on the context executes [`MainContext::run`] inline.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::errors::MainContextError;

type Job = Box<dyn FnOnce() + Send + 'static>;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

tokio::task_local! {
    static CURRENT_CONTEXT: u64;
}

/// Handle to the main context. Cheap to clone; the worker stops once every
/// handle has been dropped.
#[derive(Debug, Clone)]
pub struct MainContext {
    id: u64,
    jobs: mpsc::UnboundedSender<Job>,
}

impl MainContext {
    /// Start a main context on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn() -> Self {
        let id = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
        let (jobs, mut receiver) = mpsc::unbounded_channel::<Job>();

        tokio::spawn(async move {
            debug!(context = id, "Main context started");
            while let Some(job) = receiver.recv().await {
                CURRENT_CONTEXT.sync_scope(id, job);
            }
            debug!(context = id, "Main context stopped");
        });

        Self { id, jobs }
    }

    /// Whether the caller is executing a job of this context.
    pub fn is_current(&self) -> bool {
        CURRENT_CONTEXT
            .try_with(|current| *current == self.id)
            .unwrap_or(false)
    }

    /// Queue `job` behind everything already submitted, even when called
    /// from the context itself.
    pub fn dispatch(&self, job: impl FnOnce() + Send + 'static) -> Result<(), MainContextError> {
        self.jobs
            .send(Box::new(job))
            .map_err(|_| MainContextError::Closed)
    }

    /// Run `f` on this context and return its result.
    ///
    /// Runs inline when the caller is already on the context.
    pub async fn run<F, R>(&self, f: F) -> Result<R, MainContextError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.is_current() {
            return Ok(f());
        }

        let (tx, rx) = oneshot::channel();
        self.dispatch(move || {
            let _ = tx.send(f());
        })?;
        rx.await.map_err(|_| MainContextError::Closed)
    }
}

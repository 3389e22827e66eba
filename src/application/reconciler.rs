//! Periodic reconciliation of the local store against the remote list.
//!
//! The merge is an additive union keyed by exact text: remote records are
//! appended when their text is not present yet, local records are never
//! changed or removed.

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::time::{Instant, MissedTickBehavior};

use crate::domain::{
    MergeOutcome, RemoteItem, Result, SyncConfig, SyncOutcome, SyncState, SYNC_NOTIFICATION,
};
use crate::infrastructure::RemoteSource;

use super::quote_store::{QuoteStore, SharedStore};

/// Receives completion signals so views can refresh.
pub trait SyncListener: Send + Sync {
    /// Called after every successful merge, including ones that added nothing.
    fn on_synced(&self, outcome: &MergeOutcome, message: &str);
}

/// Merge a remote snapshot into the store and persist the result.
///
/// # Errors
/// Returns error if persisting the merged sequence fails; the store is
/// left unchanged in that case.
pub fn reconcile(store: &mut QuoteStore, items: Vec<RemoteItem>) -> Result<MergeOutcome> {
    let mut known: HashSet<String> = store.records().iter().map(|q| q.text.clone()).collect();
    let mut outcome = MergeOutcome::default();

    for record in items.into_iter().map(RemoteItem::into_record) {
        if known.insert(record.text.clone()) {
            outcome.added.push(record);
        } else {
            outcome.skipped += 1;
        }
    }

    if outcome.added.is_empty() {
        store.persist()?;
    } else {
        store.extend(outcome.added.clone())?;
    }

    tracing::debug!(
        added = outcome.added.len(),
        skipped = outcome.skipped,
        "Remote snapshot merged"
    );

    Ok(outcome)
}

/// Clears the in-flight flag when a sync attempt ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Fetches the remote list and merges it into the shared store.
pub struct Reconciler {
    store: SharedStore,
    remote: Arc<dyn RemoteSource>,
    listener: Arc<dyn SyncListener>,
    state: Mutex<SyncState>,
    in_flight: AtomicBool,
}

impl Reconciler {
    /// Create a reconciler for the given store and remote.
    #[must_use]
    pub fn new(
        store: SharedStore,
        remote: Arc<dyn RemoteSource>,
        listener: Arc<dyn SyncListener>,
    ) -> Self {
        Self {
            store,
            remote,
            listener,
            state: Mutex::new(SyncState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Snapshot of the current sync state.
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update_state(&self, f: impl FnOnce(SyncState) -> SyncState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = f(state.clone());
    }

    /// Run one sync attempt.
    ///
    /// Returns `SyncOutcome::AlreadyRunning` without fetching when another
    /// attempt is still in flight.
    ///
    /// # Errors
    /// Returns `AppError::Network` if the fetch fails, or a storage error if
    /// the merged sequence cannot be persisted. The store is untouched and
    /// the listener is not notified in both cases.
    pub async fn sync_once(&self) -> Result<SyncOutcome> {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            return Ok(SyncOutcome::AlreadyRunning);
        };

        self.update_state(SyncState::syncing);
        tracing::info!("Starting sync...");

        // The store lock is not held across the fetch.
        let items = match self.remote.fetch_items().await {
            Ok(items) => items,
            Err(e) => {
                tracing::error!(error = %e, "Fetch failed");
                self.update_state(|s| s.with_error(e.to_string()));
                return Err(e);
            }
        };

        let merged = {
            let mut store = self.store.lock().await;
            reconcile(&mut store, items)
        };

        match merged {
            Ok(outcome) => {
                self.update_state(|s| s.completed(outcome.added.len()));
                tracing::info!(
                    added = outcome.added.len(),
                    skipped = outcome.skipped,
                    "Sync completed"
                );
                self.listener.on_synced(&outcome, SYNC_NOTIFICATION);
                Ok(SyncOutcome::Merged(outcome))
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to persist merged quotes");
                self.update_state(|s| s.with_error(e.to_string()));
                Err(e)
            }
        }
    }

    /// One timer tick. Failures are logged and wait for the next tick.
    async fn tick(&self) {
        match self.sync_once().await {
            Ok(SyncOutcome::Merged(_)) | Err(_) => {}
            Ok(SyncOutcome::AlreadyRunning) => {
                tracing::debug!("Previous sync still in flight, skipping tick");
            }
        }
    }

    /// Sync on a fixed interval until `shutdown` resolves.
    ///
    /// The first attempt happens one interval after start unless
    /// `sync_on_start` is set. Each attempt runs as its own task so a slow
    /// fetch never delays the timer; overlapping ticks are skipped.
    pub async fn run<F>(self: Arc<Self>, config: &SyncConfig, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        if !config.enabled {
            tracing::info!("Periodic sync disabled");
            shutdown.await;
            return;
        }

        let period = config.interval();
        let start = if config.sync_on_start {
            Instant::now()
        } else {
            Instant::now() + period
        };

        let mut ticker = tokio::time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_secs = period.as_secs(), "Periodic sync started");

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = ticker.tick() => {
                    let this = Arc::clone(&self);
                    tokio::spawn(async move { this.tick().await });
                }
            }
        }

        tracing::info!("Periodic sync stopped");
    }
}

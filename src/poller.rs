//! Periodic snapshot refresh
//!
//! The poller rebuilds the snapshot on a fixed interval, starting with one
//! immediate cycle. The latest successful snapshot lives in a
//! [`SnapshotStore`]; readers get it through a cheap synchronous accessor and
//! never observe a partially built value, because each publish is a single
//! replacement of an `Arc`.
//!
//! Cycles never overlap. If a tick fires while the previous cycle is still
//! fetching, that tick is skipped and logged, so a slow cycle can never
//! overwrite the result of a newer one.

use crate::aggregation_types::Snapshot;
use crate::snapshot::SnapshotBuilder;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

/// Default poll interval (5 minutes)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(300_000);

/// Called with every successfully published snapshot
pub type PublishCallback = Box<dyn Fn(Arc<Snapshot>) + Send + Sync>;

/// Owner of the latest published snapshot
#[derive(Debug)]
pub struct SnapshotStore {
    tx: watch::Sender<Arc<Snapshot>>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// Create a store holding an empty snapshot
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(Snapshot::default()));
        Self { tx }
    }

    /// Replace the latest snapshot
    pub fn publish(&self, snapshot: Arc<Snapshot>) {
        self.tx.send_replace(snapshot);
    }

    /// The latest snapshot
    pub fn latest(&self) -> Arc<Snapshot> {
        self.tx.borrow().clone()
    }

    /// A read-only handle for other components
    pub fn handle(&self) -> SnapshotHandle {
        SnapshotHandle {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read-only view of a [`SnapshotStore`]
#[derive(Debug, Clone)]
pub struct SnapshotHandle {
    rx: watch::Receiver<Arc<Snapshot>>,
}

impl SnapshotHandle {
    /// The latest snapshot; empty before the first successful cycle
    pub fn latest(&self) -> Arc<Snapshot> {
        self.rx.borrow().clone()
    }

    /// Wait until a snapshot newer than the last one seen is published
    ///
    /// Returns `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Arc<Snapshot>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// Clears the in-progress flag when a cycle ends, even by panic
struct CycleGuard<'a>(&'a AtomicBool);

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives snapshot rebuilds on a fixed interval
pub struct Poller {
    builder: SnapshotBuilder,
    interval: Duration,
    store: SnapshotStore,
    in_progress: AtomicBool,
    on_publish: Option<PublishCallback>,
}

impl Poller {
    /// Create a poller; a zero interval is raised to one millisecond
    pub fn new(builder: SnapshotBuilder, interval: Duration) -> Self {
        Self {
            builder,
            interval: interval.max(Duration::from_millis(1)),
            store: SnapshotStore::new(),
            in_progress: AtomicBool::new(false),
            on_publish: None,
        }
    }

    /// Register the callback invoked after each successful publish
    pub fn with_on_publish<F>(mut self, callback: F) -> Self
    where
        F: Fn(Arc<Snapshot>) + Send + Sync + 'static,
    {
        self.on_publish = Some(Box::new(callback));
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The last successfully published snapshot
    pub fn latest(&self) -> Arc<Snapshot> {
        self.store.latest()
    }

    /// A read-only handle to the latest snapshot
    pub fn handle(&self) -> SnapshotHandle {
        self.store.handle()
    }

    /// Whether a cycle is currently running
    pub fn is_polling(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Run one build-and-publish cycle
    ///
    /// Returns whether a new snapshot was published. On failure the previous
    /// snapshot stays in place.
    pub async fn poll_once(&self) -> bool {
        match self.builder.build().await {
            Ok(snapshot) => {
                self.publish(snapshot);
                true
            }
            Err(e) => {
                error!("Poll error: {}", e);
                false
            }
        }
    }

    fn publish(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        let totals = snapshot.totals();
        self.store.publish(Arc::clone(&snapshot));
        info!(
            "Updated: {} members, {} active today",
            totals.members, totals.active
        );

        if let Some(callback) = &self.on_publish {
            callback(snapshot);
        }
    }

    /// Start a cycle in the background unless one is already running
    ///
    /// Returns the spawned task, or `None` if the cycle was skipped.
    pub fn start_cycle(self: &Arc<Self>) -> Option<tokio::task::JoinHandle<bool>> {
        if self.in_progress.swap(true, Ordering::AcqRel) {
            warn!("Previous poll cycle still running, skipping this tick");
            return None;
        }

        let this = Arc::clone(self);
        Some(tokio::spawn(async move {
            let _guard = CycleGuard(&this.in_progress);
            this.poll_once().await
        }))
    }

    /// Poll until `shutdown` resolves
    ///
    /// The first cycle starts immediately. A cycle still in flight at shutdown
    /// is not cancelled.
    pub async fn run_until<F>(self: Arc<Self>, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            "Polling usage every {}s over the last {} days",
            self.interval.as_secs_f64(),
            self.builder.all_time_days()
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let _ = self.start_cycle();
                }
                _ = &mut shutdown => {
                    debug!("Poller received shutdown");
                    break;
                }
            }
        }
    }
}

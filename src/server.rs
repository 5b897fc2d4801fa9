//! HTTP server for dashboard clients
//!
//! - `GET /api/events`: Server-Sent Events; the current snapshot on connect
//!   (when non-empty), then one message per published snapshot.
//! - `GET /api/team`: the current snapshot as a JSON array.
//!
//! Every message carries the full member list, never a diff. Open event
//! streams end when shutdown is signalled, so graceful shutdown does not wait
//! on connected dashboards.

use crate::aggregation_types::Snapshot;
use crate::error::Result;
use crate::poller::SnapshotHandle;
use axum::{
    Json, Router,
    extract::State,
    http::Method,
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

/// Snapshots buffered per subscriber before a slow client starts skipping
pub const BROADCAST_CAPACITY: usize = 16;

/// Interval between SSE keep-alive comments
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Fan-out of published snapshots to connected clients
///
/// Publishing never blocks. Each client holds its own receiver; a client that
/// disconnects drops it, and a client that falls behind skips ahead without
/// affecting anyone else.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<Arc<Snapshot>>,
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(BROADCAST_CAPACITY)
    }
}

impl Broadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Send a snapshot to every current subscriber
    ///
    /// Returns how many subscribers it was queued for.
    pub fn publish(&self, snapshot: Arc<Snapshot>) -> usize {
        match self.tx.send(snapshot) {
            Ok(receivers) => {
                debug!("Broadcast snapshot to {} client(s)", receivers);
                receivers
            }
            Err(_) => 0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Snapshot>> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Resolves once `true` is sent on `rx`, or its sender is dropped
pub async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    loop {
        let stop = *rx.borrow_and_update();
        if stop || rx.changed().await.is_err() {
            return;
        }
    }
}

/// Shared state for the HTTP handlers
#[derive(Debug, Clone)]
pub struct ServerState {
    pub snapshots: SnapshotHandle,
    pub broadcaster: Broadcaster,
    shutdown: Option<watch::Receiver<bool>>,
}

impl ServerState {
    pub fn new(snapshots: SnapshotHandle, broadcaster: Broadcaster) -> Self {
        Self {
            snapshots,
            broadcaster,
            shutdown: None,
        }
    }

    /// End open event streams once `true` is sent on `shutdown`
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Future that resolves when event streams must end
    fn stream_shutdown(&self) -> impl Future<Output = ()> + Send + 'static + use<> {
        let shutdown = self.shutdown.clone();
        async move {
            match shutdown {
                Some(rx) => wait_for_shutdown(rx).await,
                None => std::future::pending().await,
            }
        }
    }
}

/// Build the application router
pub fn router(state: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    let api_routes = Router::new()
        .route("/events", get(events))
        .route("/team", get(team));

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(cors)
}

/// Bind `addr` and serve until `shutdown` resolves
pub async fn serve<F>(router: Router, addr: SocketAddr, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    serve_on(listener, router, shutdown).await
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn serve_on<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Dashboard feed listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Serialize a snapshot into one SSE message
fn snapshot_event(snapshot: &Snapshot) -> Event {
    let data = serde_json::to_string(snapshot).unwrap_or_else(|e| {
        warn!("Failed to serialize snapshot: {}", e);
        "[]".to_string()
    });
    Event::default().data(data)
}

/// REST fallback: the current snapshot
async fn team(State(state): State<ServerState>) -> Json<Snapshot> {
    Json(Snapshot::clone(&state.snapshots.latest()))
}

/// SSE stream of snapshots
async fn events(State(state): State<ServerState>) -> impl IntoResponse {
    // Subscribe before reading the current snapshot so nothing published in
    // between is lost.
    let mut rx = state.broadcaster.subscribe();
    let current = state.snapshots.latest();
    let shutdown = state.stream_shutdown();
    debug!(
        "SSE client connected ({} subscribed)",
        state.broadcaster.subscriber_count()
    );

    let stream = async_stream::stream! {
        tokio::pin!(shutdown);
        if !current.is_empty() {
            yield Ok::<Event, Infallible>(snapshot_event(&current));
        }
        loop {
            let received = tokio::select! {
                _ = &mut shutdown => {
                    debug!("Closing SSE stream for shutdown");
                    break;
                }
                received = rx.recv() => received,
            };
            match received {
                Ok(snapshot) => yield Ok(snapshot_event(&snapshot)),
                Err(RecvError::Lagged(skipped)) => {
                    debug!("SSE client lagged, skipped {} snapshot(s)", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation_types::Member;
    use crate::poller::SnapshotStore;
    use crate::types::IdentityKey;

    fn snapshot(lines: u64) -> Arc<Snapshot> {
        Arc::new(Snapshot::new(vec![Member {
            id: 1,
            email: IdentityKey::new("a@x.com"),
            name: "A".to_string(),
            avatar: "A".to_string(),
            active: true,
            lines_today: lines,
            lines_this_week: lines,
            lines_all_time: lines,
        }]))
    }

    #[test]
    fn test_publish_without_subscribers() {
        let broadcaster = Broadcaster::default();
        assert_eq!(broadcaster.publish(snapshot(1)), 0);
    }

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let broadcaster = Broadcaster::default();
        let mut a = broadcaster.subscribe();
        let mut b = broadcaster.subscribe();
        assert_eq!(broadcaster.publish(snapshot(5)), 2);
        assert_eq!(a.recv().await.unwrap().members()[0].lines_today, 5);
        assert_eq!(b.recv().await.unwrap().members()[0].lines_today, 5);
    }

    #[tokio::test]
    async fn test_dropped_subscriber_does_not_affect_others() {
        let broadcaster = Broadcaster::default();
        let gone = broadcaster.subscribe();
        let mut alive = broadcaster.subscribe();
        drop(gone);

        assert_eq!(broadcaster.publish(snapshot(3)), 1);
        assert_eq!(broadcaster.subscriber_count(), 1);
        assert_eq!(alive.recv().await.unwrap().members()[0].lines_today, 3);
    }

    #[tokio::test]
    async fn test_team_handler_returns_latest() {
        let store = SnapshotStore::new();
        store.publish(snapshot(8));
        let state = ServerState::new(store.handle(), Broadcaster::default());

        let Json(body) = team(State(state)).await;
        assert_eq!(body.members()[0].lines_today, 8);
    }

    #[tokio::test]
    async fn test_wait_for_shutdown() {
        let (tx, rx) = watch::channel(false);
        let waiting = tokio::spawn(wait_for_shutdown(rx.clone()));
        tokio::task::yield_now().await;
        assert!(!waiting.is_finished());

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), waiting)
            .await
            .unwrap()
            .unwrap();

        // Already signalled, and a dropped sender, both resolve at once
        tokio::time::timeout(Duration::from_secs(5), wait_for_shutdown(rx))
            .await
            .unwrap();
        let (tx, rx) = watch::channel(false);
        drop(tx);
        tokio::time::timeout(Duration::from_secs(5), wait_for_shutdown(rx))
            .await
            .unwrap();
    }
}

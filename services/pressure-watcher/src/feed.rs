//! Live reading subscriptions
//!
//! A [`ReadingFeed`] delivers the newest readings as a full, newest-first
//! snapshot: once when the subscription opens and again after every change.
//! Backends differ only in how they learn about changes.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::io::HttpClient;
use crate::reading::Reading;
use crate::store::{MemoryStore, ReadingStore};

/// Point-in-time ordered batch of readings, newest first
pub type Snapshot = Vec<Reading>;

/// Callback invoked with every snapshot
pub type SnapshotHandler =
    Arc<dyn Fn(Snapshot) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Wrap an async closure as a [`SnapshotHandler`]
pub fn snapshot_handler<F, Fut>(f: F) -> SnapshotHandler
where
    F: Fn(Snapshot) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(
        move |snapshot: Snapshot| -> Pin<Box<dyn Future<Output = ()> + Send>> {
            Box::pin(f(snapshot))
        },
    )
}

/// Capability to subscribe to the latest readings
pub trait ReadingFeed: Send + Sync {
    /// Start delivering snapshots of the `latest_n` newest readings to
    /// `on_change`. Must be called from within a Tokio runtime.
    fn subscribe(&self, latest_n: usize, on_change: SnapshotHandler) -> Subscription;
}

/// Handle to a running subscription. Dropping it cancels delivery.
#[derive(Debug)]
pub struct Subscription {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    fn spawn<F>(cancel: CancellationToken, fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            cancel,
            task: Some(tokio::spawn(fut)),
        }
    }

    /// Stop delivering snapshots
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel and wait for the delivery task to finish
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl ReadingFeed for MemoryStore {
    fn subscribe(&self, latest_n: usize, on_change: SnapshotHandler) -> Subscription {
        let store = self.clone();
        let mut revision = self.watch_revision();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        Subscription::spawn(cancel, async move {
            loop {
                revision.borrow_and_update();
                match store.latest(latest_n).await {
                    Ok(snapshot) => {
                        tracing::debug!("Delivering snapshot of {} readings", snapshot.len());
                        on_change(snapshot).await;
                    }
                    Err(e) => tracing::warn!("Failed to query latest readings: {}", e),
                }

                tokio::select! {
                    changed = revision.changed() => {
                        if changed.is_err() {
                            tracing::debug!("Reading store closed, ending subscription");
                            break;
                        }
                    }
                    _ = token.cancelled() => {
                        tracing::debug!("Store subscription cancelled");
                        break;
                    }
                }
            }
        })
    }
}

/// Feed that polls another pressure-watcher's `/api/readings`
pub struct PollingFeed {
    base_url: String,
    interval: Duration,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for PollingFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingFeed")
            .field("base_url", &self.base_url)
            .field("interval", &self.interval)
            .finish()
    }
}

impl PollingFeed {
    pub fn new(base_url: impl Into<String>, interval: Duration, http: Arc<dyn HttpClient>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        tracing::debug!("Created PollingFeed for {} every {:?}", base_url, interval);
        Self {
            base_url,
            interval,
            http,
        }
    }

    fn readings_url(&self, latest_n: usize) -> String {
        format!("{}/api/readings?limit={}", self.base_url, latest_n)
    }
}

/// Fetch one snapshot, `None` on any failure
async fn fetch_snapshot(http: &dyn HttpClient, url: &str) -> Option<Snapshot> {
    match http.get(url).await {
        Ok(response) if response.is_success() => {
            match serde_json::from_str::<Snapshot>(&response.body) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    tracing::debug!("Failed to parse readings from {}: {}", url, e);
                    None
                }
            }
        }
        Ok(response) => {
            tracing::debug!("Non-2xx response from {}: status={}", url, response.status);
            None
        }
        Err(e) => {
            tracing::debug!("Failed to poll {}: {}", url, e);
            None
        }
    }
}

impl ReadingFeed for PollingFeed {
    fn subscribe(&self, latest_n: usize, on_change: SnapshotHandler) -> Subscription {
        let url = self.readings_url(latest_n);
        let http = Arc::clone(&self.http);
        let interval = self.interval;
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        Subscription::spawn(cancel, async move {
            let mut last: Option<Snapshot> = None;
            let mut failures: u32 = 0;
            loop {
                match fetch_snapshot(http.as_ref(), &url).await {
                    Some(snapshot) => {
                        failures = 0;
                        if last.as_ref() != Some(&snapshot) {
                            last = Some(snapshot.clone());
                            on_change(snapshot).await;
                        }
                    }
                    None => {
                        failures += 1;
                        if failures == 5 {
                            tracing::warn!("Polling {} has failed {} times in a row", url, failures);
                        }
                    }
                }

                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = token.cancelled() => {
                        tracing::debug!("Polling feed for {} cancelled", url);
                        break;
                    }
                }
            }
        })
    }
}

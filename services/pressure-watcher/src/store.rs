//! Reading store: the `readings` collection

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{watch, RwLock};

use crate::reading::Reading;

/// Persistence capability for readings
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Add a reading, returning the id assigned to it
    async fn add(&self, reading: Reading) -> crate::Result<String>;

    /// The `limit` newest readings, ordered by timestamp descending
    async fn latest(&self, limit: usize) -> crate::Result<Vec<Reading>>;
}

/// Thread-safe shared store handle
pub type StoreHandle = Arc<dyn ReadingStore>;

/// In-process store bounded to `capacity` documents.
///
/// Cloning yields another handle onto the same collection. Every insert bumps
/// a revision that live subscriptions wait on.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

struct Inner {
    readings: RwLock<VecDeque<Reading>>,
    capacity: usize,
    revision: watch::Sender<u64>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("capacity", &self.inner.capacity)
            .finish()
    }
}

impl MemoryStore {
    pub fn new(capacity: usize) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                readings: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
                capacity: capacity.max(1),
                revision,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub async fn len(&self) -> usize {
        self.inner.readings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.readings.read().await.is_empty()
    }

    /// Receiver that changes whenever a reading is added
    pub(crate) fn watch_revision(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn add(&self, mut reading: Reading) -> crate::Result<String> {
        let id = reading
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        reading.id = Some(id.clone());

        {
            let mut readings = self.inner.readings.write().await;
            if readings.len() >= self.inner.capacity {
                readings.pop_front();
            }
            readings.push_back(reading);
        }

        self.inner.revision.send_modify(|rev| *rev += 1);
        tracing::debug!("Stored reading {}", id);
        Ok(id)
    }

    async fn latest(&self, limit: usize) -> crate::Result<Vec<Reading>> {
        let readings = self.inner.readings.read().await;
        // Newest insert first so equal timestamps keep arrival order
        let mut sorted: Vec<Reading> = readings.iter().rev().cloned().collect();
        drop(readings);

        sorted.sort_by_key(|r| std::cmp::Reverse(r.observed_at()));
        sorted.truncate(limit);
        Ok(sorted)
    }
}

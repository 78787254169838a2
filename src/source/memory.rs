use super::client::LogSource;
use crate::model::HealthLog;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// A [`LogSource`] over logs already held in memory.
///
/// Clones share the same logs and fetch counter, so a caller can keep a
/// handle for writes while the cache owns another.
#[derive(Clone, Default)]
pub struct MemoryLogSource {
    logs: Arc<RwLock<Vec<HealthLog>>>,
    fetches: Arc<AtomicUsize>,
}

impl MemoryLogSource {
    pub fn new(logs: Vec<HealthLog>) -> Self {
        Self {
            logs: Arc::new(RwLock::new(logs)),
            fetches: Arc::default(),
        }
    }

    /// Appends a log. Callers must invalidate any cache in front of this source.
    pub async fn push(&self, log: HealthLog) {
        self.logs.write().await.push(log);
    }

    /// Number of `fetch_all` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LogSource for MemoryLogSource {
    async fn fetch_all(&self) -> anyhow::Result<Vec<HealthLog>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.logs.read().await.clone())
    }
}

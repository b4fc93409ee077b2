//! In-memory progress store
//!
//! Reference [`ProgressStore`] used by tests, the simulator, and hosts that do
//! not need durability across restarts.

use crate::error::{LumenError, Result};
use crate::traits::ProgressStore;
use crate::types::{MediaId, ProgressRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Progress store backed by a `HashMap`
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    records: RwLock<HashMap<MediaId, ProgressRecord>>,
    fail_writes: AtomicBool,
}

impl MemoryProgressStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records
    pub fn with_records(records: impl IntoIterator<Item = ProgressRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.media_id.clone(), record))
            .collect();

        Self {
            records: RwLock::new(records),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent write fail (simulates an unavailable backend)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of every stored record
    pub async fn records(&self) -> Vec<ProgressRecord> {
        self.records.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn read(&self, media_id: &MediaId) -> Result<Option<ProgressRecord>> {
        Ok(self.records.read().await.get(media_id).cloned())
    }

    async fn write(
        &self,
        media_id: &MediaId,
        elapsed_seconds: f64,
        duration_seconds: f64,
    ) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LumenError::storage(format!(
                "write rejected for {}",
                media_id
            )));
        }

        let record = ProgressRecord::new(media_id.clone(), elapsed_seconds, duration_seconds);
        self.records.write().await.insert(media_id.clone(), record);
        Ok(())
    }
}

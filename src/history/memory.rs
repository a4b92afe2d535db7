//! In-process history store

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tracing::debug;

use super::{sort_newest_first, HistoryRecord, HistoryStore};
use crate::{DerivationResult, QueryError, Result};

#[derive(Debug)]
struct Inner {
    records: BTreeMap<i64, HistoryRecord>,
    next_id: i64,
}

/// History store kept in memory for the lifetime of the process
#[derive(Debug)]
pub struct MemoryHistoryStore {
    inner: Mutex<Inner>,
    live: watch::Sender<Vec<HistoryRecord>>,
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        let (live, _) = watch::channel(Vec::new());
        Self {
            inner: Mutex::new(Inner {
                records: BTreeMap::new(),
                next_id: 1,
            }),
            live,
        }
    }

    fn snapshot(inner: &Inner) -> Vec<HistoryRecord> {
        let mut records: Vec<HistoryRecord> = inner.records.values().cloned().collect();
        sort_newest_first(&mut records);
        records
    }

    // Called with the lock held so observers see writes in commit order
    fn publish(&self, inner: &Inner) {
        self.live.send_replace(Self::snapshot(inner));
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn save(&self, result: &DerivationResult) -> Result<HistoryRecord> {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id;
        if inner.records.contains_key(&id) {
            return Err(QueryError::ProcessingError {
                message: "saved search ids exhausted".into(),
            });
        }
        inner.next_id = id.saturating_add(1);

        let record = HistoryRecord::from_result(id, result);
        inner.records.insert(id, record.clone());
        debug!(id, query = %record.query_text, "Saved search stored");
        self.publish(&inner);
        Ok(record)
    }

    async fn put(&self, record: HistoryRecord) -> Result<HistoryRecord> {
        let mut inner = self.inner.lock().await;
        inner.next_id = inner.next_id.max(record.id.saturating_add(1));
        if inner.records.insert(record.id, record.clone()).is_some() {
            debug!(id = record.id, "Saved search replaced");
        }
        self.publish(&inner);
        Ok(record)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.records.remove(&id).is_some() {
            debug!(id, "Saved search deleted");
            self.publish(&inner);
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<HistoryRecord>> {
        let inner = self.inner.lock().await;
        Ok(Self::snapshot(&inner))
    }

    fn observe_all(&self) -> watch::Receiver<Vec<HistoryRecord>> {
        self.live.subscribe()
    }
}

//! Saved search history
//!
//! Persisted derivation results, exposed as a live sequence ordered newest
//! first. Records are created only by an explicit save, removed only by an
//! explicit delete and never edited in place.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::image_loader::ImageRef;
use crate::{DerivationResult, Result};

pub use memory::MemoryHistoryStore;
pub use sqlite::SqliteHistoryStore;

/// A persisted derivation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Store-assigned identifier, unique and stable
    pub id: i64,
    pub image_ref: Option<ImageRef>,
    pub category: String,
    pub color_name: String,
    pub query_text: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn from_result(id: i64, result: &DerivationResult) -> Self {
        Self {
            id,
            image_ref: result.image_ref.clone(),
            category: result.category.clone(),
            color_name: result.color_name.clone(),
            query_text: result.query_text.clone(),
            created_at: result.created_at,
        }
    }

    /// The derivation result this record replays
    pub fn to_result(&self) -> DerivationResult {
        DerivationResult {
            image_ref: self.image_ref.clone(),
            category: self.category.clone(),
            color_name: self.color_name.clone(),
            query_text: self.query_text.clone(),
            created_at: self.created_at,
        }
    }
}

/// Order records newest first; equal timestamps put the higher id first
pub fn sort_newest_first(records: &mut [HistoryRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

/// Persistent store of saved searches
///
/// Writers are serialized by the implementation; every change is pushed to
/// all receivers returned by [`HistoryStore::observe_all`].
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Insert `result` under a fresh id
    async fn save(&self, result: &DerivationResult) -> Result<HistoryRecord>;

    /// Insert `record` under its own id, replacing any record with that id
    async fn put(&self, record: HistoryRecord) -> Result<HistoryRecord>;

    /// Remove the record with `id`; unknown ids are ignored
    async fn delete(&self, id: i64) -> Result<()>;

    /// One-shot snapshot, newest first
    async fn list(&self) -> Result<Vec<HistoryRecord>>;

    /// Live sequence, newest first
    fn observe_all(&self) -> watch::Receiver<Vec<HistoryRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: i64, ms: i64) -> HistoryRecord {
        HistoryRecord {
            id,
            image_ref: None,
            category: "jeans".into(),
            color_name: "blue".into(),
            query_text: "blue jeans".into(),
            created_at: Utc.timestamp_millis_opt(ms).unwrap(),
        }
    }

    #[test]
    fn test_sort_newest_first() {
        let mut records = vec![record(1, 100), record(2, 300), record(3, 200), record(4, 300)];
        sort_newest_first(&mut records);
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_result_roundtrip_through_record() {
        let original = record(7, 1_700_000_000_000);
        let replayed = HistoryRecord::from_result(7, &original.to_result());
        assert_eq!(replayed, original);
    }
}

//! SQLite-backed history store

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::watch;
use tracing::{debug, info};

use super::{HistoryRecord, HistoryStore};
use crate::config::HistoryConfig;
use crate::image_loader::ImageRef;
use crate::{DerivationResult, QueryError, Result};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS saved_searches (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    image_ref TEXT,
    category TEXT NOT NULL,
    color_name TEXT NOT NULL,
    query_text TEXT NOT NULL,
    created_at_ms INTEGER NOT NULL
)";

const SELECT_ALL: &str = "SELECT id, image_ref, category, color_name, query_text, created_at_ms
    FROM saved_searches ORDER BY created_at_ms DESC, id DESC";

/// History store persisted in a SQLite database
///
/// A single connection behind a mutex serializes writers; statements run on
/// the blocking thread pool. Snapshots are published before the connection
/// is released, so observers see writes in commit order.
pub struct SqliteHistoryStore {
    conn: Arc<Mutex<Connection>>,
    live: Arc<watch::Sender<Vec<HistoryRecord>>>,
}

impl SqliteHistoryStore {
    /// Open (or create) the database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                QueryError::config(format!("cannot create {}", parent.display()), e)
            })?;
        }
        let conn = Connection::open(path).map_err(|e| QueryError::store("open database", e))?;
        info!(path = %path.display(), "Opened saved search database");
        Self::with_connection(conn)
    }

    /// Open the database named in the `history` configuration section
    pub fn from_config(config: &HistoryConfig) -> Result<Self> {
        Self::open(&config.database_path)
    }

    /// Database that lives only as long as the store
    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| QueryError::store("open database", e))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(SCHEMA, [])
            .map_err(|e| QueryError::store("create table", e))?;
        let rows = query_all(&conn)?;
        let (live, _) = watch::channel(rows);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            live: Arc::new(live),
        })
    }

    /// Run `f` against the connection on the blocking pool
    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| QueryError::ProcessingError {
                message: "history connection lock poisoned".into(),
            })?;
            f(&mut guard)
        })
        .await
        .map_err(|e| QueryError::ProcessingError {
            message: format!("history task failed: {e}"),
        })?
    }
}

fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

fn from_millis(ms: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or(rusqlite::Error::IntegralValueOutOfRange(5, ms))
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<HistoryRecord> {
    Ok(HistoryRecord {
        id: row.get(0)?,
        image_ref: row.get::<_, Option<String>>(1)?.map(ImageRef::new),
        category: row.get(2)?,
        color_name: row.get(3)?,
        query_text: row.get(4)?,
        created_at: from_millis(row.get(5)?)?,
    })
}

fn query_all(conn: &Connection) -> Result<Vec<HistoryRecord>> {
    let mut stmt = conn
        .prepare(SELECT_ALL)
        .map_err(|e| QueryError::store("prepare query", e))?;
    let rows = stmt
        .query_map([], read_row)
        .map_err(|e| QueryError::store("query saved searches", e))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| QueryError::store("read saved search", e))
}

fn query_one(conn: &Connection, id: i64) -> Result<Option<HistoryRecord>> {
    conn.query_row(
        "SELECT id, image_ref, category, color_name, query_text, created_at_ms
         FROM saved_searches WHERE id = ?1",
        params![id],
        read_row,
    )
    .optional()
    .map_err(|e| QueryError::store("read saved search", e))
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn save(&self, result: &DerivationResult) -> Result<HistoryRecord> {
        let result = result.clone();
        let live = Arc::clone(&self.live);
        let record = self
            .run(move |conn| {
                conn.execute(
                    "INSERT INTO saved_searches
                        (image_ref, category, color_name, query_text, created_at_ms)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        result.image_ref.as_ref().map(ImageRef::as_str),
                        result.category,
                        result.color_name,
                        result.query_text,
                        to_millis(result.created_at),
                    ],
                )
                .map_err(|e| QueryError::store("insert saved search", e))?;
                let id = conn.last_insert_rowid();
                let record = query_one(conn, id)?.ok_or_else(|| QueryError::ProcessingError {
                    message: format!("saved search {id} vanished after insert"),
                })?;
                live.send_replace(query_all(conn)?);
                Ok(record)
            })
            .await?;

        debug!(id = record.id, query = %record.query_text, "Saved search stored");
        Ok(record)
    }

    async fn put(&self, record: HistoryRecord) -> Result<HistoryRecord> {
        let live = Arc::clone(&self.live);
        let stored = self
            .run(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO saved_searches
                        (id, image_ref, category, color_name, query_text, created_at_ms)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        record.id,
                        record.image_ref.as_ref().map(ImageRef::as_str),
                        record.category,
                        record.color_name,
                        record.query_text,
                        to_millis(record.created_at),
                    ],
                )
                .map_err(|e| QueryError::store("replace saved search", e))?;
                let stored = query_one(conn, record.id)?.ok_or_else(|| {
                    QueryError::ProcessingError {
                        message: format!("saved search {} vanished after replace", record.id),
                    }
                })?;
                live.send_replace(query_all(conn)?);
                Ok(stored)
            })
            .await?;

        debug!(id = stored.id, "Saved search replaced");
        Ok(stored)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let live = Arc::clone(&self.live);
        let removed = self
            .run(move |conn| {
                let removed = conn
                    .execute("DELETE FROM saved_searches WHERE id = ?1", params![id])
                    .map_err(|e| QueryError::store("delete saved search", e))?;
                if removed > 0 {
                    live.send_replace(query_all(conn)?);
                }
                Ok(removed)
            })
            .await?;

        if removed > 0 {
            debug!(id, "Saved search deleted");
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<HistoryRecord>> {
        self.run(|conn| query_all(conn)).await
    }

    fn observe_all(&self) -> watch::Receiver<Vec<HistoryRecord>> {
        self.live.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn result(category: &str, color: &str, ms: i64) -> DerivationResult {
        DerivationResult {
            image_ref: Some(ImageRef::new(format!("{color}_{category}.jpg"))),
            category: category.into(),
            color_name: color.into(),
            query_text: format!("{color} {category}"),
            created_at: Utc.timestamp_millis_opt(ms).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_save_and_list_newest_first() {
        let store = SqliteHistoryStore::open_in_memory().unwrap();
        store.save(&result("jacket", "red", 1_000)).await.unwrap();
        store.save(&result("jeans", "blue", 3_000)).await.unwrap();
        store.save(&result("hat", "beige", 2_000)).await.unwrap();

        let queries: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.query_text)
            .collect();
        assert_eq!(queries, vec!["blue jeans", "beige hat", "red jacket"]);
    }

    #[tokio::test]
    async fn test_saved_record_matches_result() {
        let store = SqliteHistoryStore::open_in_memory().unwrap();
        let input = result("dress", "green", 1_700_000_000_123);
        let saved = store.save(&input).await.unwrap();

        assert!(saved.id > 0);
        assert_eq!(saved.to_result(), input);
    }

    #[tokio::test]
    async fn test_timestamps_stored_at_millisecond_precision() {
        let store = SqliteHistoryStore::open_in_memory().unwrap();
        let mut input = result("coat", "navy", 5_000);
        input.created_at += Duration::nanoseconds(700);

        let saved = store.save(&input).await.unwrap();
        assert_eq!(saved.created_at.timestamp_millis(), 5_000);
        assert_eq!(saved.created_at.timestamp_subsec_nanos(), 0);
    }

    #[tokio::test]
    async fn test_delete_and_live_updates() {
        let store = SqliteHistoryStore::open_in_memory().unwrap();
        let mut live = store.observe_all();
        assert!(live.borrow_and_update().is_empty());

        let saved = store.save(&result("shorts", "yellow", 10)).await.unwrap();
        assert!(live.has_changed().unwrap());
        assert_eq!(live.borrow_and_update()[0].id, saved.id);

        store.delete(saved.id).await.unwrap();
        assert!(live.borrow_and_update().is_empty());

        store.delete(saved.id).await.unwrap();
        assert!(!live.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_put_replaces_existing_id() {
        let store = SqliteHistoryStore::open_in_memory().unwrap();
        let saved = store.save(&result("jacket", "red", 10)).await.unwrap();

        let replacement = HistoryRecord::from_result(saved.id, &result("skirt", "purple", 20));
        store.put(replacement.clone()).await.unwrap();

        assert_eq!(store.list().await.unwrap(), vec![replacement]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_publish_latest_snapshot() {
        let store = Arc::new(SqliteHistoryStore::open_in_memory().unwrap());
        let live = store.observe_all();

        for round in 0..50i64 {
            let writers: Vec<_> = (0..4i64)
                .map(|n| {
                    let store = Arc::clone(&store);
                    tokio::spawn(async move {
                        store.save(&result("tee", "red", round * 10 + n)).await.unwrap()
                    })
                })
                .collect();
            for writer in writers {
                writer.await.unwrap();
            }

            let listed = store.list().await.unwrap();
            assert_eq!(listed.len() as i64, (round + 1) * 4);
            assert_eq!(*live.borrow(), listed, "round {round}");
        }
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.db");

        let saved = {
            let store = SqliteHistoryStore::open(&path).unwrap();
            store.save(&result("sneaker", "white", 42)).await.unwrap()
        };

        let reopened = SqliteHistoryStore::from_config(&HistoryConfig {
            database_path: path,
        })
        .unwrap();
        assert_eq!(reopened.observe_all().borrow().clone(), vec![saved]);
    }
}

//! Durable Store
//!
//! Wraps a SQLite connection behind a narrow load/store/delete contract.
//! All calls run on the blocking thread pool so request tasks never block
//! on disk I/O.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};

use crate::cache::CacheEntry;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS cache (
    key        TEXT PRIMARY KEY,
    body       BLOB NOT NULL,
    created_at INTEGER NOT NULL,
    ttl_secs   INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS config (
    id   INTEGER PRIMARY KEY CHECK (id = 1),
    port INTEGER NOT NULL
);
";

// == Persist Store ==
/// Handle to the SQLite mirror. Cloning shares the underlying connection.
#[derive(Clone)]
pub struct PersistStore {
    conn: Arc<Mutex<Connection>>,
}

impl PersistStore {
    // == Open ==
    /// Opens (or creates) the database at `path` and applies the schema.
    ///
    /// `:memory:` is accepted and yields a private in-memory database,
    /// which the tests rely on.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open cache database at {}", path))?;
        conn.execute_batch(SCHEMA)
            .context("failed to apply cache database schema")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let outcome = tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| anyhow!("cache database mutex poisoned"))?;
            f(&guard)
        })
        .await
        .context("cache database task panicked")?;
        outcome
    }

    // == Store Entry ==
    /// Mirrors a captured entry, replacing any prior row for the key.
    pub async fn store_entry(&self, key: String, entry: CacheEntry) -> Result<()> {
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO cache (key, body, created_at, ttl_secs)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    key,
                    entry.body.as_ref(),
                    entry.created_at as i64,
                    entry.ttl_secs as i64
                ],
            )
            .context("failed to mirror cache entry")?;
            Ok(())
        })
        .await
    }

    // == Delete Keys ==
    /// Removes the rows for the given keys, returning how many existed.
    pub async fn delete_keys(&self, keys: Vec<String>) -> Result<usize> {
        self.with_conn(move |conn| {
            let mut removed = 0;
            for key in &keys {
                removed += conn
                    .execute("DELETE FROM cache WHERE key = ?1", params![key])
                    .context("failed to delete mirrored cache entry")?;
            }
            Ok(removed)
        })
        .await
    }

    // == Clear ==
    /// Removes every mirrored entry, returning the prior row count.
    pub async fn clear(&self) -> Result<usize> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM cache", [])
                .context("failed to clear mirrored cache")
        })
        .await
    }

    // == Load Entries ==
    /// Loads every mirrored entry, expired rows included; the caller
    /// decides which rows are still live.
    pub async fn load_entries(&self) -> Result<Vec<(String, CacheEntry)>> {
        self.with_conn(|conn| {
            let mut statement = conn
                .prepare("SELECT key, body, created_at, ttl_secs FROM cache")
                .context("failed to prepare cache load query")?;

            let rows = statement
                .query_map([], |row| {
                    let key: String = row.get(0)?;
                    let body: Vec<u8> = row.get(1)?;
                    let created_at: i64 = row.get(2)?;
                    let ttl_secs: i64 = row.get(3)?;
                    Ok((
                        key,
                        CacheEntry::from_parts(
                            Bytes::from(body),
                            created_at as u64,
                            ttl_secs as u64,
                        ),
                    ))
                })
                .context("failed to load mirrored cache entries")?;

            let mut entries = Vec::new();
            for row in rows {
                entries.push(row.context("failed to read mirrored cache row")?);
            }
            Ok(entries)
        })
        .await
    }

    // == Set Port ==
    /// Records the listening port, overwriting the previous value.
    pub async fn set_port(&self, port: u16) -> Result<()> {
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO config (id, port) VALUES (1, ?1)",
                params![port as i64],
            )
            .context("failed to record listening port")?;
            Ok(())
        })
        .await
    }

    // == Get Port ==
    /// Returns the last recorded listening port, if any.
    pub async fn get_port(&self) -> Result<Option<u16>> {
        self.with_conn(|conn| {
            let port: Option<i64> = conn
                .query_row("SELECT port FROM config WHERE id = 1", [], |row| {
                    row.get(0)
                })
                .optional()
                .context("failed to read recorded listening port")?;
            Ok(port.map(|value| value as u16))
        })
        .await
    }
}

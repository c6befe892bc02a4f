//! `SQLite` corpus source over the `memory_entries` table.

use std::collections::BTreeMap;

use chrono::Utc;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::memory::core::config::StorageConfig;
use crate::memory::core::entry::{EntryId, MemoryEntry};
use crate::memory::core::entry_type::EntryType;
use crate::memory::core::errors::{MemoryError, MemoryResult};
use crate::memory::storage::codec::decode_embedding;
use crate::memory::storage::corpus_store::{CorpusRows, CorpusSource, StoreFuture};

const ACTIVE_FILTER: &str = "is_active = 1
    AND (expires_at IS NULL OR datetime(expires_at) > datetime(?1))
    AND (?2 IS NULL OR type = ?2)";

const ENTRY_SOURCES: &str = "'user', 'inferred', 'session', 'external', 'system'";

type EntryRow = (i64, String, String, i64);
type CorpusRow = (i64, String, String, i64, Option<Vec<u8>>);

/// Read-only corpus source backed by `SQLite`.
pub struct SqliteCorpusStore {
    conn: Connection,
    table: String,
}

impl SqliteCorpusStore {
    /// Open the database, creating the entry table if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or initialized.
    pub async fn open(config: &StorageConfig) -> MemoryResult<Self> {
        if let Some(parent) = config
            .sqlite_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&config.sqlite_path).await?;
        let table = config.entry_table.clone();
        let table_name = table.clone();
        let entry_types = EntryType::ALL
            .iter()
            .map(|entry_type| format!("'{}'", entry_type.as_str()))
            .collect::<Vec<_>>()
            .join(", ");

        conn.call(move |conn| {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {table_name} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    type TEXT NOT NULL CHECK(type IN ({entry_types})),
                    content TEXT NOT NULL,
                    content_hash TEXT UNIQUE,
                    source TEXT DEFAULT 'session' CHECK(source IN ({ENTRY_SOURCES})),
                    confidence REAL DEFAULT 1.0,
                    importance INTEGER DEFAULT 5 CHECK(importance BETWEEN 1 AND 10),
                    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                    last_accessed DATETIME,
                    access_count INTEGER DEFAULT 0,
                    embedding BLOB,
                    embedding_model TEXT,
                    tags TEXT,
                    context TEXT,
                    expires_at DATETIME,
                    is_active INTEGER DEFAULT 1
                );
                CREATE INDEX IF NOT EXISTS idx_{table_name}_active_type
                    ON {table_name}(is_active, type);"
            ))?;
            Ok(())
        })
        .await?;

        debug!(path = %config.sqlite_path.display(), table = %table, "opened sqlite corpus");
        Ok(Self { conn, table })
    }
}

fn now_param() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn entry_from_row((id, raw_type, content, importance): EntryRow) -> MemoryResult<MemoryEntry> {
    let entry_type: EntryType = raw_type
        .parse()
        .map_err(|err| MemoryError::InvalidEntry(format!("entry {id}: {err}")))?;
    let importance = u8::try_from(importance).map_err(|_| {
        MemoryError::InvalidEntry(format!("entry {id}: importance {importance} out of range"))
    })?;
    MemoryEntry::new(id, entry_type, content, importance)
}

fn vector_from_blob(id: i64, blob: &[u8]) -> MemoryResult<(EntryId, Vec<f32>)> {
    let vector = decode_embedding(blob)
        .map_err(|err| MemoryError::InvalidEntry(format!("entry {id}: {err}")))?;
    Ok((EntryId(id), vector))
}

impl CorpusSource for SqliteCorpusStore {
    fn fetch_active_corpus(
        &self,
        entry_type: Option<EntryType>,
    ) -> StoreFuture<'_, MemoryResult<Vec<MemoryEntry>>> {
        Box::pin(async move {
            let table = self.table.clone();
            let type_param = entry_type.map(|t| t.as_str().to_string());
            let now = now_param();

            let rows: Vec<EntryRow> = self
                .conn
                .call(move |conn| {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT id, type, content, importance FROM {table}
                         WHERE {ACTIVE_FILTER}
                         ORDER BY importance DESC, id ASC"
                    ))?;
                    let rows = stmt
                        .query_map(rusqlite::params![now, type_param], |row| {
                            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                        })?
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(rows)
                })
                .await?;

            rows.into_iter().map(entry_from_row).collect()
        })
    }

    fn fetch_vectors(
        &self,
        entry_type: Option<EntryType>,
    ) -> StoreFuture<'_, MemoryResult<BTreeMap<EntryId, Vec<f32>>>> {
        Box::pin(async move {
            let table = self.table.clone();
            let type_param = entry_type.map(|t| t.as_str().to_string());
            let now = now_param();

            let rows: Vec<(i64, Vec<u8>)> = self
                .conn
                .call(move |conn| {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT id, embedding FROM {table}
                         WHERE embedding IS NOT NULL AND {ACTIVE_FILTER}"
                    ))?;
                    let rows = stmt
                        .query_map(rusqlite::params![now, type_param], |row| {
                            Ok((row.get(0)?, row.get(1)?))
                        })?
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(rows)
                })
                .await?;

            rows.into_iter()
                .map(|(id, blob)| vector_from_blob(id, &blob))
                .collect()
        })
    }

    fn fetch_corpus(&self, entry_type: Option<EntryType>) -> StoreFuture<'_, MemoryResult<CorpusRows>> {
        Box::pin(async move {
            let table = self.table.clone();
            let type_param = entry_type.map(|t| t.as_str().to_string());
            let now = now_param();

            // One statement, so entries and blobs come from the same read.
            let rows: Vec<CorpusRow> = self
                .conn
                .call(move |conn| {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT id, type, content, importance, embedding FROM {table}
                         WHERE {ACTIVE_FILTER}
                         ORDER BY importance DESC, id ASC"
                    ))?;
                    let rows = stmt
                        .query_map(rusqlite::params![now, type_param], |row| {
                            Ok((
                                row.get(0)?,
                                row.get(1)?,
                                row.get(2)?,
                                row.get(3)?,
                                row.get(4)?,
                            ))
                        })?
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(rows)
                })
                .await?;

            let mut entries = Vec::with_capacity(rows.len());
            let mut vectors = BTreeMap::new();
            for (id, raw_type, content, importance, blob) in rows {
                if let Some(blob) = blob {
                    let (entry_id, vector) = vector_from_blob(id, &blob)?;
                    vectors.insert(entry_id, vector);
                }
                entries.push(entry_from_row((id, raw_type, content, importance))?);
            }
            Ok((entries, vectors))
        })
    }
}

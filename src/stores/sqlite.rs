//! SQLite-backed vector index using the sqlite-vec extension.
//!
//! Each collection is a pair of tables: a plain chunk table holding text
//! and metadata, and a `vec0` virtual table of the same name suffixed
//! `_embeddings` holding the vectors, joined by id.

use std::mem::transmute;
use std::os::raw::c_char;
use std::path::Path;
use std::sync::OnceLock;

use async_trait::async_trait;
use tokio_rusqlite::{Connection, OptionalExtension, ffi};

use super::{ChunkRecord, ChunkStore, StoredChunk};
use crate::types::IngestError;

/// Durable vector store handle. Open once at startup and share; data
/// survives process restarts.
#[derive(Clone)]
pub struct SqliteVectorStore {
    conn: Connection,
}

impl SqliteVectorStore {
    /// Opens (or creates) the database at `path` and verifies the
    /// sqlite-vec extension answers.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, IngestError> {
        register_sqlite_vec()?;
        let conn = Connection::open(path)
            .await
            .map_err(|err| IngestError::Storage(err.to_string()))?;
        conn.call(|conn| {
            let version = conn.query_row("select vec_version()", [], |row| row.get::<_, String>(0));
            match version {
                Ok(_) => Ok(()),
                Err(err) => Err(err),
            }
        })
        .await
        .map_err(storage_err)?;
        Ok(Self { conn })
    }

    /// In-memory store for tests and throwaway runs.
    pub async fn open_in_memory() -> Result<Self, IngestError> {
        register_sqlite_vec()?;
        let conn = Connection::open_in_memory()
            .await
            .map_err(|err| IngestError::Storage(err.to_string()))?;
        Ok(Self { conn })
    }

    /// Opens the named collection, creating its tables on first use and
    /// reusing them thereafter.
    ///
    /// `dimensions` fixes the vector width of the collection's `vec0`
    /// table and must match the deployed embedding provider.
    pub async fn collection(
        &self,
        name: &str,
        dimensions: usize,
    ) -> Result<ChunkCollection, IngestError> {
        let table = validate_collection_name(name)?;
        let vec_table = format!("{table}_embeddings");
        let schema = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                source_file TEXT NOT NULL,
                chunk_index INTEGER NOT NULL,
                file_path TEXT NOT NULL,
                content TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_{table}_source_file ON {table}(source_file);
            CREATE VIRTUAL TABLE IF NOT EXISTS {vec_table} USING vec0(
                id TEXT PRIMARY KEY,
                embedding FLOAT[{dimensions}]
            );"
        );
        self.conn
            .call(move |conn| {
                conn.execute_batch(&schema)?;
                Ok(())
            })
            .await
            .map_err(storage_err)?;
        Ok(ChunkCollection {
            conn: self.conn.clone(),
            table,
            vec_table,
            dimensions,
        })
    }
}

/// Handle to one named partition of the store.
#[derive(Clone)]
pub struct ChunkCollection {
    conn: Connection,
    table: String,
    vec_table: String,
    dimensions: usize,
}

impl ChunkCollection {
    /// Vector width this collection was created with.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[async_trait]
impl ChunkStore for ChunkCollection {
    async fn upsert_chunks(&self, records: Vec<ChunkRecord>) -> Result<(), IngestError> {
        if records.is_empty() {
            return Ok(());
        }
        for record in &records {
            if record.embedding.len() != self.dimensions {
                return Err(IngestError::Storage(format!(
                    "embedding for '{}' has {} dimensions, collection expects {}",
                    record.id,
                    record.embedding.len(),
                    self.dimensions
                )));
            }
        }

        // Serialize vectors up front; sqlite-vec accepts JSON text.
        let rows: Vec<(ChunkRecord, String)> = records
            .into_iter()
            .map(|record| {
                let json = serde_json::to_string(&record.embedding)
                    .map_err(|err| IngestError::Storage(err.to_string()))?;
                Ok((record, json))
            })
            .collect::<Result<_, IngestError>>()?;

        let table = self.table.clone();
        let vec_table = self.vec_table.clone();
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut upsert_chunk = tx.prepare(&format!(
                        "INSERT OR REPLACE INTO {table}
                         (id, source_file, chunk_index, file_path, content)
                         VALUES (?1, ?2, ?3, ?4, ?5)"
                    ))?;
                    // Delete-then-insert keeps the vec0 side in step with
                    // the chunk table without relying on vtab conflict
                    // handling.
                    let mut delete_vector =
                        tx.prepare(&format!("DELETE FROM {vec_table} WHERE id = ?1"))?;
                    let mut insert_vector = tx.prepare(&format!(
                        "INSERT INTO {vec_table} (id, embedding) VALUES (?1, ?2)"
                    ))?;
                    for (record, embedding_json) in rows {
                        upsert_chunk.execute((
                            &record.id,
                            &record.source_file,
                            record.chunk_index as i64,
                            &record.file_path,
                            &record.content,
                        ))?;
                        delete_vector.execute([&record.id])?;
                        insert_vector.execute((&record.id, &embedding_json))?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    async fn get_chunk(&self, id: &str) -> Result<Option<StoredChunk>, IngestError> {
        let id = id.to_string();
        let table = self.table.clone();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT id, source_file, chunk_index, file_path, content
                     FROM {table} WHERE id = ?1"
                ))?;
                let row = stmt
                    .query_row([&id], |row| {
                        Ok(StoredChunk {
                            id: row.get(0)?,
                            source_file: row.get(1)?,
                            chunk_index: row.get::<_, i64>(2)? as usize,
                            file_path: row.get(3)?,
                            content: row.get(4)?,
                        })
                    })
                    .optional()?;
                Ok(row)
            })
            .await
            .map_err(storage_err)
    }

    async fn count(&self) -> Result<usize, IngestError> {
        let table = self.table.clone();
        self.conn
            .call(move |conn| {
                let count: i64 =
                    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                        row.get(0)
                    })?;
                Ok(count as usize)
            })
            .await
            .map_err(storage_err)
    }

    async fn count_for_source(&self, source_file: &str) -> Result<usize, IngestError> {
        let source_file = source_file.to_string();
        let table = self.table.clone();
        self.conn
            .call(move |conn| {
                let count: i64 = conn.query_row(
                    &format!("SELECT COUNT(*) FROM {table} WHERE source_file = ?1"),
                    [&source_file],
                    |row| row.get(0),
                )?;
                Ok(count as usize)
            })
            .await
            .map_err(storage_err)
    }
}

/// Collection names are spliced into SQL identifiers; restrict them to a
/// safe alphabet instead of quoting.
fn validate_collection_name(name: &str) -> Result<String, IngestError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.chars().next().is_some_and(|c| c.is_ascii_digit());
    if valid {
        Ok(name.to_string())
    } else {
        Err(IngestError::InvalidInput(format!(
            "collection name '{name}' must match [A-Za-z_][A-Za-z0-9_]*"
        )))
    }
}

fn storage_err(err: tokio_rusqlite::Error) -> IngestError {
    IngestError::Storage(err.to_string())
}

fn register_sqlite_vec() -> Result<(), IngestError> {
    static INIT: OnceLock<Result<(), String>> = OnceLock::new();

    INIT.get_or_init(|| unsafe {
        type SqliteExtensionInit = unsafe extern "C" fn(
            *mut ffi::sqlite3,
            *mut *mut c_char,
            *const ffi::sqlite3_api_routines,
        ) -> i32;

        let init: unsafe extern "C" fn() = sqlite_vec::sqlite3_vec_init;
        let init_fn: SqliteExtensionInit =
            transmute::<unsafe extern "C" fn(), SqliteExtensionInit>(init);
        let rc = ffi::sqlite3_auto_extension(Some(init_fn));
        if rc != ffi::SQLITE_OK {
            Err(format!("failed to register sqlite-vec extension (code {rc})"))
        } else {
            Ok(())
        }
    })
    .clone()
    .map_err(IngestError::Storage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(source: &str, index: usize, content: &str, dims: usize) -> ChunkRecord {
        ChunkRecord {
            id: format!("{source}_chunk_{index}"),
            source_file: source.to_string(),
            chunk_index: index,
            file_path: format!("/docs/{source}"),
            content: content.to_string(),
            embedding: vec![0.5; dims],
        }
    }

    #[tokio::test]
    async fn upsert_and_read_back() {
        let dir = tempdir().unwrap();
        let store = SqliteVectorStore::open(dir.path().join("index.sqlite"))
            .await
            .unwrap();
        let collection = store.collection("rag_collection", 4).await.unwrap();

        collection
            .upsert_chunks(vec![
                record("a.txt", 0, "first", 4),
                record("a.txt", 1, "second", 4),
            ])
            .await
            .unwrap();

        assert_eq!(collection.count().await.unwrap(), 2);
        let stored = collection.get_chunk("a.txt_chunk_0").await.unwrap().unwrap();
        assert_eq!(stored.content, "first");
        assert_eq!(stored.source_file, "a.txt");
        assert_eq!(stored.chunk_index, 0);
        assert!(collection.get_chunk("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_existing_ids() {
        let store = SqliteVectorStore::open_in_memory().await.unwrap();
        let collection = store.collection("rag_collection", 4).await.unwrap();

        collection
            .upsert_chunks(vec![record("a.txt", 0, "original", 4)])
            .await
            .unwrap();
        collection
            .upsert_chunks(vec![record("a.txt", 0, "rewritten", 4)])
            .await
            .unwrap();

        assert_eq!(collection.count().await.unwrap(), 1);
        let stored = collection.get_chunk("a.txt_chunk_0").await.unwrap().unwrap();
        assert_eq!(stored.content, "rewritten");
    }

    #[tokio::test]
    async fn count_for_source_separates_files() {
        let store = SqliteVectorStore::open_in_memory().await.unwrap();
        let collection = store.collection("rag_collection", 4).await.unwrap();

        collection
            .upsert_chunks(vec![
                record("a.txt", 0, "a0", 4),
                record("a.txt", 1, "a1", 4),
                record("b.txt", 0, "b0", 4),
            ])
            .await
            .unwrap();

        assert_eq!(collection.count_for_source("a.txt").await.unwrap(), 2);
        assert_eq!(collection.count_for_source("b.txt").await.unwrap(), 1);
        assert_eq!(collection.count_for_source("c.txt").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn dimension_mismatch_is_rejected() {
        let store = SqliteVectorStore::open_in_memory().await.unwrap();
        let collection = store.collection("rag_collection", 4).await.unwrap();

        let result = collection
            .upsert_chunks(vec![record("a.txt", 0, "short vector", 3)])
            .await;
        assert!(matches!(result, Err(IngestError::Storage(_))));
        assert_eq!(collection.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_upsert_is_a_no_op() {
        let store = SqliteVectorStore::open_in_memory().await.unwrap();
        let collection = store.collection("rag_collection", 4).await.unwrap();
        collection.upsert_chunks(Vec::new()).await.unwrap();
        assert_eq!(collection.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("durable.sqlite");

        {
            let store = SqliteVectorStore::open(&path).await.unwrap();
            let collection = store.collection("rag_collection", 4).await.unwrap();
            collection
                .upsert_chunks(vec![record("a.txt", 0, "persisted", 4)])
                .await
                .unwrap();
        }

        let store = SqliteVectorStore::open(&path).await.unwrap();
        let collection = store.collection("rag_collection", 4).await.unwrap();
        assert_eq!(collection.count().await.unwrap(), 1);
        let stored = collection.get_chunk("a.txt_chunk_0").await.unwrap().unwrap();
        assert_eq!(stored.content, "persisted");
    }

    #[test]
    fn collection_names_are_validated() {
        assert!(validate_collection_name("rag_collection").is_ok());
        assert!(validate_collection_name("_hidden").is_ok());
        assert!(validate_collection_name("").is_err());
        assert!(validate_collection_name("1starts_with_digit").is_err());
        assert!(validate_collection_name("bad-name").is_err());
        assert!(validate_collection_name("drop table;").is_err());
    }
}

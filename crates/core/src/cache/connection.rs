//! Opening the SQLite document store.

use std::path::Path;

use tokio_rusqlite::{Connection, rusqlite};

use super::migrations;
use crate::Error;

/// WAL keeps readers unblocked while a fetch writes through a page of docs.
const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
                       PRAGMA synchronous=NORMAL;
                       PRAGMA busy_timeout=5000;
                       PRAGMA temp_store=MEMORY;";

/// SQLite-backed [`LocalStore`](crate::store::LocalStore).
///
/// Statements run on tokio-rusqlite's background thread. Clones share the
/// connection, so several controllers can use one file.
#[derive(Clone, Debug)]
pub struct CacheDb {
    pub(crate) conn: Connection,
}

impl CacheDb {
    /// Open (or create) the store at `path`, creating missing parent
    /// directories and bringing the schema up to date.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::InvalidInput(format!("cannot create cache directory {}: {e}", parent.display()))
            })?;
        }

        let conn = Connection::open(path).await.map_err(Error::from)?;
        let db = Self::prepare(conn).await?;
        tracing::debug!("opened cache database at {}", path.display());
        Ok(db)
    }

    /// Private in-memory store; contents vanish with the last clone.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory().await.map_err(Error::from)?;
        Self::prepare(conn).await
    }

    /// Schema version the store is running.
    pub async fn schema_version(&self) -> Result<i64, Error> {
        migrations::schema_version(&self.conn).await
    }

    async fn prepare(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| -> Result<(), rusqlite::Error> { conn.execute_batch(PRAGMAS) })
            .await
            .map_err(Error::from)?;

        let version = migrations::run(&conn).await?;
        tracing::debug!("cache schema at version {}", version);

        Ok(Self { conn })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory_is_migrated() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.schema_version().await.unwrap() >= 2);
    }

    #[tokio::test]
    async fn test_clones_share_connection() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let other = db.clone();

        other
            .conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO documents (cache_key, doc_id, doc_json, updated_at) VALUES ('k', '1', '{}', 'now')",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let count: i64 = db
            .conn
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}

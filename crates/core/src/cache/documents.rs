//! [`LocalStore`] implementation on top of the cache database.
//!
//! Documents are stored as JSON text. Set order follows the insertion
//! sequence; replacing a document keeps its original position.

use async_trait::async_trait;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::connection::CacheDb;
use crate::store::{LocalStore, SetScope, require_id};
use crate::{DocId, Document, Error};

fn decode(json: &str) -> Result<Document, Error> {
    serde_json::from_str(json).map_err(Error::from)
}

#[async_trait]
impl LocalStore for CacheDb {
    async fn get_primary(&self, key: &str, id: &DocId) -> Result<Option<Document>, Error> {
        let key = key.to_string();
        let id = id.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Document>, Error> {
                let result = conn.query_row(
                    "SELECT doc_json FROM documents WHERE cache_key = ?1 AND doc_id = ?2",
                    params![key, id],
                    |row| row.get::<_, String>(0),
                );

                match result {
                    Ok(json) => decode(&json).map(Some),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn set_primary(&self, key: &str, id: &DocId, doc: &Document) -> Result<(), Error> {
        let key = key.to_string();
        let id = id.to_string();
        let json = serde_json::to_string(doc)?;
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO documents (cache_key, doc_id, doc_json, updated_at)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(cache_key, doc_id) DO UPDATE SET
                        doc_json = excluded.doc_json,
                        updated_at = excluded.updated_at",
                    params![key, id, json, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn clear_primary(&self, key: &str, id: &DocId) -> Result<(), Error> {
        let key = key.to_string();
        let id = id.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute("DELETE FROM documents WHERE cache_key = ?1 AND doc_id = ?2", params![key, id])?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn get_scoped(&self, key: &str, scope: SetScope<'_>) -> Result<Option<Vec<Document>>, Error> {
        let key = key.to_string();
        let (index, secondary) = scope.parts();
        let (index, secondary) = (index.to_string(), secondary.to_string());
        self.conn
            .call(move |conn| -> Result<Option<Vec<Document>>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT doc_json FROM set_entries
                    WHERE cache_key = ?1 AND index_name = ?2 AND secondary = ?3
                    ORDER BY seq ASC",
                )?;

                let rows = stmt.query_map(params![key, index, secondary], |row| row.get::<_, String>(0))?;

                let mut docs = Vec::new();
                for json in rows {
                    docs.push(decode(&json?)?);
                }

                Ok(if docs.is_empty() { None } else { Some(docs) })
            })
            .await
            .map_err(Error::from)
    }

    async fn add_scoped(&self, key: &str, scope: SetScope<'_>, doc: &Document) -> Result<(), Error> {
        let id = require_id(doc)?.to_string();
        let key = key.to_string();
        let (index, secondary) = scope.parts();
        let (index, secondary) = (index.to_string(), secondary.to_string());
        let json = serde_json::to_string(doc)?;
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO set_entries (cache_key, index_name, secondary, doc_id, doc_json)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    ON CONFLICT(cache_key, index_name, secondary, doc_id) DO UPDATE SET
                        doc_json = excluded.doc_json",
                    params![key, index, secondary, id, json],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn clear_scoped(&self, key: &str, scope: SetScope<'_>, id: &DocId) -> Result<(), Error> {
        let key = key.to_string();
        let id = id.to_string();
        let (index, secondary) = scope.parts();
        let (index, secondary) = (index.to_string(), secondary.to_string());
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "DELETE FROM set_entries
                    WHERE cache_key = ?1 AND index_name = ?2 AND secondary = ?3 AND doc_id = ?4",
                    params![key, index, secondary, id],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn clear(&self, key: &str) -> Result<(), Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                let docs = tx.execute("DELETE FROM documents WHERE cache_key = ?1", params![key])?;
                let entries = tx.execute("DELETE FROM set_entries WHERE cache_key = ?1", params![key])?;
                tx.commit()?;
                tracing::debug!("cleared {} documents and {} set entries for {}", docs, entries, key);
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

//! Schema migrations for the document store.
//!
//! Applied versions are recorded in `_migrations`; anything newer than the
//! recorded maximum is applied in order inside one transaction, so a failed
//! upgrade leaves the previous schema in place.

use tokio_rusqlite::{Connection, params, rusqlite};

use super::Error;

/// Ordered `(version, sql)` pairs. Versions only ever grow.
const MIGRATIONS: &[(i64, &str)] = &[
    (1, include_str!("../../migrations/001_documents.sql")),
    (2, include_str!("../../migrations/002_set_entries.sql")),
];

fn current_version(conn: &rusqlite::Connection) -> Result<i64, rusqlite::Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))
}

/// Apply pending migrations and return the resulting schema version.
pub async fn run(conn: &Connection) -> Result<i64, Error> {
    conn.call(|conn| -> Result<i64, Error> {
        let current = current_version(conn)?;
        let pending: Vec<_> = MIGRATIONS.iter().filter(|(version, _)| *version > current).collect();
        if pending.is_empty() {
            return Ok(current);
        }

        let tx = conn.transaction()?;
        let applied_at = chrono::Utc::now().to_rfc3339();
        for (version, sql) in &pending {
            tracing::debug!("applying cache migration {}", version);
            tx.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("version {version}: {e}")))?;
            tx.execute("INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)", params![version, applied_at])?;
        }
        tx.commit()?;

        Ok(pending.last().map_or(current, |(version, _)| *version))
    })
    .await
    .map_err(Error::from)
}

/// Highest migration version recorded in the database.
pub async fn schema_version(conn: &Connection) -> Result<i64, Error> {
    conn.call(|conn| -> Result<i64, Error> { Ok(current_version(conn)?) })
        .await
        .map_err(Error::from)
}

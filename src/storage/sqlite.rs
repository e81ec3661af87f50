//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the JobStore trait.

use crate::record::HarvestedRecord;
use crate::storage::schema::{initialize_schema, UPSERT_JOB_SQL};
use crate::storage::timestamp;
use crate::storage::traits::{JobStore, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database at `path` and ensures the schema exists
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Overwrites a row's creation timestamp (for testing)
    #[cfg(test)]
    pub(crate) fn set_created_at(&self, url: &str, created_at: DateTime<Utc>) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE jobs SET created_at = ?1 WHERE url = ?2",
            params![timestamp(created_at), url],
        )?;
        Ok(())
    }
}

fn execute_upsert(
    stmt: &mut rusqlite::CachedStatement<'_>,
    record: &HarvestedRecord,
    created_at: &str,
) -> StorageResult<()> {
    let fields = &record.fields;
    stmt.execute(params![
        record.canonical_url,
        record.title,
        record.source_host,
        fields.detail,
        fields.price,
        fields.period,
        fields.skills,
        fields.other,
        fields.reserved,
        created_at,
    ])
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StorageError::ConstraintViolation(format!(
                "{}: {}",
                record.canonical_url,
                message.unwrap_or_else(|| failure.to_string())
            ))
        }
        other => StorageError::Sqlite(other),
    })?;
    Ok(())
}

impl JobStore for SqliteStorage {
    fn upsert_jobs(&mut self, records: &[HarvestedRecord]) -> StorageResult<usize> {
        let created_at = timestamp(Utc::now());
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(UPSERT_JOB_SQL)?;
            for record in records {
                execute_upsert(&mut stmt, record, &created_at)?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    fn upsert_job(&mut self, record: &HarvestedRecord) -> StorageResult<()> {
        let created_at = timestamp(Utc::now());
        let mut stmt = self.conn.prepare_cached(UPSERT_JOB_SQL)?;
        execute_upsert(&mut stmt, record, &created_at)
    }

    fn count_jobs(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM jobs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_by_source(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT source_host, COUNT(*) AS n FROM jobs GROUP BY source_host ORDER BY n DESC, source_host",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
        })?;

        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }

    fn created_range(&self) -> StorageResult<Option<(String, String)>> {
        let (oldest, newest): (Option<String>, Option<String>) = self.conn.query_row(
            "SELECT MIN(created_at), MAX(created_at) FROM jobs",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(oldest.zip(newest))
    }

    fn delete_older_than(&mut self, cutoff: DateTime<Utc>) -> StorageResult<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM jobs WHERE created_at < ?1",
            params![timestamp(cutoff)],
        )?;
        Ok(deleted)
    }
}

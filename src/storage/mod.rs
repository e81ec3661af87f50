//! Storage module for persisting harvested postings
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Bulk and single-row upserts keyed by canonical URL
//! - Chunked persistence with per-row fallback
//! - Retention purges and store statistics

mod persister;
mod retention;
mod schema;
mod sqlite;
mod traits;

pub use persister::{persist, DEFAULT_CHUNK_SIZE};
pub use retention::{purge_expired, PurgeReport};
pub use sqlite::SqliteStorage;
pub use traits::{JobStore, StorageError, StorageResult};

use chrono::{DateTime, SecondsFormat, Utc};
use std::path::Path;

/// Opens or creates the store at `path`
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Formats a stored timestamp: RFC 3339, UTC, whole seconds
///
/// The fixed width keeps lexical and chronological order identical.
pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

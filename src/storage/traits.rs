//! Storage traits and error types
//!
//! This module defines the trait interface for job stores and the
//! associated error types.

use crate::record::HarvestedRecord;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for job store backends
///
/// Writes are keyed by the record's canonical URL: an existing row is
/// updated in place, keeping its creation timestamp.
pub trait JobStore {
    /// Upserts all records atomically: either every row is written or none is
    ///
    /// Returns the number of rows written.
    fn upsert_jobs(&mut self, records: &[HarvestedRecord]) -> StorageResult<usize>;

    /// Upserts a single record
    fn upsert_job(&mut self, record: &HarvestedRecord) -> StorageResult<()>;

    /// Number of stored postings
    fn count_jobs(&self) -> StorageResult<u64>;

    /// Number of stored postings per source host, largest first
    fn count_by_source(&self) -> StorageResult<Vec<(String, u64)>>;

    /// Oldest and newest creation timestamps, if any rows exist
    fn created_range(&self) -> StorageResult<Option<(String, String)>>;

    /// Deletes postings created before `cutoff`, returning how many were removed
    fn delete_older_than(&mut self, cutoff: DateTime<Utc>) -> StorageResult<usize>;
}

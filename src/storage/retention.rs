//! Retention purge of stored postings

use crate::storage::{timestamp, JobStore, StorageResult};
use chrono::{Duration, Utc};
use serde::Serialize;

/// Outcome of a retention purge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    /// Rows removed
    pub deleted: usize,
    /// Rows left in the store
    pub remaining: u64,
    /// Rows created before this instant (RFC 3339, UTC) were removed
    pub cutoff: String,
}

/// Deletes postings created more than `days_to_keep` days ago
pub fn purge_expired<S>(store: &mut S, days_to_keep: u32) -> StorageResult<PurgeReport>
where
    S: JobStore + ?Sized,
{
    let cutoff = Utc::now() - Duration::days(i64::from(days_to_keep));
    let deleted = store.delete_older_than(cutoff)?;
    let remaining = store.count_jobs()?;

    tracing::info!(
        "Purged {} postings created before {} ({} remaining)",
        deleted,
        timestamp(cutoff),
        remaining
    );

    Ok(PurgeReport {
        deleted,
        remaining,
        cutoff: timestamp(cutoff),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{HarvestedRecord, StructuredFields};
    use crate::storage::SqliteStorage;

    fn record(url: &str) -> HarvestedRecord {
        HarvestedRecord {
            canonical_url: url.to_string(),
            title: "title".to_string(),
            source_host: "a.example".to_string(),
            fields: StructuredFields::default(),
        }
    }

    #[test]
    fn test_purge_removes_only_expired_rows() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .upsert_jobs(&[
                record("https://a.example/1"),
                record("https://a.example/2"),
                record("https://a.example/3"),
            ])
            .unwrap();
        storage
            .set_created_at("https://a.example/1", Utc::now() - Duration::days(6))
            .unwrap();
        storage
            .set_created_at("https://a.example/2", Utc::now() - Duration::days(4))
            .unwrap();

        let report = purge_expired(&mut storage, 5).unwrap();

        assert_eq!(report.deleted, 1);
        assert_eq!(report.remaining, 2);
        assert!(report.cutoff.ends_with('Z'));
    }

    #[test]
    fn test_purge_on_empty_store() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let report = purge_expired(&mut storage, 5).unwrap();
        assert_eq!(report.deleted, 0);
        assert_eq!(report.remaining, 0);
    }
}

//! Chunked batch persistence with per-row fallback

use crate::record::HarvestedRecord;
use crate::storage::JobStore;

/// Default rows per bulk upsert
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Upserts `records` in chunks and returns the number of rows confirmed stored
///
/// Each chunk is written with one all-or-nothing bulk upsert. When that
/// fails, the chunk's rows are upserted one by one; rows that still fail are
/// logged and skipped. This never fails as a whole.
pub fn persist<S>(store: &mut S, records: &[HarvestedRecord], chunk_size: usize) -> usize
where
    S: JobStore + ?Sized,
{
    let chunk_size = chunk_size.max(1);
    let mut stored = 0;

    for (index, chunk) in records.chunks(chunk_size).enumerate() {
        match store.upsert_jobs(chunk) {
            Ok(written) => {
                tracing::debug!("Chunk {} stored {} rows", index + 1, written);
                stored += written;
            }
            Err(e) => {
                tracing::warn!(
                    "Bulk upsert of chunk {} ({} rows) failed, falling back to single rows: {}",
                    index + 1,
                    chunk.len(),
                    e
                );
                stored += persist_rows(store, chunk);
            }
        }
    }

    tracing::info!("Persisted {}/{} records", stored, records.len());
    stored
}

fn persist_rows<S>(store: &mut S, rows: &[HarvestedRecord]) -> usize
where
    S: JobStore + ?Sized,
{
    let mut stored = 0;
    for record in rows {
        match store.upsert_job(record) {
            Ok(()) => stored += 1,
            Err(e) => tracing::warn!("Skipping {}: {}", record.canonical_url, e),
        }
    }
    stored
}

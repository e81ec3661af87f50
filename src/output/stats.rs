//! Statistics over the job store
//!
//! This module provides functionality for extracting and displaying
//! statistics about stored postings.

use crate::storage::JobStore;
use crate::Result;
use std::fmt;

/// Store statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatistics {
    /// Total number of stored postings
    pub total_jobs: u64,

    /// Postings per source host, largest first
    pub jobs_by_source: Vec<(String, u64)>,

    /// Creation timestamp of the oldest posting
    pub oldest: Option<String>,

    /// Creation timestamp of the newest posting
    pub newest: Option<String>,
}

/// Loads statistics from a store
pub fn load_statistics(store: &dyn JobStore) -> Result<JobStatistics> {
    let total_jobs = store.count_jobs()?;
    let jobs_by_source = store.count_by_source()?;
    let (oldest, newest) = match store.created_range()? {
        Some((oldest, newest)) => (Some(oldest), Some(newest)),
        None => (None, None),
    };

    Ok(JobStatistics {
        total_jobs,
        jobs_by_source,
        oldest,
        newest,
    })
}

impl fmt::Display for JobStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Job Store Statistics ===\n")?;
        writeln!(f, "Total postings: {}", self.total_jobs)?;

        if let (Some(oldest), Some(newest)) = (&self.oldest, &self.newest) {
            writeln!(f, "Created between {} and {}", oldest, newest)?;
        }

        if !self.jobs_by_source.is_empty() {
            writeln!(f, "\nPostings by Source:")?;
            for (host, count) in &self.jobs_by_source {
                let percentage = if self.total_jobs > 0 {
                    (*count as f64 / self.total_jobs as f64) * 100.0
                } else {
                    0.0
                };
                writeln!(f, "  {}: {} ({:.1}%)", host, count, percentage)?;
            }
        }

        Ok(())
    }
}

/// Renders statistics as a human-readable report
pub fn format_statistics(stats: &JobStatistics) -> String {
    stats.to_string()
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &JobStatistics) {
    print!("{}", format_statistics(stats));
}

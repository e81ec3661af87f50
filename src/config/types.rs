use crate::sites::SiteConfig;
use serde::Deserialize;

/// Main configuration structure for job-harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub harvester: HarvesterConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
    /// Site overrides; the built-in registry is used when empty
    #[serde(default, rename = "site")]
    pub sites: Vec<SiteConfig>,
}

/// Harvest pass tuning knobs
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HarvesterConfig {
    /// Maximum number of detail pages fetched at the same time
    pub detail_concurrency: usize,

    /// Maximum number of postings harvested across all sites in one pass
    pub max_total_items: usize,

    /// Per-attempt timeout for listing pages (milliseconds)
    pub list_timeout_ms: u64,

    /// Per-attempt timeout for detail pages (milliseconds)
    pub detail_timeout_ms: u64,

    /// Retries after the first failed attempt
    pub fetch_retries: u32,

    /// Base delay for exponential backoff (milliseconds)
    pub backoff_base_ms: u64,

    /// Rows per bulk upsert
    pub chunk_size: usize,

    /// Politeness delay after each listing page (milliseconds)
    pub page_delay_ms: u64,
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            detail_concurrency: 1,
            max_total_items: 15,
            list_timeout_ms: 10_000,
            detail_timeout_ms: 6_000,
            fetch_retries: 2,
            backoff_base_ms: 500,
            chunk_size: 100,
            page_delay_ms: 300,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Retention window for stored postings
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    #[serde(rename = "days-to-keep")]
    pub days_to_keep: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self { days_to_keep: 5 }
    }
}

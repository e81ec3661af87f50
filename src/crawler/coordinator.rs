//! Harvest coordinator - one bounded pass over the configured sites
//!
//! The coordinator walks sites in registry order and each site's pages in
//! configured order. For every page it:
//! - Checks the global item cap
//! - Extracts the listing's candidates
//! - Runs the detail stage over them with bounded concurrency
//! - Accumulates the records and sleeps the politeness delay
//!
//! Once iteration ends the whole batch is deduplicated and persisted in a
//! single pass.

use crate::config::{Config, HarvesterConfig};
use crate::crawler::detail::extract_detail;
use crate::crawler::dispatcher::run_bounded;
use crate::crawler::fetcher::{build_http_client, RetryPolicy};
use crate::crawler::listing::extract_listing;
use crate::record::{dedupe, CandidateItem, HarvestedRecord};
use crate::sites::{SiteConfig, SiteRegistry};
use crate::storage::{persist, JobStore, SqliteStorage};
use crate::Result;
use reqwest::Client;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Counts reported by a harvest pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HarvestSummary {
    /// Records gathered before deduplication
    pub collected: usize,
    /// Rows confirmed stored
    pub inserted: usize,
}

/// Runs harvest passes with one shared HTTP client
pub struct Harvester {
    settings: HarvesterConfig,
    registry: SiteRegistry,
    client: Client,
    list_policy: RetryPolicy,
    detail_policy: RetryPolicy,
}

impl Harvester {
    /// Creates a harvester for the given configuration
    pub fn new(config: &Config) -> Result<Self> {
        let settings = config.harvester.clone();
        let list_policy = RetryPolicy::new(
            settings.list_timeout_ms,
            settings.fetch_retries,
            settings.backoff_base_ms,
        );
        let detail_policy = RetryPolicy::new(
            settings.detail_timeout_ms,
            settings.fetch_retries,
            settings.backoff_base_ms,
        );

        Ok(Self {
            registry: SiteRegistry::from_config(config),
            client: build_http_client()?,
            settings,
            list_policy,
            detail_policy,
        })
    }

    pub fn registry(&self) -> &SiteRegistry {
        &self.registry
    }

    /// Gathers records from the selected sites, up to the global cap
    ///
    /// `requested` restricts the pass to one site; an unknown identifier
    /// covers all sites. Records come out in site, page, item order.
    pub async fn collect(&self, requested: Option<&str>) -> Vec<HarvestedRecord> {
        let cap = self.settings.max_total_items;
        let page_delay = Duration::from_millis(self.settings.page_delay_ms);
        let mut buffer: Vec<HarvestedRecord> = Vec::new();

        'sites: for site in self.registry.select(requested) {
            if buffer.len() >= cap {
                tracing::info!("Reached the cap of {} items, stopping", cap);
                break;
            }
            tracing::info!("Harvesting {} ({})", site.id, site.base_url);

            for &page in &site.pages {
                let remaining = cap.saturating_sub(buffer.len());
                if remaining == 0 {
                    tracing::info!("Reached the cap of {} items, stopping", cap);
                    break 'sites;
                }

                let mut candidates =
                    extract_listing(&self.client, site, page, &self.list_policy).await;
                if candidates.is_empty() {
                    tracing::info!("{}: no items on page {}, next site", site.id, page);
                    break;
                }
                candidates.truncate(remaining);

                let results = run_bounded(
                    &candidates,
                    |item| self.harvest_item(site, item),
                    self.settings.detail_concurrency,
                )
                .await;

                let added = accumulate(&mut buffer, site, results);
                tracing::info!(
                    "{}: page {} yielded {} records ({} total)",
                    site.id,
                    page,
                    added,
                    buffer.len()
                );

                if !page_delay.is_zero() {
                    tokio::time::sleep(page_delay).await;
                }
            }
        }

        buffer
    }

    /// Deduplicates a batch and persists it into `store`
    pub fn store_batch<S>(&self, store: &mut S, records: Vec<HarvestedRecord>) -> HarvestSummary
    where
        S: JobStore + ?Sized,
    {
        let collected = records.len();
        let deduped = dedupe(records);
        tracing::info!(
            "Deduplicated {} records into {} postings",
            collected,
            deduped.len()
        );

        let inserted = persist(store, &deduped, self.settings.chunk_size);
        HarvestSummary {
            collected,
            inserted,
        }
    }

    /// Runs one full pass against `store`
    ///
    /// An empty batch leaves the store untouched.
    pub async fn run<S>(&self, store: &mut S, requested: Option<&str>) -> HarvestSummary
    where
        S: JobStore + ?Sized,
    {
        let records = self.collect(requested).await;
        if records.is_empty() {
            tracing::info!("No items fetched");
            return HarvestSummary::default();
        }
        self.store_batch(store, records)
    }

    async fn harvest_item(
        &self,
        site: &SiteConfig,
        item: &CandidateItem,
    ) -> Result<HarvestedRecord> {
        tracing::debug!("{}: fetching {}", site.id, item.absolute_url);
        let fields =
            extract_detail(&self.client, site, &item.absolute_url, &self.detail_policy).await;

        Ok(HarvestedRecord {
            canonical_url: item.absolute_url.clone(),
            title: item.title.clone(),
            source_host: site.source_host(),
            fields,
        })
    }
}

/// Appends the successful results of one page to `buffer`
///
/// A failed item is logged and skipped; the rest of the page still counts.
/// Returns the number of records added.
fn accumulate(
    buffer: &mut Vec<HarvestedRecord>,
    site: &SiteConfig,
    results: Vec<Result<HarvestedRecord>>,
) -> usize {
    let before = buffer.len();
    for result in results {
        match result {
            Ok(record) => buffer.push(record),
            Err(e) => tracing::warn!("{}: item failed: {}", site.id, e),
        }
    }
    buffer.len() - before
}

/// Runs one harvest pass and persists it into the configured database
///
/// The database is only opened once fetching has finished, and not at all
/// when nothing was fetched.
///
/// # Example
///
/// ```no_run
/// use job_harvest::config::load_config;
/// use job_harvest::crawler::run_harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let summary = run_harvest(&config, Some("lancers")).await?;
/// println!("{} collected, {} stored", summary.collected, summary.inserted);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(config: &Config, requested: Option<&str>) -> Result<HarvestSummary> {
    let harvester = Harvester::new(config)?;

    let records = harvester.collect(requested).await;
    if records.is_empty() {
        tracing::info!("No items fetched");
        return Ok(HarvestSummary::default());
    }

    let mut store = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let summary = harvester.store_batch(&mut store, records);
    tracing::info!(
        "Harvest complete: {} collected, {} stored",
        summary.collected,
        summary.inserted
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutputConfig, RetentionConfig};
    use crate::crawler::fetcher::FetchError;
    use crate::sites::SiteKind;
    use crate::HarvestError;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record(n: usize) -> HarvestedRecord {
        HarvestedRecord {
            canonical_url: format!("https://example.com/jobs/{}", n),
            title: format!("Job {}", n),
            source_host: "example.com".to_string(),
            fields: Default::default(),
        }
    }

    fn lancers_site() -> SiteConfig {
        SiteRegistry::builtin()
            .sites()
            .iter()
            .find(|s| s.id == SiteKind::Lancers)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_accumulate_skips_failed_item() {
        let site = lancers_site();
        let mut buffer = vec![record(0)];
        let results = vec![
            Ok(record(1)),
            Err(HarvestError::Fetch(FetchError::Status {
                url: "https://example.com/jobs/2".to_string(),
                status: 500,
            })),
            Ok(record(3)),
        ];

        let added = accumulate(&mut buffer, &site, results);

        assert_eq!(added, 2);
        let urls: Vec<_> = buffer.iter().map(|r| r.canonical_url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/jobs/0",
                "https://example.com/jobs/1",
                "https://example.com/jobs/3",
            ]
        );
    }

    #[test]
    fn test_accumulate_all_failed_adds_nothing() {
        let site = lancers_site();
        let mut buffer = Vec::new();
        let results: Vec<Result<HarvestedRecord>> = vec![Err(HarvestError::Fetch(
            FetchError::Timeout {
                url: "https://example.com/jobs/1".to_string(),
                attempts: 3,
            },
        ))];

        assert_eq!(accumulate(&mut buffer, &site, results), 0);
        assert!(buffer.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_detail_still_yields_record() {
        let server = MockServer::start().await;
        let listing = format!(
            r#"<html><body>
                <div class="item"><a class="title" href="{0}/jobs/1">First job</a></div>
                <div class="item"><a class="title" href="{0}/jobs/2">Second job</a></div>
            </body></html>"#,
            server.uri()
        );
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/jobs/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><head><meta name="description" content="Rust backend work"></head></html>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/jobs/2"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = Config {
            harvester: HarvesterConfig {
                page_delay_ms: 0,
                backoff_base_ms: 0,
                ..HarvesterConfig::default()
            },
            output: OutputConfig {
                database_path: ":memory:".to_string(),
            },
            retention: RetentionConfig::default(),
            sites: vec![SiteConfig {
                id: SiteKind::Lancers,
                base_url: format!("{}/list", server.uri()),
                list_selector: ".item".to_string(),
                title_selector: "a.title".to_string(),
                link_attr: None,
                link_selector: Some("a.title".to_string()),
                pages: vec![1],
                max_items_per_page: 10,
            }],
        };

        let harvester = Harvester::new(&config).unwrap();
        let mut store = SqliteStorage::new_in_memory().unwrap();
        let summary = harvester.run(&mut store, None).await;

        // The failed detail page degrades to empty fields rather than
        // dropping the posting.
        assert_eq!(summary.collected, 2);
        assert_eq!(summary.inserted, 2);
        assert_eq!(store.count_jobs().unwrap(), 2);
    }
}

//! Crawler module for fetching and extracting postings
//!
//! This module contains the harvesting pipeline, including:
//! - HTTP fetching with timeouts and retry logic
//! - Listing and detail page extraction
//! - Bounded concurrent dispatch of detail fetches
//! - Overall harvest coordination

mod coordinator;
mod detail;
mod dispatcher;
mod fetcher;
mod listing;

pub use coordinator::{run_harvest, HarvestSummary, Harvester};
pub use detail::{extract_detail, parse_detail};
pub use dispatcher::run_bounded;
pub use fetcher::{build_http_client, fetch_with_retry, FetchError, RetryPolicy};
pub use listing::{extract_listing, parse_listing};

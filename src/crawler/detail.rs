//! Detail page extraction
//!
//! Fetches one posting and turns it into structured fields. Failures degrade
//! to the all-empty record and are never retried beyond the fetcher's budget.

use crate::crawler::fetcher::{fetch_with_retry, RetryPolicy};
use crate::record::{structure_description, RawDetail, StructuredFields};
use crate::sites::{meta_description, SiteConfig, SiteKind};
use reqwest::Client;
use scraper::Html;

/// Fetches a posting's detail page and structures its text
pub async fn extract_detail(
    client: &Client,
    site: &SiteConfig,
    url: &str,
    policy: &RetryPolicy,
) -> StructuredFields {
    if site.id.is_non_posting(url) {
        tracing::debug!("{}: skipping non-posting page {}", site.id, url);
        return StructuredFields::default();
    }

    match fetch_with_retry(client, url, Some(&site.base_url), policy).await {
        Ok(body) => {
            let fields = parse_detail(site.id, &body);
            if fields.is_empty() {
                tracing::debug!("{}: no text found on {}", site.id, url);
            }
            fields
        }
        Err(e) => {
            tracing::warn!("{}: detail page unavailable: {}", site.id, e);
            StructuredFields::default()
        }
    }
}

/// Structures a detail page body using the site's section layout
///
/// When the page has neither sections nor a body block, the
/// `<meta name="description">` content is used as the only text.
pub fn parse_detail(kind: SiteKind, html: &str) -> StructuredFields {
    let document = Html::parse_document(html);

    let raw = match kind.detail(&document) {
        RawDetail::Empty => meta_description(&document)
            .map(RawDetail::Body)
            .unwrap_or(RawDetail::Empty),
        raw => raw,
    };

    structure_description(&raw.into_text())
}

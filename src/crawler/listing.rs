//! Listing page extraction
//!
//! Turns one listing page of a site into candidate items. Extraction never
//! fails: a fetch error, an invalid selector or a reshaped page all yield an
//! empty list.

use crate::crawler::fetcher::{fetch_with_retry, RetryPolicy};
use crate::record::CandidateItem;
use crate::sites::{collapse_title, selector, SiteConfig};
use crate::url::resolve_link;
use reqwest::Client;
use scraper::Html;
use url::Url;

/// Fetches listing page `page` of a site and extracts its candidates
pub async fn extract_listing(
    client: &Client,
    site: &SiteConfig,
    page: u32,
    policy: &RetryPolicy,
) -> Vec<CandidateItem> {
    let base = match Url::parse(&site.base_url) {
        Ok(base) => base,
        Err(e) => {
            tracing::warn!("{}: invalid entry URL {}: {}", site.id, site.base_url, e);
            return Vec::new();
        }
    };

    let page_url = site.id.page_url(&base, page);
    tracing::info!("{}: Fetching listing page {} ({})", site.id, page, page_url);

    match fetch_with_retry(client, page_url.as_str(), Some(&site.base_url), policy).await {
        Ok(body) => {
            let items = parse_listing(site, &base, &body);
            tracing::info!("{}: Found {} items on page {}", site.id, items.len(), page);
            items
        }
        Err(e) => {
            tracing::warn!("{}: listing page {} unavailable: {}", site.id, page, e);
            Vec::new()
        }
    }
}

/// Extracts candidates from a listing page body
///
/// The site's embedded payload is tried first; the configured selectors are
/// used when there is none. Items come out in document order, at most
/// `max_items_per_page` of them, each with a non-empty title and an absolute
/// link resolved against the entry URL.
pub fn parse_listing(site: &SiteConfig, base: &Url, html: &str) -> Vec<CandidateItem> {
    let document = Html::parse_document(html);

    if let Some(items) = site
        .id
        .embedded_listing(&document, base, site.max_items_per_page)
    {
        return items;
    }

    let (Some(list_selector), Some(title_selector)) =
        (selector(&site.list_selector), selector(&site.title_selector))
    else {
        return Vec::new();
    };
    let link_selector = site.link_selector.as_deref().and_then(selector);

    let mut items = Vec::new();
    for element in document.select(&list_selector).take(site.max_items_per_page) {
        let title = element
            .select(&title_selector)
            .next()
            .map(|title| collapse_title(&title.text().collect::<String>()))
            .unwrap_or_default();

        let href = match (site.link_attr.as_deref(), &link_selector) {
            (Some(attr), _) => element.value().attr(attr),
            (None, Some(link_selector)) => element
                .select(link_selector)
                .next()
                .and_then(|link| link.value().attr("href")),
            (None, None) => None,
        };

        let Some(absolute_url) = href.and_then(|href| resolve_link(href, base)) else {
            tracing::debug!("{}: skipping item without a usable link", site.id);
            continue;
        };
        if title.is_empty() {
            tracing::debug!("{}: skipping {} without a title", site.id, absolute_url);
            continue;
        }

        items.push(CandidateItem {
            title,
            absolute_url,
        });
    }

    items
}

//! URL handling for job-harvest
//!
//! This module provides canonicalization (the deduplication and storage key),
//! source host extraction, and link resolution against a listing page.

mod domain;
mod normalize;

pub use domain::{source_host, source_host_str};
pub use normalize::canonical_url;

use url::Url;

/// Resolves a listing link to an absolute http(s) URL
///
/// Returns None for empty hrefs, `javascript:`/`mailto:`/`tel:`/`data:`
/// links, fragment-only anchors and anything that fails to resolve.
///
/// # Examples
///
/// ```
/// use job_harvest::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://crowdworks.jp/public/jobs/group/development").unwrap();
/// assert_eq!(
///     resolve_link("/public/jobs/123", &base),
///     Some("https://crowdworks.jp/public/jobs/123".to_string())
/// );
/// ```
pub fn resolve_link(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute = base.join(href).ok()?;
    if absolute.scheme() == "http" || absolute.scheme() == "https" {
        Some(absolute.to_string())
    } else {
        None
    }
}

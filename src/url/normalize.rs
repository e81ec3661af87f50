use url::Url;

/// Reduces a posting URL to its canonical form
///
/// # Canonicalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Parse the URL; http(s) URLs keep only scheme, host, port and path
/// 3. Drop the query string and fragment
/// 4. Strip one trailing slash
///
/// URLs that do not parse as http(s) are trimmed and stripped of a trailing
/// slash only. An empty input yields an empty key.
///
/// # Examples
///
/// ```
/// use job_harvest::url::canonical_url;
///
/// assert_eq!(
///     canonical_url("https://crowdworks.jp/public/jobs/123/?ref=top#apply"),
///     "https://crowdworks.jp/public/jobs/123"
/// );
/// ```
pub fn canonical_url(url_str: &str) -> String {
    let trimmed = url_str.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let canonical = match Url::parse(trimmed) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            format!("{}{}", url.origin().ascii_serialization(), url.path())
        }
        _ => trimmed.to_string(),
    };

    match canonical.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => canonical,
    }
}

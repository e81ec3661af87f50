use url::Url;

/// Extracts the source host of a site: lowercase, without a `www.` prefix
///
/// # Examples
///
/// ```
/// use url::Url;
/// use job_harvest::url::source_host;
///
/// let url = Url::parse("https://www.lancers.jp/work/search").unwrap();
/// assert_eq!(source_host(&url), Some("lancers.jp".to_string()));
/// ```
pub fn source_host(url: &Url) -> Option<String> {
    url.host_str().map(|host| {
        let host = host.to_lowercase();
        match host.strip_prefix("www.") {
            Some(stripped) => stripped.to_string(),
            None => host,
        }
    })
}

/// Like [`source_host`], falling back to the input when it does not parse
pub fn source_host_str(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| source_host(&parsed))
        .unwrap_or_else(|| url.to_string())
}

use crate::config::types::{Config, HarvesterConfig, OutputConfig, RetentionConfig};
use crate::sites::SiteConfig;
use crate::ConfigError;
use scraper::Selector;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_harvester_config(&config.harvester)?;
    validate_output_config(&config.output)?;
    validate_retention_config(&config.retention)?;
    validate_sites(&config.sites)?;
    Ok(())
}

/// Validates harvest tuning knobs
fn validate_harvester_config(config: &HarvesterConfig) -> Result<(), ConfigError> {
    if config.detail_concurrency < 1 || config.detail_concurrency > 16 {
        return Err(ConfigError::Validation(format!(
            "detail_concurrency must be between 1 and 16, got {}",
            config.detail_concurrency
        )));
    }

    if config.max_total_items < 1 {
        return Err(ConfigError::Validation(format!(
            "max_total_items must be >= 1, got {}",
            config.max_total_items
        )));
    }

    for (name, value) in [
        ("list_timeout_ms", config.list_timeout_ms),
        ("detail_timeout_ms", config.detail_timeout_ms),
    ] {
        if value < 100 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 100ms, got {}ms",
                name, value
            )));
        }
    }

    if config.chunk_size < 1 {
        return Err(ConfigError::Validation(format!(
            "chunk_size must be >= 1, got {}",
            config.chunk_size
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_retention_config(config: &RetentionConfig) -> Result<(), ConfigError> {
    if config.days_to_keep < 1 {
        return Err(ConfigError::Validation(format!(
            "days_to_keep must be >= 1, got {}",
            config.days_to_keep
        )));
    }

    Ok(())
}

/// Validates site overrides
fn validate_sites(sites: &[SiteConfig]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for site in sites {
        if !seen.insert(site.id) {
            return Err(ConfigError::Validation(format!(
                "Site '{}' is configured more than once",
                site.id
            )));
        }

        validate_site(site)?;
    }

    Ok(())
}

/// Validates a single site entry
pub(crate) fn validate_site(site: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&site.base_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", site.base_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            site.base_url
        )));
    }

    validate_selector(&site.list_selector)?;
    validate_selector(&site.title_selector)?;

    match (&site.link_attr, &site.link_selector) {
        (Some(attr), None) if !attr.trim().is_empty() => {}
        (None, Some(selector)) => validate_selector(selector)?,
        _ => {
            return Err(ConfigError::Validation(format!(
                "Site '{}' must set exactly one of link_attr or link_selector",
                site.id
            )));
        }
    }

    if site.pages.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Site '{}' must list at least one page",
            site.id
        )));
    }

    if site.pages.iter().any(|&page| page < 1) {
        return Err(ConfigError::Validation(format!(
            "Site '{}' page numbers start at 1",
            site.id
        )));
    }

    if site.max_items_per_page < 1 {
        return Err(ConfigError::Validation(format!(
            "Site '{}' max_items_per_page must be >= 1",
            site.id
        )));
    }

    Ok(())
}

fn validate_selector(css: &str) -> Result<(), ConfigError> {
    Selector::parse(css)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", css, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::{SiteKind, SiteRegistry};

    fn lancers_site() -> SiteConfig {
        SiteConfig {
            id: SiteKind::Lancers,
            base_url: "https://www.lancers.jp/work/search/system?open=1".to_string(),
            list_selector: ".p-search-job-media".to_string(),
            title_selector: "a.p-search-job-media__title".to_string(),
            link_attr: None,
            link_selector: Some("a.p-search-job-media__title".to_string()),
            pages: vec![1],
            max_items_per_page: 15,
        }
    }

    #[test]
    fn test_builtin_sites_are_valid() {
        for site in SiteRegistry::builtin().sites() {
            assert!(validate_site(site).is_ok(), "{} should be valid", site.id);
        }
    }

    #[test]
    fn test_rejects_both_link_sources() {
        let mut site = lancers_site();
        site.link_attr = Some("data-url".to_string());
        assert!(matches!(
            validate_site(&site),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_missing_link_source() {
        let mut site = lancers_site();
        site.link_selector = None;
        assert!(validate_site(&site).is_err());
    }

    #[test]
    fn test_rejects_bad_selector() {
        let mut site = lancers_site();
        site.list_selector = "li[[".to_string();
        assert!(matches!(
            validate_site(&site),
            Err(ConfigError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut site = lancers_site();
        site.base_url = "ftp://lancers.jp/work".to_string();
        assert!(matches!(
            validate_site(&site),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_rejects_zero_page() {
        let mut site = lancers_site();
        site.pages = vec![0, 1];
        assert!(validate_site(&site).is_err());

        site.pages = vec![];
        assert!(validate_site(&site).is_err());
    }

    #[test]
    fn test_rejects_duplicate_sites() {
        assert!(validate_sites(&[lancers_site(), lancers_site()]).is_err());
    }

    #[test]
    fn test_harvester_bounds() {
        let mut harvester = HarvesterConfig::default();
        assert!(validate_harvester_config(&harvester).is_ok());

        harvester.detail_concurrency = 17;
        assert!(validate_harvester_config(&harvester).is_err());

        harvester.detail_concurrency = 1;
        harvester.detail_timeout_ms = 50;
        assert!(validate_harvester_config(&harvester).is_err());

        harvester.detail_timeout_ms = 6_000;
        harvester.chunk_size = 0;
        assert!(validate_harvester_config(&harvester).is_err());
    }
}

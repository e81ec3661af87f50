//! Source site registry and per-site strategies
//!
//! Each supported site is a [`SiteKind`] variant. The variant selects the
//! site's pagination rule, its optional embedded listing payload and the DOM
//! shape its detail pages are read from. Selectors for the listing page live
//! in [`SiteConfig`] so they can be overridden from the configuration file.

mod crowdworks;
mod dom;
mod freelance_start;
mod lancers;

pub use dom::{collapse_title, meta_description, normalize_block_text};
pub(crate) use dom::selector;

use crate::config::Config;
use crate::record::{CandidateItem, RawDetail};
use crate::url::source_host_str;
use scraper::Html;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use url::Url;

const DEFAULT_PAGES: &[u32] = &[1];
const DEFAULT_MAX_ITEMS_PER_PAGE: usize = 15;

/// The closed set of supported source sites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SiteKind {
    FreelanceStart,
    Lancers,
    Crowdworks,
}

impl SiteKind {
    pub const ALL: [SiteKind; 3] = [Self::FreelanceStart, Self::Lancers, Self::Crowdworks];

    /// The site identifier used in configuration and trigger requests
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FreelanceStart => "freelance-start",
            Self::Lancers => "lancers",
            Self::Crowdworks => "crowdworks",
        }
    }

    /// Builds the listing URL for a page number
    ///
    /// Page 1 is the entry URL itself.
    pub fn page_url(&self, base: &Url, page: u32) -> Url {
        if page <= 1 {
            return base.clone();
        }

        match self {
            Self::FreelanceStart => freelance_start::page_url(base, page),
            Self::Lancers => lancers::page_url(base, page),
            Self::Crowdworks => crowdworks::page_url(base, page),
        }
    }

    /// Reads candidates from a structured payload embedded in the listing
    ///
    /// Returns None when the site has no such payload or it is unusable, in
    /// which case the selector-based path applies.
    pub fn embedded_listing(
        &self,
        document: &Html,
        base: &Url,
        max_items: usize,
    ) -> Option<Vec<CandidateItem>> {
        match self {
            Self::Crowdworks => crowdworks::embedded_listing(document, base, max_items),
            Self::FreelanceStart | Self::Lancers => None,
        }
    }

    /// Returns true for URLs known not to be postings
    pub fn is_non_posting(&self, url: &str) -> bool {
        match self {
            Self::Lancers => lancers::is_landing_page(url),
            Self::FreelanceStart | Self::Crowdworks => false,
        }
    }

    /// Assembles the labeled sections of a detail page
    pub fn detail(&self, document: &Html) -> RawDetail {
        match self {
            Self::FreelanceStart => freelance_start::detail(document),
            Self::Lancers => lancers::detail(document),
            Self::Crowdworks => crowdworks::detail(document),
        }
    }
}

impl fmt::Display for SiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SiteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| format!("unknown site '{}'", s))
    }
}

/// Replaces any `page` query parameter with the given page number
fn with_page_param(base: &Url, page: u32) -> Url {
    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair("page", &page.to_string());
    url
}

/// Static configuration of one source site
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Site identifier, which also selects the extraction strategy
    pub id: SiteKind,

    /// Listing entry URL (page 1)
    pub base_url: String,

    /// Selector for one listing item
    pub list_selector: String,

    /// Selector for the title inside an item
    pub title_selector: String,

    /// Attribute of the item element that holds the link
    #[serde(default)]
    pub link_attr: Option<String>,

    /// Selector inside the item whose `href` is the link
    #[serde(default)]
    pub link_selector: Option<String>,

    /// Listing page numbers to visit, in order
    pub pages: Vec<u32>,

    /// Maximum items taken from one listing page
    pub max_items_per_page: usize,
}

impl SiteConfig {
    /// Host of the entry URL, used as the records' source host
    pub fn source_host(&self) -> String {
        source_host_str(&self.base_url)
    }

    fn builtin(id: SiteKind) -> Self {
        let (base_url, list_selector, title_selector, link_attr, link_selector) = match id {
            SiteKind::FreelanceStart => (
                "https://freelance-start.com/jobs",
                ".card.job-top-list-card.ajax-job-link",
                "h3.card-head",
                Some("data-url"),
                None,
            ),
            SiteKind::Lancers => (
                "https://www.lancers.jp/work/search/system?open=1&ref=header_menu&show_description=1&sort=client&work_rank%5B0%5D=2&work_rank%5B1%5D=3&work_rank%5B2%5D=0&category=0",
                ".p-search-job-media.c-media.c-media--item",
                "a.p-search-job-media__title",
                None,
                Some("a.p-search-job-media__title"),
            ),
            SiteKind::Crowdworks => (
                "https://crowdworks.jp/public/jobs/group/development",
                "li[data-v-4ec52cea]",
                "h3.hJvZi a",
                None,
                Some("h3.hJvZi a"),
            ),
        };

        Self {
            id,
            base_url: base_url.to_string(),
            list_selector: list_selector.to_string(),
            title_selector: title_selector.to_string(),
            link_attr: link_attr.map(str::to_string),
            link_selector: link_selector.map(str::to_string),
            pages: DEFAULT_PAGES.to_vec(),
            max_items_per_page: DEFAULT_MAX_ITEMS_PER_PAGE,
        }
    }
}

/// Immutable set of configured sites, in harvest order
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    sites: Vec<SiteConfig>,
}

impl SiteRegistry {
    pub fn new(sites: Vec<SiteConfig>) -> Self {
        Self { sites }
    }

    /// The three built-in sites with their production selectors
    pub fn builtin() -> Self {
        Self::new(SiteKind::ALL.into_iter().map(SiteConfig::builtin).collect())
    }

    /// Uses the configured sites, or the built-in registry when none are given
    pub fn from_config(config: &Config) -> Self {
        if config.sites.is_empty() {
            Self::builtin()
        } else {
            Self::new(config.sites.clone())
        }
    }

    pub fn sites(&self) -> &[SiteConfig] {
        &self.sites
    }

    pub fn get(&self, id: &str) -> Option<&SiteConfig> {
        self.sites.iter().find(|site| site.id.as_str() == id.trim())
    }

    /// Sites covered by a run: the requested one when known, otherwise all
    pub fn select(&self, requested: Option<&str>) -> Vec<&SiteConfig> {
        if let Some(id) = requested {
            match self.get(id) {
                Some(site) => return vec![site],
                None => tracing::warn!("Unknown site '{}' requested, harvesting all sites", id),
            }
        }
        self.sites.iter().collect()
    }
}

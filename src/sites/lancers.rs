//! lancers.jp: definition lists of `dt`/`dd` pairs

use crate::record::{RawDetail, Section};
use crate::sites::dom::{body_text, normalize_block_text, select_all, text_of_all};
use crate::sites::with_page_param;
use scraper::Html;
use url::Url;

pub(super) fn page_url(base: &Url, page: u32) -> Url {
    with_page_param(base, page)
}

/// Landing pages live under `/lp/` and carry no posting
pub(super) fn is_landing_page(url: &str) -> bool {
    url.contains("/lp/")
}

pub(super) fn detail(document: &Html) -> RawDetail {
    let sections = select_all(document.root_element(), "dl.c-definition-list")
        .into_iter()
        .filter_map(|list| {
            let term = text_of_all(list, "dt").trim().to_string();
            let definition = normalize_block_text(&text_of_all(list, "dd"));
            (!term.is_empty() && !definition.is_empty()).then(|| Section::new(term, definition))
        })
        .collect();

    RawDetail::from_parts(sections, body_text(document, ".p-article__body, .c-article__body"))
}

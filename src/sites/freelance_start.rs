//! freelance-start.com: salary block plus titled `.section` blocks

use crate::record::{RawDetail, Section};
use crate::sites::dom::{body_text, first_text, normalize_block_text, select_all, text_of_all};
use scraper::Html;
use url::Url;

/// Appends `page=<n>` to the entry URL
pub(super) fn page_url(base: &Url, page: u32) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut().append_pair("page", &page.to_string());
    url
}

pub(super) fn detail(document: &Html) -> RawDetail {
    let root = document.root_element();
    let mut sections = Vec::new();

    let salary = first_text(root, ".salary-info .salary");
    let unit = first_text(root, ".salary-info .salary-unit");
    if !salary.is_empty() {
        sections.push(Section::new("単価", format!("{}{}", salary, unit)));
    }

    for block in select_all(root, ".section") {
        let title = text_of_all(block, "h2.section-title, h3.card-head")
            .trim()
            .to_string();
        let content =
            normalize_block_text(&text_of_all(block, ".description, .content, p, div"));
        if !title.is_empty() && !content.is_empty() {
            sections.push(Section::new(title, content));
        }
    }

    RawDetail::from_parts(sections, body_text(document, ".job-detail-body, .card-body"))
}

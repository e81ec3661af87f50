//! crowdworks.jp: embedded Vue payload on listings, summary tables on details

use crate::record::{CandidateItem, RawDetail, Section};
use crate::sites::dom::{
    body_text, collapse_title, first_text, normalize_block_text, select_all, selector,
    text_of_all,
};
use crate::sites::with_page_param;
use scraper::Html;
use serde_json::Value;
use url::Url;

pub(super) fn page_url(base: &Url, page: u32) -> Url {
    with_page_param(base, page)
}

/// Reads `searchResult.job_offers` from the `data` attribute of `#vue-container`
pub(super) fn embedded_listing(
    document: &Html,
    base: &Url,
    max_items: usize,
) -> Option<Vec<CandidateItem>> {
    let container = selector("#vue-container")?;
    let raw = document.select(&container).next()?.value().attr("data")?;

    let payload: Value = match serde_json::from_str(raw) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!("crowdworks: embedded payload is not JSON: {}", e);
            return None;
        }
    };

    let offers = payload.pointer("/searchResult/job_offers")?.as_array()?;
    if offers.is_empty() {
        return None;
    }
    tracing::info!("crowdworks: Found {} jobs via embedded data", offers.len());

    let items = offers
        .iter()
        .take(max_items)
        .filter_map(|offer| {
            let job = offer.get("job_offer")?;
            let title = collapse_title(job.get("title")?.as_str()?);
            let id = match job.get("id")? {
                Value::Number(id) => id.to_string(),
                Value::String(id) => id.trim().to_string(),
                _ => return None,
            };
            if title.is_empty() || id.is_empty() {
                return None;
            }

            let absolute_url = base.join(&format!("/public/jobs/{}", id)).ok()?;
            Some(CandidateItem {
                title,
                absolute_url: absolute_url.to_string(),
            })
        })
        .collect();

    Some(items)
}

pub(super) fn detail(document: &Html) -> RawDetail {
    let root = document.root_element();
    let mut sections = Vec::new();

    let description = normalize_block_text(&first_text(root, ".job_offer_detail_table td"));
    if !description.is_empty() {
        sections.push(Section::new("仕事の詳細", description));
    }

    for row in select_all(
        root,
        ".job_offer_summary table.summary tbody tr, .detail_information tbody tr",
    ) {
        let header = text_of_all(row, "th").trim().to_string();
        let content = normalize_block_text(&text_of_all(row, "td"));
        if !header.is_empty() && !content.is_empty() {
            sections.push(Section::new(header, content));
        }
    }

    RawDetail::from_parts(sections, body_text(document, ".job_offer_detail_table"))
}

//! Posting records and their transformations
//!
//! This module holds the data that flows through a harvest pass:
//! - Candidate items found on listing pages
//! - Structured fields derived from a posting's detail page
//! - Harvested records ready for deduplication and persistence

mod dedupe;
mod structurer;

pub use dedupe::dedupe;
pub use structurer::{structure_description, RawDetail, Section};

use serde::Serialize;

/// Maximum characters kept in [`StructuredFields::detail`]
pub const DETAIL_CAP: usize = 4000;
/// Maximum characters kept in [`StructuredFields::price`]
pub const PRICE_CAP: usize = 1000;
/// Maximum characters kept in [`StructuredFields::period`]
pub const PERIOD_CAP: usize = 1000;
/// Maximum characters kept in [`StructuredFields::skills`]
pub const SKILLS_CAP: usize = 2000;
/// Maximum characters kept in [`StructuredFields::other`]
pub const OTHER_CAP: usize = 2000;

/// A posting link found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateItem {
    pub title: String,
    pub absolute_url: String,
}

/// Semantic buckets a posting's free text is classified into
///
/// Absent data is an empty string, never a missing field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructuredFields {
    /// Overview and duties
    pub detail: String,
    /// Price, budget or compensation
    pub price: String,
    /// Duration, deadline or working hours
    pub period: String,
    /// Required skills and experience
    pub skills: String,
    /// Everything that matched no other bucket
    pub other: String,
    /// Reserved for future use, always empty
    pub reserved: String,
}

impl StructuredFields {
    /// Returns true when every field is empty
    pub fn is_empty(&self) -> bool {
        self.detail.is_empty()
            && self.price.is_empty()
            && self.period.is_empty()
            && self.skills.is_empty()
            && self.other.is_empty()
            && self.reserved.is_empty()
    }

    /// Trims every field and cuts it to its character cap
    pub fn enforce_caps(&mut self) {
        truncate_field(&mut self.detail, DETAIL_CAP);
        truncate_field(&mut self.price, PRICE_CAP);
        truncate_field(&mut self.period, PERIOD_CAP);
        truncate_field(&mut self.skills, SKILLS_CAP);
        truncate_field(&mut self.other, OTHER_CAP);
        self.reserved.clear();
    }
}

/// A posting ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarvestedRecord {
    /// Canonical URL, the posting's identity across runs
    pub canonical_url: String,
    pub title: String,
    /// Host of the source site without a leading `www.`
    pub source_host: String,
    #[serde(flatten)]
    pub fields: StructuredFields,
}

fn truncate_field(value: &mut String, cap: usize) {
    let trimmed = value.trim();
    let truncated: String = trimmed.chars().take(cap).collect();
    *value = truncated.trim_end().to_string();
}

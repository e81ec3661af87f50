//! Classification of a posting's raw text into structured fields
//!
//! Every site's detail extraction converges on [`RawDetail`]. It is
//! serialized into marker-delimited text (`--- header ---`), split back into
//! header/content pairs and routed to a field by keyword matching on the
//! header. The keyword table is ordered and the first matching field wins.

use crate::record::StructuredFields;
use regex::Regex;
use std::sync::OnceLock;

/// A labeled block of a detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub header: String,
    pub content: String,
}

impl Section {
    pub fn new(header: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            content: content.into(),
        }
    }
}

/// Raw text assembled from a detail page, before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawDetail {
    /// Labeled header/content pairs in document order
    Sections(Vec<Section>),
    /// A single unlabeled body blob
    Body(String),
    /// Nothing usable was found
    Empty,
}

impl RawDetail {
    /// Picks the richest available shape: sections, then body, then nothing
    pub fn from_parts(sections: Vec<Section>, body: String) -> Self {
        if !sections.is_empty() {
            Self::Sections(sections)
        } else if !body.trim().is_empty() {
            Self::Body(body.trim().to_string())
        } else {
            Self::Empty
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Serializes the detail into marker-delimited text
    pub fn into_text(self) -> String {
        match self {
            Self::Sections(sections) => sections
                .iter()
                .map(|section| {
                    let header = section.header.split_whitespace().collect::<Vec<_>>().join(" ");
                    format!("--- {} ---\n{}", header, section.content.trim())
                })
                .collect::<Vec<_>>()
                .join("\n\n"),
            Self::Body(body) => body,
            Self::Empty => String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Price,
    Period,
    Skills,
    Detail,
}

/// Header keywords per field, lowercase, checked in order
const KEYWORD_TABLE: &[(Field, &[&str])] = &[
    (
        Field::Price,
        &["単価", "予算", "報酬", "price", "budget", "compensation", "salary"],
    ),
    (
        Field::Period,
        &["期間", "納期", "稼働時間", "duration", "deadline", "working hours"],
    ),
    (
        Field::Skills,
        &["スキル", "経験", "条件", "skill", "experience", "requirement"],
    ),
    (
        Field::Detail,
        &["内容", "詳細", "概要", "職務", "overview", "description", "duties"],
    ),
];

fn marker_pattern() -> Option<&'static Regex> {
    static MARKER: OnceLock<Option<Regex>> = OnceLock::new();
    MARKER
        .get_or_init(|| Regex::new(r"---(.*?)---").ok())
        .as_ref()
}

fn classify_header(header: &str) -> Option<Field> {
    let header = header.to_lowercase();
    KEYWORD_TABLE
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| header.contains(keyword)))
        .map(|(field, _)| *field)
}

fn field_mut(fields: &mut StructuredFields, field: Option<Field>) -> &mut String {
    match field {
        Some(Field::Price) => &mut fields.price,
        Some(Field::Period) => &mut fields.period,
        Some(Field::Skills) => &mut fields.skills,
        Some(Field::Detail) => &mut fields.detail,
        None => &mut fields.other,
    }
}

fn append_block(target: &mut String, block: &str) {
    if !target.is_empty() {
        target.push_str("\n\n");
    }
    target.push_str(block);
}

/// Splits marker-delimited text into structured fields
///
/// Text without any `--- header ---` marker lands entirely in `detail`.
/// Text before the first marker becomes `detail` unless a section already
/// filled it, in which case it is prepended to `other`. Caps are applied last.
pub fn structure_description(full_text: &str) -> StructuredFields {
    let mut fields = StructuredFields::default();
    if full_text.trim().is_empty() {
        return fields;
    }

    let Some(pattern) = marker_pattern() else {
        fields.detail = full_text.trim().to_string();
        fields.enforce_caps();
        return fields;
    };
    let bodies: Vec<&str> = pattern.split(full_text).collect();
    let headers: Vec<&str> = pattern
        .captures_iter(full_text)
        .filter_map(|captures| captures.get(1))
        .map(|header| header.as_str().trim())
        .collect();

    if headers.is_empty() && bodies.len() > 1 {
        fields.detail = full_text.to_string();
        fields.enforce_caps();
        return fields;
    }

    let preamble = bodies.first().map(|body| body.trim()).unwrap_or_default();

    if headers.is_empty() {
        fields.detail = preamble.to_string();
    } else {
        for (index, header) in headers.iter().enumerate() {
            let content = bodies
                .get(index + 1)
                .map(|body| body.trim())
                .unwrap_or_default();
            if content.is_empty() {
                continue;
            }

            let block = format!("{}\n{}", header, content);
            append_block(field_mut(&mut fields, classify_header(header)), &block);
        }

        if !preamble.is_empty() {
            if fields.detail.is_empty() {
                fields.detail = preamble.to_string();
            } else {
                fields.other = format!("{}\n\n{}", preamble, fields.other)
                    .trim()
                    .to_string();
            }
        }
    }

    fields.enforce_caps();
    fields
}

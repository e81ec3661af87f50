//! Small DOM helpers shared by the site strategies

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Parses a selector, returning None when it is invalid
pub(crate) fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::warn!("Invalid selector '{}': {:?}", css, e);
            None
        }
    }
}

/// Trims a title and collapses every whitespace run to one space
pub fn collapse_title(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes block text: runs of two or more whitespace characters and tabs
/// become a single space, lone line breaks are kept
pub fn normalize_block_text(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some((runs, tabs)) = whitespace_patterns() else {
        return trimmed.to_string();
    };

    let collapsed = runs.replace_all(trimmed, " ");
    tabs.replace_all(&collapsed, " ").into_owned()
}

fn whitespace_patterns() -> Option<&'static (Regex, Regex)> {
    static PATTERNS: OnceLock<Option<(Regex, Regex)>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| Some((Regex::new(r"\s{2,}").ok()?, Regex::new(r"[ \t]+").ok()?)))
        .as_ref()
}

/// Concatenated text of every outermost element matching `css` under `scope`
///
/// Matches nested inside another match are skipped so their text is not
/// counted twice.
pub(crate) fn text_of_all(scope: ElementRef<'_>, css: &str) -> String {
    let Some(selector) = selector(css) else {
        return String::new();
    };

    let matches: Vec<ElementRef<'_>> = scope.select(&selector).collect();
    let ids: HashSet<_> = matches.iter().map(|element| element.id()).collect();

    matches
        .iter()
        .filter(|element| !element.ancestors().any(|ancestor| ids.contains(&ancestor.id())))
        .flat_map(|element| element.text())
        .collect()
}

/// Trimmed text of the first element matching `css` under `scope`
pub(crate) fn first_text(scope: ElementRef<'_>, css: &str) -> String {
    selector(css)
        .and_then(|selector| scope.select(&selector).next())
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Every element matching `css` under `scope`
pub(crate) fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match selector(css) {
        Some(selector) => scope.select(&selector).collect(),
        None => Vec::new(),
    }
}

/// Normalized text of the first element matching `css` in the document
pub(crate) fn body_text(document: &Html, css: &str) -> String {
    normalize_block_text(&first_text(document.root_element(), css))
}

/// Content of `<meta name="description">`, if present
pub fn meta_description(document: &Html) -> Option<String> {
    let selector = selector(r#"meta[name="description"]"#)?;
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
}

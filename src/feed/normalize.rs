use chrono::DateTime;
use regex::Regex;
use std::sync::LazyLock;

use super::parser::RawItem;
use crate::util::strip_control_chars;

/// Maximum length of [`Post::excerpt`], in characters.
pub const EXCERPT_MAX_CHARS: usize = 200;

const FALLBACK_TITLE: &str = "Untitled";
const FALLBACK_AUTHOR: &str = "Staff";
const FALLBACK_CATEGORY: &str = "Uncategorized";

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is a valid regex"));

/// Fixed replacement table applied after tags are stripped.
///
/// Raw references survive inside CDATA sections, so both the encoded and the
/// decoded spellings are listed. Ellipsis markers come first so that
/// `[&#8230;]` is not half-rewritten by a later rule.
const REPLACEMENTS: &[(&str, &str)] = &[
    ("[&#8230;]", "..."),
    ("[&hellip;]", "..."),
    ("[…]", "..."),
    ("&#8211;", "–"),
    ("&#8217;", "'"),
    ("’", "'"),
    ("&nbsp;", " "),
    ("\u{a0}", " "),
];

/// A display-ready blog post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Ordinal position in the fetched batch. Not stable across refetches.
    pub id: String,
    pub title: String,
    pub link: String,
    pub excerpt: String,
    pub author: String,
    /// `Mar 5, 2024`, or empty when the feed date is missing or unparsable.
    pub date: String,
    pub category: String,
}

/// Strips tags and control characters, rewrites the fixed entity set, trims.
pub fn clean_text(raw: &str) -> String {
    let text = strip_control_chars(raw);
    let mut text = TAG_RE.replace_all(&text, "").into_owned();
    for (from, to) in REPLACEMENTS {
        if text.contains(from) {
            text = text.replace(from, to);
        }
    }
    text.trim().to_string()
}

/// Cleans a description and cuts it to [`EXCERPT_MAX_CHARS`] characters.
pub fn make_excerpt(raw: &str) -> String {
    let cleaned = clean_text(raw);
    match cleaned.char_indices().nth(EXCERPT_MAX_CHARS) {
        Some((cut, _)) => cleaned[..cut].to_string(),
        None => cleaned,
    }
}

/// Formats an RSS `pubDate` as `Mon D, YYYY` in the date's own offset.
///
/// RFC 2822 is the RSS format; RFC 3339 is accepted for feeds that get it
/// wrong. Anything else yields an empty string.
pub fn format_pub_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|e| {
            tracing::debug!(pub_date = %raw, error = %e, "Unparsable pubDate");
            String::new()
        })
}

/// Treats empty or whitespace-only text the same as a missing element.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Converts one raw feed item into a [`Post`] at position `index`.
pub fn normalize_item(index: usize, item: RawItem) -> Post {
    let title = non_blank(item.title)
        .map(|t| clean_text(&t))
        .unwrap_or_else(|| FALLBACK_TITLE.to_string());

    let author = non_blank(item.dc_creator)
        .or_else(|| non_blank(item.creator))
        .map(|a| clean_text(&a))
        .unwrap_or_else(|| FALLBACK_AUTHOR.to_string());

    let category = non_blank(item.category)
        .map(|c| clean_text(&c))
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string())
        .to_uppercase();

    Post {
        id: index.to_string(),
        title,
        link: item.link.map(|l| l.trim().to_string()).unwrap_or_default(),
        excerpt: make_excerpt(item.description.as_deref().unwrap_or_default()),
        author,
        date: format_pub_date(item.pub_date.as_deref().unwrap_or_default()),
        category,
    }
}

/// Normalizes a batch of items, preserving feed order.
pub fn normalize_items(items: Vec<RawItem>) -> Vec<Post> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| normalize_item(index, item))
        .collect()
}

//! Author and publish-date extraction from article pages.
//!
//! Site markup is inconsistent and changes without notice, so each field is
//! resolved by walking an ordered strategy table: CSS selectors from most to
//! least specific, then page-level `<meta>` tags, then embedded JSON-LD
//! blocks. The first strategy that yields an acceptable value wins. Every
//! step is best-effort: a missing element, an unparsable date or a malformed
//! JSON-LD block just moves on to the next strategy, and extraction as a
//! whole never fails.

use crate::dates::parse_fuzzy;
use crate::models::SourceFamily;
use crate::utils::{collapse_whitespace, element_text};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Author strings that are placeholders rather than names (compared lowercased).
pub const REJECTED_AUTHOR_VALUES: &[&str] = &["unknown", "n/a", "", "by", "author"];

static JSON_LD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

/// A `<meta>` tag lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaKey {
    Name(&'static str),
    Property(&'static str),
}

/// One step of a field's fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// First element matching the selector.
    Css(&'static str),
    /// `content` of the first tag present among the keys, in key order.
    Meta(&'static [MetaKey]),
    /// JSON-LD blocks in document order.
    StructuredData,
}

use Strategy::{Css, Meta, StructuredData};

const PRIMARY_AUTHOR: &[Strategy] = &[
    Css(".author > a"),
    Css(".author"),
    Css(".byline a"),
    Css(".byline"),
    Css(r#"[rel="author"]"#),
    Css(".post-author"),
    Css(".article-author"),
    Css(".author-name"),
    Css("span.author"),
    Css("div.author"),
    Meta(&[MetaKey::Name("author")]),
    StructuredData,
];

const SECONDARY_AUTHOR: &[Strategy] = &[
    Css(".author-name"),
    Css(".byline a"),
    Css(".byline"),
    Css(r#"[rel="author"]"#),
    Css(".author"),
    Css(".post-author"),
    Meta(&[MetaKey::Name("author")]),
    StructuredData,
];

const DATE_META: &[MetaKey] = &[
    MetaKey::Property("article:published_time"),
    MetaKey::Name("published_date"),
    MetaKey::Name("date"),
];

const PRIMARY_DATE: &[Strategy] = &[
    Css("time[datetime]"),
    Css("time"),
    Css(".published-date"),
    Css(".post-date"),
    Css(".date"),
    Css(r#"[property="article:published_time"]"#),
    Css(".article-date"),
    Css(".entry-date"),
    Meta(DATE_META),
    StructuredData,
];

const SECONDARY_DATE: &[Strategy] = &[
    Css("time[datetime]"),
    Css("time"),
    Css(".published-date"),
    Css(".post-date"),
    Css(".date"),
    Css(r#"[property="article:published_time"]"#),
    Meta(DATE_META),
    StructuredData,
];

/// The author lookup order for a source family.
///
/// # Returns
///
/// The strategies to try, first match wins.
pub fn author_strategies(family: SourceFamily) -> &'static [Strategy] {
    match family {
        SourceFamily::Primary => PRIMARY_AUTHOR,
        SourceFamily::Secondary => SECONDARY_AUTHOR,
    }
}

/// The published-date lookup order for a source family.
///
/// # Returns
///
/// The strategies to try, first parseable date wins.
pub fn date_strategies(family: SourceFamily) -> &'static [Strategy] {
    match family {
        SourceFamily::Primary => PRIMARY_DATE,
        SourceFamily::Secondary => SECONDARY_DATE,
    }
}

/// The optional fields resolved from an article page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    pub author: Option<String>,
    pub published_date: Option<DateTime<Utc>>,
}

/// Resolve author and publish date from a fetched article page.
///
/// # Arguments
///
/// * `document` - The parsed article page
/// * `family` - Selects which strategy tables are used
///
/// # Returns
///
/// The resolved fields. Either may be `None`; a page with neither is still
/// a valid article.
pub fn extract_fields(document: &Html, family: SourceFamily) -> ExtractedFields {
    let fields = ExtractedFields {
        author: resolve_author(document, family),
        published_date: resolve_published_date(document, family),
    };
    debug!(author = ?fields.author, published_date = ?fields.published_date, "Extracted article fields");
    fields
}

/// Find the article's author.
///
/// Strategies run in order: CSS selectors, then `<meta>` tags, then JSON-LD
/// blocks. Selector text equal to a placeholder in
/// [`REJECTED_AUTHOR_VALUES`] is skipped.
///
/// # Arguments
///
/// * `document` - The parsed article page
/// * `family` - Selects the strategy table
///
/// # Returns
///
/// The first accepted author name, trimmed, or `None`.
pub fn resolve_author(document: &Html, family: SourceFamily) -> Option<String> {
    author_strategies(family)
        .iter()
        .find_map(|strategy| author_by(document, *strategy))
}

/// Find the article's publish date.
///
/// A `datetime` attribute is preferred over element text. Values go
/// through [`crate::dates::parse_fuzzy`]; a strategy whose value does not
/// parse falls through to the next one.
///
/// # Arguments
///
/// * `document` - The parsed article page
/// * `family` - Selects the strategy table
///
/// # Returns
///
/// The first date that parses, in UTC, or `None`.
pub fn resolve_published_date(document: &Html, family: SourceFamily) -> Option<DateTime<Utc>> {
    date_strategies(family)
        .iter()
        .find_map(|strategy| published_date_by(document, *strategy))
}

fn author_by(document: &Html, strategy: Strategy) -> Option<String> {
    let author = match strategy {
        Css(css) => first_match(document, css)
            .map(element_text)
            .filter(|text| is_accepted_author(text)),
        Meta(keys) => meta_content(document, keys)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty()),
        StructuredData => structured_data(document).find_map(|block| author_from_block(&block)),
    };
    if author.is_some() {
        trace!(?strategy, "Author resolved");
    }
    author
}

fn published_date_by(document: &Html, strategy: Strategy) -> Option<DateTime<Utc>> {
    let date = match strategy {
        Css(css) => {
            let element = first_match(document, css)?;
            let raw = element
                .value()
                .attr("datetime")
                .filter(|value| !value.trim().is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| element_text(element));
            parse_candidate(&raw)
        }
        Meta(keys) => parse_candidate(&meta_content(document, keys)?),
        StructuredData => structured_data(document).find_map(|block| published_date_from_block(&block)),
    };
    if date.is_some() {
        trace!(?strategy, "Published date resolved");
    }
    date
}

fn parse_candidate(raw: &str) -> Option<DateTime<Utc>> {
    let cleaned = collapse_whitespace(raw);
    if cleaned.is_empty() {
        return None;
    }
    let parsed = parse_fuzzy(&cleaned);
    if parsed.is_none() {
        trace!(candidate = %cleaned, "Unparsable date candidate");
    }
    parsed
}

fn is_accepted_author(text: &str) -> bool {
    let lower = text.to_lowercase();
    !REJECTED_AUTHOR_VALUES.contains(&lower.as_str())
}

fn first_match<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

/// `content` of the first present `<meta>` among `keys`.
///
/// Only the first tag found is consulted, even if its content is empty.
fn meta_content(document: &Html, keys: &[MetaKey]) -> Option<String> {
    keys.iter().find_map(|key| {
        let css = match key {
            MetaKey::Name(name) => format!(r#"meta[name="{name}"]"#),
            MetaKey::Property(property) => format!(r#"meta[property="{property}"]"#),
        };
        first_match(document, &css)
            .map(|meta| meta.value().attr("content").unwrap_or_default().to_string())
    })
}

/// JSON-LD blocks that parse as JSON objects, in document order.
fn structured_data(document: &Html) -> impl Iterator<Item = Map<String, Value>> + '_ {
    document.select(&JSON_LD_SELECTOR).filter_map(|script| {
        let raw = script.text().collect::<String>();
        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(Value::Object(block)) => Some(block),
            Ok(_) => None,
            Err(e) => {
                trace!(error = %e, "Skipping malformed JSON-LD block");
                None
            }
        }
    })
}

fn author_from_block(block: &Map<String, Value>) -> Option<String> {
    let value = match block.get("author") {
        Some(author) => author,
        None => block.get("creator")?,
    };
    person_name(value)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

/// A name from a JSON-LD person-ish value: a string, a `{ "name": ... }`
/// object, or the first entry of an array of either.
fn person_name(value: &Value) -> Option<&str> {
    match value {
        Value::String(name) => Some(name.as_str()),
        Value::Object(person) => person.get("name")?.as_str(),
        Value::Array(people) => person_name(people.first()?),
        _ => None,
    }
}

fn published_date_from_block(block: &Map<String, Value>) -> Option<DateTime<Utc>> {
    let raw = ["datePublished", "publishedDate"]
        .iter()
        .filter_map(|key| block.get(*key)?.as_str())
        .find(|value| !value.is_empty())?;
    parse_candidate(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> Html {
        Html::parse_document(&format!("<html><head></head><body>{body}</body></html>"))
    }

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_json_ld_author_object() {
        let document = doc(r#"<script type="application/ld+json">{"author": {"name": "Jane Doe"}}</script>"#);
        assert_eq!(
            resolve_author(&document, SourceFamily::Secondary),
            Some("Jane Doe".to_string())
        );
        assert_eq!(
            resolve_author(&document, SourceFamily::Primary),
            Some("Jane Doe".to_string())
        );
    }

    #[test]
    fn test_rejected_selector_value_falls_through_to_none() {
        let document = doc(r#"<span class="author">Unknown</span>"#);
        assert_eq!(resolve_author(&document, SourceFamily::Primary), None);
        assert_eq!(resolve_author(&document, SourceFamily::Secondary), None);
    }

    #[test]
    fn test_rejected_selector_value_falls_through_to_meta() {
        let document = Html::parse_document(
            r#"<html><head><meta name="author" content="  Sergiu Gatlan "></head>
               <body><div class="byline">By</div></body></html>"#,
        );
        assert_eq!(
            resolve_author(&document, SourceFamily::Primary),
            Some("Sergiu Gatlan".to_string())
        );
    }

    #[test]
    fn test_selector_order_is_family_specific() {
        let document = doc(
            r#"<div class="author"><a href="/author/lawrence">Lawrence Abrams</a></div>
               <span class="author-name">Newsletter Desk</span>"#,
        );
        assert_eq!(
            resolve_author(&document, SourceFamily::Primary),
            Some("Lawrence Abrams".to_string())
        );
        assert_eq!(
            resolve_author(&document, SourceFamily::Secondary),
            Some("Newsletter Desk".to_string())
        );
    }

    #[test]
    fn test_only_first_match_per_selector_is_considered() {
        // `.byline a` yields the placeholder and is rejected; `.byline` then
        // yields the whole line.
        let document = doc(r#"<p class="byline"><a>author</a> Ionut Ilascu</p>"#);
        assert_eq!(
            resolve_author(&document, SourceFamily::Secondary),
            Some("author Ionut Ilascu".to_string())
        );
    }

    #[test]
    fn test_empty_meta_author_falls_through_to_json_ld() {
        let document = Html::parse_document(
            r#"<html><head><meta name="author" content="   ">
               <script type="application/ld+json">{"creator": "Brew Staff"}</script></head><body></body></html>"#,
        );
        assert_eq!(
            resolve_author(&document, SourceFamily::Secondary),
            Some("Brew Staff".to_string())
        );
    }

    #[test]
    fn test_malformed_json_ld_is_skipped() {
        let document = doc(
            r#"<script type="application/ld+json">{"author": </script>
               <script type="application/ld+json">["not", "an", "object"]</script>
               <script type="application/ld+json">{"@type": "NewsArticle"}</script>
               <script type="application/ld+json">{"author": [{"name": "Kevin Hughes"}, {"name": "Eric Schwartz"}]}</script>"#,
        );
        assert_eq!(
            resolve_author(&document, SourceFamily::Secondary),
            Some("Kevin Hughes".to_string())
        );
    }

    #[test]
    fn test_author_present_but_empty_does_not_check_creator() {
        let document = doc(
            r#"<script type="application/ld+json">{"author": {"name": ""}, "creator": "Ignored"}</script>
               <script type="application/ld+json">{"author": "Second Block"}</script>"#,
        );
        assert_eq!(
            resolve_author(&document, SourceFamily::Primary),
            Some("Second Block".to_string())
        );
    }

    #[test]
    fn test_datetime_attribute_wins_over_text() {
        let document = doc(
            r#"<time datetime="2024-01-05T10:00:00Z">
                   Jan   6,
                   2024   </time>"#,
        );
        assert_eq!(
            resolve_published_date(&document, SourceFamily::Primary),
            Some(utc("2024-01-05T10:00:00Z"))
        );
    }

    #[test]
    fn test_time_text_used_without_datetime() {
        let document = doc("<time>\n  March 05, 2024\n  10:15 AM </time>");
        assert_eq!(
            resolve_published_date(&document, SourceFamily::Secondary),
            Some(utc("2024-03-05T10:15:00Z"))
        );
    }

    #[test]
    fn test_unparsable_selectors_fall_back_to_meta() {
        let document = Html::parse_document(
            r#"<html><head><meta property="article:published_time" content="2024-02-01T08:00:00+00:00"></head>
               <body><time>not a date</time><span class="date">soon</span></body></html>"#,
        );
        assert_eq!(
            resolve_published_date(&document, SourceFamily::Primary),
            Some(utc("2024-02-01T08:00:00Z"))
        );
    }

    #[test]
    fn test_meta_priority_uses_first_present_tag() {
        let document = Html::parse_document(
            r#"<html><head><meta name="date" content="2023-12-24">
               <meta name="published_date" content="2024-01-02"></head><body></body></html>"#,
        );
        assert_eq!(
            resolve_published_date(&document, SourceFamily::Secondary),
            Some(utc("2024-01-02T00:00:00Z"))
        );
    }

    #[test]
    fn test_unparsable_everywhere_falls_back_to_json_ld() {
        let document = Html::parse_document(
            r#"<html><head><meta name="date" content="TBD">
               <script type="application/ld+json">{"datePublished": "sometime"}</script>
               <script type="application/ld+json">{"publishedDate": "2024-01-05"}</script></head>
               <body><time>whenever</time><div class="post-date">n/a</div></body></html>"#,
        );
        assert_eq!(
            resolve_published_date(&document, SourceFamily::Primary),
            Some(utc("2024-01-05T00:00:00Z"))
        );
    }

    #[test]
    fn test_unparsable_everywhere_is_none() {
        let document = Html::parse_document(
            r#"<html><head><meta name="date" content="TBD">
               <script type="application/ld+json">{"datePublished": "sometime"}</script></head>
               <body><time>whenever</time><div class="post-date">n/a</div><p class="entry-date">later</p></body></html>"#,
        );
        assert_eq!(resolve_published_date(&document, SourceFamily::Primary), None);
        assert_eq!(resolve_published_date(&document, SourceFamily::Secondary), None);
    }

    #[test]
    fn test_primary_only_selectors() {
        let document = doc(r#"<span class="entry-date">January 9, 2024</span>"#);
        assert_eq!(
            resolve_published_date(&document, SourceFamily::Primary),
            Some(utc("2024-01-09T00:00:00Z"))
        );
        assert_eq!(resolve_published_date(&document, SourceFamily::Secondary), None);
    }

    #[test]
    fn test_extract_fields_on_empty_document() {
        let document = Html::parse_document("");
        assert_eq!(
            extract_fields(&document, SourceFamily::Primary),
            ExtractedFields::default()
        );
    }

    #[test]
    fn test_extract_fields_on_garbage() {
        let document = Html::parse_document("<<<>>><script type=\"application/ld+json\">}}}</script><time datetime=\"\"></time>");
        let fields = extract_fields(&document, SourceFamily::Secondary);
        assert_eq!(fields.author, None);
        assert_eq!(fields.published_date, None);
    }

    #[test]
    fn test_strategy_tables_end_with_fallbacks() {
        for family in [SourceFamily::Primary, SourceFamily::Secondary] {
            let authors = author_strategies(family);
            assert_eq!(
                authors[authors.len() - 2],
                Strategy::Meta(&[MetaKey::Name("author")])
            );
            assert_eq!(authors[authors.len() - 1], Strategy::StructuredData);
            let dates = date_strategies(family);
            assert_eq!(dates[dates.len() - 2], Strategy::Meta(DATE_META));
            assert_eq!(dates[dates.len() - 1], Strategy::StructuredData);
        }
        assert_eq!(author_strategies(SourceFamily::Primary).len(), 12);
        assert_eq!(author_strategies(SourceFamily::Secondary).len(), 8);
        assert_eq!(date_strategies(SourceFamily::Primary).len(), 10);
        assert_eq!(date_strategies(SourceFamily::Secondary).len(), 8);
    }
}

//! Link classification for listing pages.
//!
//! Decides which anchors on a listing page are real articles as opposed to
//! navigation and marketing chrome. Each source profile lists selector
//! patterns from most to least specific; the first pattern with any match
//! wins outright and results from different patterns are never merged.

use crate::models::ArticleLink;
use crate::scrapers::SourceProfile;
use crate::utils::element_text;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// Headlines shorter than this (in characters) are treated as chrome.
pub const MIN_TITLE_CHARS: usize = 10;

/// Phrases that mark a link as navigation or marketing, matched case-insensitively.
pub const REJECTED_TITLE_PHRASES: &[&str] = &[
    "read more",
    "register",
    "subscribe",
    "login",
    "sign up",
    "contact",
    "about",
    "privacy",
    "terms",
];

/// Substrings that disqualify an href, matched case-insensitively.
pub const REJECTED_HREF_PATTERNS: &[&str] = &["#", "javascript:", "mailto:", "tel:"];

/// Whether anchor text reads like a headline.
///
/// # Arguments
///
/// * `title` - The collapsed anchor text
///
/// # Returns
///
/// `true` if the trimmed title has at least [`MIN_TITLE_CHARS`] characters
/// and contains none of [`REJECTED_TITLE_PHRASES`].
pub fn is_valid_article_title(title: &str) -> bool {
    let title = title.trim();
    if title.chars().count() < MIN_TITLE_CHARS {
        return false;
    }
    let lower = title.to_lowercase();
    !REJECTED_TITLE_PHRASES
        .iter()
        .any(|phrase| lower.contains(phrase))
}

/// Whether an anchor should be followed as an article.
///
/// # Arguments
///
/// * `href` - The raw `href` attribute, before resolution
/// * `title` - The collapsed anchor text
///
/// # Returns
///
/// `false` for an empty href or title, or an href containing any of
/// [`REJECTED_HREF_PATTERNS`]; otherwise [`is_valid_article_title`].
pub fn is_valid_article_link(href: &str, title: &str) -> bool {
    if href.is_empty() || title.is_empty() {
        return false;
    }
    let href = href.to_lowercase();
    if REJECTED_HREF_PATTERNS
        .iter()
        .any(|pattern| href.contains(pattern))
    {
        return false;
    }
    is_valid_article_title(title)
}

/// Pick up to `limit` article links off a listing page.
///
/// The profile's link patterns are tried in order and the first one that
/// matches anything wins. Only when none match is the broad fallback used,
/// and its anchors are filtered with [`is_valid_article_link`].
///
/// # Arguments
///
/// * `document` - The parsed listing page
/// * `profile` - The source's patterns and base URL
/// * `limit` - Maximum number of links to return
///
/// # Returns
///
/// Links in document order, hrefs left as written. Empty if nothing matched.
pub fn classify(document: &Html, profile: &SourceProfile, limit: usize) -> Vec<ArticleLink> {
    for pattern in profile.link_patterns {
        let Some(selector) = parse_selector(pattern) else {
            continue;
        };
        let found: Vec<ElementRef<'_>> = document.select(&selector).collect();
        if !found.is_empty() {
            debug!(pattern, matches = found.len(), "Listing pattern matched");
            return found.into_iter().take(limit).map(to_link).collect();
        }
    }

    let Some(pattern) = profile.broad_fallback else {
        debug!(source = %profile.source, "No listing pattern matched");
        return Vec::new();
    };
    let Some(selector) = parse_selector(pattern) else {
        return Vec::new();
    };

    let links: Vec<ArticleLink> = document
        .select(&selector)
        .map(to_link)
        .filter(|link| is_valid_article_link(link.href.as_deref().unwrap_or(""), &link.title))
        .take(limit)
        .collect();
    debug!(pattern, kept = links.len(), "Broad fallback applied");
    links
}

fn to_link(anchor: ElementRef<'_>) -> ArticleLink {
    ArticleLink {
        title: element_text(anchor),
        href: anchor.value().attr("href").map(str::to_string),
    }
}

fn parse_selector(pattern: &str) -> Option<Selector> {
    match Selector::parse(pattern) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!(pattern, error = %e, "Invalid listing selector");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;
    use crate::scrapers::profile;

    #[test]
    fn test_title_too_short() {
        assert!(!is_valid_article_title("Security"));
        assert!(!is_valid_article_title("   123456789   "));
        assert!(is_valid_article_title("1234567890"));
    }

    #[test]
    fn test_title_rejected_phrases() {
        assert!(!is_valid_article_title("Subscribe to our newsletter today"));
        assert!(!is_valid_article_title("READ MORE about this story"));
        assert!(!is_valid_article_title("Our privacy policy has changed"));
        assert!(is_valid_article_title("Hackers breach airline loyalty program"));
    }

    #[test]
    fn test_subscribe_link_rejected_with_valid_href() {
        assert!(!is_valid_article_link(
            "/stories/2024/01/05/newsletter",
            "Subscribe to our newsletter today"
        ));
    }

    #[test]
    fn test_javascript_href_rejected() {
        assert!(!is_valid_article_link(
            "javascript:void(0)",
            "Hackers breach airline loyalty program"
        ));
        assert!(!is_valid_article_link(
            "JavaScript:openModal()",
            "Hackers breach airline loyalty program"
        ));
    }

    #[test]
    fn test_other_rejected_hrefs() {
        let title = "Hackers breach airline loyalty program";
        assert!(!is_valid_article_link("", title));
        assert!(!is_valid_article_link("/stories/x", ""));
        assert!(!is_valid_article_link("/stories/x#top", title));
        assert!(!is_valid_article_link("mailto:tips@itbrew.com", title));
        assert!(!is_valid_article_link("tel:+15555550100", title));
        assert!(is_valid_article_link("/stories/x", title));
    }

    #[test]
    fn test_first_matching_pattern_wins_without_merging() {
        // `a[href*="/stories/"]` matches once; the three `h3 a` links further
        // down the pattern list must not top the result up.
        let document = Html::parse_document(
            r#"
            <a href="/stories/one">Only story link on the page</a>
            <h3><a href="/x/1">Heading link number one</a></h3>
            <h3><a href="/x/2">Heading link number two</a></h3>
            <h3><a href="/x/3">Heading link number three</a></h3>
            "#,
        );
        let links = classify(&document, profile(Source::MorningBrew), 5);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href.as_deref(), Some("/stories/one"));
    }

    #[test]
    fn test_truncates_to_limit() {
        let anchors: String = (0..8)
            .map(|i| format!(r#"<a href="/stories/{i}">Story number {i} of the day</a>"#))
            .collect();
        let document = Html::parse_document(&anchors);
        let links = classify(&document, profile(Source::MorningBrew), 5);
        assert_eq!(links.len(), 5);
        assert_eq!(links[4].href.as_deref(), Some("/stories/4"));
    }

    #[test]
    fn test_pattern_matches_are_not_screened() {
        // Only the broad fallback applies the heuristics.
        let document = Html::parse_document(r#"<h2><a href="/about">About</a></h2>"#);
        let links = classify(&document, profile(Source::MorningBrew), 5);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].title, "About");
    }

    #[test]
    fn test_missing_href_is_kept_for_pattern_matches() {
        let document = Html::parse_document(r#"<h3><a>Headline without a link target</a></h3>"#);
        let links = classify(&document, profile(Source::MorningBrew), 5);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, None);
    }

    #[test]
    fn test_no_match_without_fallback() {
        let document = Html::parse_document("<p>No links here</p>");
        assert!(classify(&document, profile(Source::BleepingComputer), 5).is_empty());
        assert!(classify(&document, profile(Source::ItBrew), 5).is_empty());
    }
}

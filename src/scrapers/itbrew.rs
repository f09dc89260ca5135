//! IT Brew listing profile.
//!
//! The weakest-signal source: headings inside `<article>` when present, then
//! URL-shape patterns, then every anchor inside an article card that passes
//! the title/href heuristics. Candidate titles are screened again during the
//! harvest because the pattern matches here tend to include "Read more" and
//! similar chrome.

use super::SourceProfile;
use crate::models::Source;

pub const PROFILE: SourceProfile = SourceProfile {
    source: Source::ItBrew,
    listing_url: "https://www.itbrew.com/",
    link_patterns: &[
        "article h2 a",
        "article h3 a",
        "article .entry-title a",
        "article .post-title a",
        "article .title a",
        r#"article a[href*="/202"]"#,
        r#"article a[href*="/article"]"#,
        r#"article a[href*="/post"]"#,
    ],
    broad_fallback: Some(r#"article a[href*="/"]"#),
    screen_titles: true,
};

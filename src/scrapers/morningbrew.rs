//! Morning Brew listing profile.
//!
//! Stories live under `/stories/`; the heading-based patterns cover older
//! layouts of the `/daily` page.

use super::SourceProfile;
use crate::models::Source;

pub const PROFILE: SourceProfile = SourceProfile {
    source: Source::MorningBrew,
    listing_url: "https://www.morningbrew.com/daily",
    link_patterns: &[
        r#"a[href*="/stories/"]"#,
        r#"article a[href*="/stories/"]"#,
        "h2 a",
        "h3 a",
        "article h2 a",
        "article h3 a",
        "article .entry-title a",
        "article .post-title a",
        "article .title a",
    ],
    broad_fallback: None,
    screen_titles: false,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use scraper::Html;

    #[test]
    fn test_story_links_win_over_headings() {
        let document = Html::parse_document(
            r#"
            <h2><a href="/about">About Morning Brew</a></h2>
            <div class="card"><a href="/stories/2024/01/05/fed-holds-rates">Fed holds rates steady again</a></div>
            "#,
        );
        let links = classify(&document, &PROFILE, 5);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].title, "Fed holds rates steady again");
    }

    #[test]
    fn test_falls_back_to_headings() {
        let document = Html::parse_document(
            r#"
            <h3><a href="/daily/issues/latest">Today's issue: chips and tariffs</a></h3>
            <h3><a href="/daily/issues/yesterday">Yesterday: a quiet market</a></h3>
            "#,
        );
        let links = classify(&document, &PROFILE, 5);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].href.as_deref(), Some("/daily/issues/latest"));
    }
}

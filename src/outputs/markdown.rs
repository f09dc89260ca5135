//! Markdown rendering of a [`Listing`].

use super::Listing;
use crate::models::Article;

/// Render the listing as a Markdown page.
///
/// # Output Structure
///
/// ```text
/// # Harvested Articles
///
/// _3 articles, generated 2024-01-06 12:00 UTC_
///
/// | Source | Articles |
/// |--------|----------|
/// | BleepingComputer | 1 |
///
/// ## Latest
///
/// - [Title](link): IT Brew, by Brew Staff, 2024-01-05
/// ```
pub fn render(listing: &Listing) -> String {
    let mut md = String::from("# Harvested Articles\n\n");
    md.push_str(&format!(
        "_{} {}, generated {}_\n\n",
        listing.total,
        if listing.total == 1 { "article" } else { "articles" },
        listing.generated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    md.push_str("| Source | Articles |\n|--------|----------|\n");
    for entry in &listing.per_source {
        md.push_str(&format!("| {} | {} |\n", entry.source, entry.count));
    }

    md.push_str("\n## Latest\n\n");
    if listing.articles.is_empty() {
        md.push_str("_Nothing harvested yet._\n");
    }
    for article in &listing.articles {
        md.push_str(&article_line(article));
        md.push('\n');
    }
    md
}

fn article_line(article: &Article) -> String {
    let mut line = format!(
        "- [{}]({}): {}",
        escape_link_text(&article.title),
        article.link,
        article.source
    );
    if let Some(author) = &article.author {
        line.push_str(&format!(", by {author}"));
    }
    if let Some(date) = article.published_date {
        line.push_str(&format!(", {}", date.format("%Y-%m-%d")));
    }
    line
}

fn escape_link_text(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}

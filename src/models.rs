//! Data models for harvested articles and the sources they come from.
//!
//! - [`Source`]: the three fixed sites this tool knows how to harvest
//! - [`SourceFamily`]: which extraction table a source's article pages use
//! - [`NewArticle`] / [`Article`]: the insert payload and the stored record
//! - [`ArticleLink`]: a candidate anchor picked off a listing page

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the fixed origin websites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    BleepingComputer,
    MorningBrew,
    ItBrew,
}

impl Source {
    /// Every source, in harvest order.
    pub const ALL: [Source; 3] = [Source::BleepingComputer, Source::MorningBrew, Source::ItBrew];

    /// The name persisted in [`Article::source`] and shown to readers.
    pub fn display_name(self) -> &'static str {
        match self {
            Source::BleepingComputer => "BleepingComputer",
            Source::MorningBrew => "Morning Brew",
            Source::ItBrew => "IT Brew",
        }
    }

    /// The shorthand accepted on the command line.
    pub fn cli_name(self) -> &'static str {
        match self {
            Source::BleepingComputer => "bleepingcomputer",
            Source::MorningBrew => "morningbrew",
            Source::ItBrew => "itbrew",
        }
    }

    /// Selects the author/date strategy table for this source's article pages.
    pub fn family(self) -> SourceFamily {
        match self {
            Source::BleepingComputer => SourceFamily::Primary,
            Source::MorningBrew | Source::ItBrew => SourceFamily::Secondary,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Sites sharing the same article-page markup conventions.
///
/// BleepingComputer gets the richer selector tables; the two Brew
/// newsletters share a shorter one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFamily {
    Primary,
    Secondary,
}

/// Which sources a harvest run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSelection {
    One(Source),
    All,
}

impl SourceSelection {
    pub fn sources(self) -> Vec<Source> {
        match self {
            SourceSelection::One(source) => vec![source],
            SourceSelection::All => Source::ALL.to_vec(),
        }
    }
}

/// An article ready to be inserted into a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewArticle {
    pub title: String,
    pub author: Option<String>,
    pub link: String,
    pub published_date: Option<DateTime<Utc>>,
    pub source: String,
}

/// A stored article.
///
/// `id` is the store's insertion sequence; newer articles have larger ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: u64,
    pub title: String,
    pub author: Option<String>,
    pub link: String,
    pub published_date: Option<DateTime<Utc>>,
    pub source: String,
}

impl Article {
    pub fn from_new(id: u64, new: NewArticle) -> Self {
        Self {
            id,
            title: new.title,
            author: new.author,
            link: new.link,
            published_date: new.published_date,
            source: new.source,
        }
    }
}

/// An anchor the link classifier accepted as a likely article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleLink {
    /// Anchor text with whitespace collapsed.
    pub title: String,
    /// Raw `href` attribute, if the anchor had one.
    pub href: Option<String>,
}

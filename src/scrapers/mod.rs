//! Per-source harvesting: listing profiles, page fetching and the harvest loop.
//!
//! Each source module exports a [`SourceProfile`] describing where its
//! listing page lives and which anchors on it are articles. The harvest loop
//! in [`harvest`] is shared by all of them.
//!
//! # Supported Sources
//!
//! | Source | Module | Listing page | Field family |
//! |--------|--------|--------------|--------------|
//! | BleepingComputer | [`bleepingcomputer`] | homepage "latest news" column | Primary |
//! | Morning Brew | [`morningbrew`] | `/daily` | Secondary |
//! | IT Brew | [`itbrew`] | homepage, with a broad fallback | Secondary |

use crate::models::Source;
use tracing::warn;
use url::Url;

pub mod bleepingcomputer;
pub mod fetch;
pub mod harvest;
pub mod itbrew;
pub mod morningbrew;

/// Where a source publishes its listing and how to pick articles out of it.
#[derive(Debug)]
pub struct SourceProfile {
    pub source: Source,
    pub listing_url: &'static str,
    /// Selectors tried in order; the first one with any match wins.
    pub link_patterns: &'static [&'static str],
    /// Selector whose anchors are filtered through the link heuristics when
    /// none of `link_patterns` match.
    pub broad_fallback: Option<&'static str>,
    /// Drop candidates whose text doesn't look like a headline.
    pub screen_titles: bool,
}

impl SourceProfile {
    /// Scheme and host of the listing page, e.g. `https://www.itbrew.com`.
    pub fn base_origin(&self) -> String {
        match Url::parse(self.listing_url) {
            Ok(url) => url.origin().ascii_serialization(),
            Err(_) => self.listing_url.trim_end_matches('/').to_string(),
        }
    }

    /// Turn a listing `href` into an absolute article URL.
    ///
    /// Anything already starting with `http` is used verbatim; everything
    /// else is resolved against the listing page.
    pub fn resolve_link(&self, href: &str) -> String {
        if href.starts_with("http") {
            return href.to_string();
        }
        match Url::parse(self.listing_url).and_then(|base| base.join(href)) {
            Ok(resolved) => resolved.to_string(),
            Err(e) => {
                warn!(href, error = %e, "Could not resolve link; prefixing origin");
                format!("{}{}", self.base_origin(), href)
            }
        }
    }
}

/// Look up the static profile for a source.
///
/// # Returns
///
/// The listing URL, link patterns and fallback for `source`.
pub fn profile(source: Source) -> &'static SourceProfile {
    match source {
        Source::BleepingComputer => &bleepingcomputer::PROFILE,
        Source::MorningBrew => &morningbrew::PROFILE,
        Source::ItBrew => &itbrew::PROFILE,
    }
}

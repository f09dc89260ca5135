//! BleepingComputer listing profile.
//!
//! The homepage carries a "latest news" column whose headlines sit in
//! `h4 > a` inside `.bc_latest_news_text`. There is only one pattern; if the
//! markup changes the run simply finds nothing.

use super::SourceProfile;
use crate::models::Source;

pub const PROFILE: SourceProfile = SourceProfile {
    source: Source::BleepingComputer,
    listing_url: "https://www.bleepingcomputer.com/",
    link_patterns: &[".bc_latest_news .bc_latest_news_text h4 a"],
    broad_fallback: None,
    screen_titles: false,
};

//! The harvest loop shared by every source.
//!
//! A run for one source is strictly sequential:
//!
//! 1. fetch the listing page
//! 2. classify its anchors and keep up to [`ARTICLES_PER_RUN`]
//! 3. for each candidate: resolve the link, fetch the article page, extract
//!    author and date, insert unless the title is already stored
//!
//! Failures are scoped. A listing that cannot be fetched ends that source's
//! run and is recorded in its [`HarvestReport`]; other sources still run. A
//! candidate that fails for any reason is logged and counted, and the loop
//! moves on to the next one.

use super::fetch::Fetcher;
use super::{SourceProfile, profile};
use crate::classify::{classify, is_valid_article_title};
use crate::error::{CandidateError, FetchError, StoreError};
use crate::extract::extract_fields;
use crate::models::{Article, ArticleLink, NewArticle, Source, SourceSelection};
use crate::store::ArticleStore;
use crate::utils::truncate_for_log;
use scraper::Html;
use std::fmt;
use tracing::{debug, error, info, instrument, warn};

/// Candidates taken from a listing page per run.
pub const ARTICLES_PER_RUN: usize = 5;

/// What happened during one source's run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestReport {
    pub source: Source,
    /// Links the classifier handed over (at most the run limit).
    pub candidates: usize,
    pub saved: usize,
    /// Already stored under the same title.
    pub duplicates: usize,
    /// Article page answered with a non-2xx status.
    pub skipped: usize,
    /// Dropped before fetching: no anchor text, or (IT Brew) not a headline.
    pub screened: usize,
    pub failed: usize,
    /// Set when the listing page itself could not be fetched.
    pub listing_error: Option<String>,
}

impl HarvestReport {
    fn new(source: Source) -> Self {
        Self {
            source,
            candidates: 0,
            saved: 0,
            duplicates: 0,
            skipped: 0,
            screened: 0,
            failed: 0,
            listing_error: None,
        }
    }
}

impl fmt::Display for HarvestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(err) = &self.listing_error {
            return write!(f, "{}: listing unavailable ({err})", self.source);
        }
        write!(
            f,
            "Successfully fetched {} new articles from {}",
            self.saved, self.source
        )?;
        let mut notes = Vec::new();
        if self.duplicates > 0 {
            notes.push(format!("{} already stored", self.duplicates));
        }
        if self.skipped > 0 {
            notes.push(format!("{} skipped", self.skipped));
        }
        if self.screened > 0 {
            notes.push(format!("{} screened out", self.screened));
        }
        if self.failed > 0 {
            notes.push(format!("{} failed", self.failed));
        }
        if !notes.is_empty() {
            write!(f, " ({})", notes.join(", "))?;
        }
        Ok(())
    }
}

/// Result of a destructive refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSummary {
    pub deleted: usize,
    pub reports: Vec<HarvestReport>,
    pub total: usize,
    /// Stored articles per source after the re-harvest, in harvest order.
    pub per_source: Vec<(Source, usize)>,
}

#[derive(Debug)]
enum CandidateOutcome {
    Saved(Article),
    Duplicate,
    Skipped { status: u16 },
    ScreenedOut,
}

/// Harvest one source.
///
/// Never fails: listing problems are recorded in the report and candidate
/// problems are counted.
///
/// # Arguments
///
/// * `fetcher` - Used for the listing page and every article page
/// * `store` - Checked for existing titles and written to
/// * `source` - Which site to harvest
/// * `limit` - Maximum number of candidates to process
#[instrument(level = "info", skip_all, fields(source = %source))]
pub async fn harvest_source<F, S>(
    fetcher: &F,
    store: &mut S,
    source: Source,
    limit: usize,
) -> HarvestReport
where
    F: Fetcher,
    S: ArticleStore,
{
    let profile = profile(source);
    let mut report = HarvestReport::new(source);

    let listing = match fetch_listing(fetcher, profile).await {
        Ok(body) => body,
        Err(e) => {
            error!(url = profile.listing_url, error = %e, "Listing fetch failed; skipping source");
            report.listing_error = Some(e.to_string());
            return report;
        }
    };

    // Html is not Send; keep it out of the await points below.
    let candidates = {
        let document = Html::parse_document(&listing);
        classify(&document, profile, limit)
    };
    report.candidates = candidates.len();
    info!(candidates = report.candidates, "Classified listing page");

    for link in candidates {
        let title = truncate_for_log(&link.title, 80);
        match process_candidate(fetcher, store, profile, link).await {
            Ok(CandidateOutcome::Saved(article)) => {
                report.saved += 1;
                debug!(id = article.id, %title, author = ?article.author, "Saved article");
            }
            Ok(CandidateOutcome::Duplicate) => {
                report.duplicates += 1;
                debug!(%title, "Already stored");
            }
            Ok(CandidateOutcome::Skipped { status }) => {
                report.skipped += 1;
                debug!(%title, status, "Article page not available");
            }
            Ok(CandidateOutcome::ScreenedOut) => {
                report.screened += 1;
                debug!(%title, "Screened out before fetching");
            }
            Err(e) => {
                report.failed += 1;
                warn!(%title, error = %e, "Candidate failed; continuing");
            }
        }
    }

    info!(
        saved = report.saved,
        duplicates = report.duplicates,
        skipped = report.skipped,
        failed = report.failed,
        "Harvest finished"
    );
    report
}

/// Harvest every selected source, one after the other.
#[instrument(level = "info", skip_all, fields(?selection))]
pub async fn harvest<F, S>(fetcher: &F, store: &mut S, selection: SourceSelection) -> Vec<HarvestReport>
where
    F: Fetcher,
    S: ArticleStore,
{
    let mut reports = Vec::new();
    for source in selection.sources() {
        reports.push(harvest_source(fetcher, store, source, ARTICLES_PER_RUN).await);
    }
    reports
}

/// Clear the store and harvest all sources from scratch.
#[instrument(level = "info", skip_all)]
pub async fn refresh<F, S>(fetcher: &F, store: &mut S) -> Result<RefreshSummary, StoreError>
where
    F: Fetcher,
    S: ArticleStore,
{
    let deleted = store.delete_all().await?;
    info!(deleted, "Deleted existing articles");

    let reports = harvest(fetcher, store, SourceSelection::All).await;

    let total = store.count().await?;
    let mut per_source = Vec::new();
    for source in Source::ALL {
        per_source.push((source, store.count_by_source(source.display_name()).await?));
    }
    info!(total, "Refresh complete");

    Ok(RefreshSummary {
        deleted,
        reports,
        total,
        per_source,
    })
}

async fn fetch_listing<F: Fetcher>(fetcher: &F, profile: &SourceProfile) -> Result<String, FetchError> {
    let page = fetcher.fetch(profile.listing_url).await?;
    if !page.is_success() {
        return Err(FetchError::Status {
            url: profile.listing_url.to_string(),
            status: page.status,
        });
    }
    Ok(page.body)
}

async fn process_candidate<F, S>(
    fetcher: &F,
    store: &mut S,
    profile: &SourceProfile,
    link: ArticleLink,
) -> Result<CandidateOutcome, CandidateError>
where
    F: Fetcher,
    S: ArticleStore,
{
    // The title is the dedupe key; image-only anchors have none.
    if link.title.is_empty() {
        return Ok(CandidateOutcome::ScreenedOut);
    }
    if profile.screen_titles && !is_valid_article_title(&link.title) {
        return Ok(CandidateOutcome::ScreenedOut);
    }

    let href = link.href.ok_or(CandidateError::MissingHref)?;
    let url = profile.resolve_link(&href);

    let page = fetcher.fetch(&url).await?;
    if !page.is_success() {
        return Ok(CandidateOutcome::Skipped {
            status: page.status,
        });
    }

    let fields = {
        let document = Html::parse_document(&page.body);
        extract_fields(&document, profile.source.family())
    };

    if store.exists_by_title(&link.title).await? {
        return Ok(CandidateOutcome::Duplicate);
    }

    let article = store
        .insert(NewArticle {
            title: link.title,
            author: fields.author,
            link: url,
            published_date: fields.published_date,
            source: profile.source.display_name().to_string(),
        })
        .await?;
    Ok(CandidateOutcome::Saved(article))
}

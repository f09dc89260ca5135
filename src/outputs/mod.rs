//! Display of the stored articles.
//!
//! `show` renders a [`Listing`]: every stored article newest first, plus how
//! many articles each source has contributed.
//!
//! # Submodules
//!
//! - [`json`]: the listing as pretty-printed JSON
//! - [`markdown`]: a readable Markdown page with a per-source summary table

use crate::error::StoreError;
use crate::models::{Article, Source};
use crate::store::ArticleStore;
use crate::utils::ensure_parent_dir;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tokio::io::{self, AsyncWriteExt};
use tracing::{info, instrument};

pub mod json;
pub mod markdown;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceCount {
    pub source: String,
    pub count: usize,
}

/// Snapshot of the store for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub per_source: Vec<SourceCount>,
    /// Newest first.
    pub articles: Vec<Article>,
}

impl Listing {
    pub async fn collect<S: ArticleStore>(store: &S) -> Result<Self, StoreError> {
        Self::collect_at(store, Utc::now()).await
    }

    pub async fn collect_at<S: ArticleStore>(
        store: &S,
        generated_at: DateTime<Utc>,
    ) -> Result<Self, StoreError> {
        let mut per_source = Vec::new();
        for source in Source::ALL {
            let name = source.display_name();
            per_source.push(SourceCount {
                source: name.to_string(),
                count: store.count_by_source(name).await?,
            });
        }
        Ok(Self {
            generated_at,
            total: store.count().await?,
            per_source,
            articles: store.list().await?,
        })
    }
}

/// Write rendered output to `path`, or to stdout when there is none.
#[instrument(level = "info", skip_all)]
pub async fn write_output(rendered: &str, path: Option<&Path>) -> Result<(), Box<dyn Error>> {
    match path {
        Some(path) => {
            ensure_parent_dir(path).await?;
            fs::write(path, rendered).await?;
            info!(path = %path.display(), bytes = rendered.len(), "Wrote listing");
        }
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(rendered.as_bytes()).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}

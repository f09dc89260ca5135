//! JSON-file-backed [`ArticleStore`].
//!
//! The whole table lives in memory and is rewritten on every mutation:
//!
//! ```text
//! { "next_id": 4, "articles": [ { "id": 1, "title": ..., ... }, ... ] }
//! ```
//!
//! Writes go to a sibling `*.tmp` file which is then renamed over the store
//! file, so a crash mid-write leaves the previous version intact.

use super::{ArticleStore, ArticleTable};
use crate::error::StoreError;
use crate::models::{Article, NewArticle};
use crate::utils::ensure_parent_dir;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    table: ArticleTable,
}

impl JsonFileStore {
    /// Open the store at `path`, creating its directory if needed.
    ///
    /// A missing file is an empty store; nothing is written until the first
    /// mutation.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let path = path.to_path_buf();
        ensure_parent_dir(&path).await?;
        let table = load_table(&path).await?;
        info!(articles = table.articles.len(), next_id = table.next_id, "Opened article store");
        Ok(Self { path, table })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the table, persist it, then adopt it.
    ///
    /// The in-memory table only changes once the file has been replaced.
    async fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut ArticleTable) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut next = self.table.clone();
        let out = change(&mut next)?;
        self.persist(&next).await?;
        self.table = next;
        Ok(out)
    }

    async fn persist(&self, table: &ArticleTable) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(table)?;
        let tmp = temp_path(&self.path);
        let replaced = match fs::write(&tmp, json).await {
            Ok(()) => fs::rename(&tmp, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = replaced {
            // The previous store file is untouched; only the stray temp file needs removing.
            match fs::remove_file(&tmp).await {
                Err(cleanup) if cleanup.kind() != ErrorKind::NotFound => {
                    warn!(path = %tmp.display(), error = %cleanup, "Could not remove temp store file");
                }
                _ => {}
            }
            return Err(e.into());
        }
        debug!(path = %self.path.display(), articles = table.articles.len(), "Persisted article store");
        Ok(())
    }
}

/// Read a store file without opening it for writing.
///
/// Used for `--dry-run`, which must not touch the filesystem. A missing file
/// reads as an empty table.
pub async fn load_table(path: &Path) -> Result<ArticleTable, StoreError> {
    match fs::read_to_string(path).await {
        Ok(raw) if raw.trim().is_empty() => Ok(ArticleTable::default()),
        Ok(raw) => Ok(serde_json::from_str(&raw)?),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No store file yet; starting empty");
            Ok(ArticleTable::default())
        }
        Err(e) => Err(e.into()),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "articles.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

impl ArticleStore for JsonFileStore {
    async fn exists_by_title(&self, title: &str) -> Result<bool, StoreError> {
        Ok(self.table.contains_title(title))
    }

    #[instrument(level = "debug", skip_all)]
    async fn insert(&mut self, article: NewArticle) -> Result<Article, StoreError> {
        self.commit(|table| table.insert(article)).await
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.table.articles.len())
    }

    async fn count_by_source(&self, source: &str) -> Result<usize, StoreError> {
        Ok(self.table.count_by_source(source))
    }

    #[instrument(level = "info", skip_all)]
    async fn delete_all(&mut self) -> Result<usize, StoreError> {
        let removed = self.commit(|table| Ok(table.clear())).await?;
        info!(removed, "Cleared article store");
        Ok(removed)
    }

    async fn list(&self) -> Result<Vec<Article>, StoreError> {
        Ok(self.table.newest_first())
    }
}

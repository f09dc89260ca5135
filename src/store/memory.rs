//! In-memory [`ArticleStore`], used by tests and `--dry-run`.

use super::{ArticleStore, ArticleTable};
use crate::error::StoreError;
use crate::models::{Article, NewArticle};

#[derive(Debug, Default)]
pub struct MemoryStore {
    table: ArticleTable,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing table, e.g. a snapshot of the store file.
    pub fn from_table(table: ArticleTable) -> Self {
        Self { table }
    }
}

impl ArticleStore for MemoryStore {
    async fn exists_by_title(&self, title: &str) -> Result<bool, StoreError> {
        Ok(self.table.contains_title(title))
    }

    async fn insert(&mut self, article: NewArticle) -> Result<Article, StoreError> {
        self.table.insert(article)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.table.articles.len())
    }

    async fn count_by_source(&self, source: &str) -> Result<usize, StoreError> {
        Ok(self.table.count_by_source(source))
    }

    async fn delete_all(&mut self) -> Result<usize, StoreError> {
        Ok(self.table.clear())
    }

    async fn list(&self) -> Result<Vec<Article>, StoreError> {
        Ok(self.table.newest_first())
    }
}

//! Article persistence.
//!
//! The harvester talks to storage only through [`ArticleStore`]. Two
//! implementations exist: [`JsonFileStore`] keeps the table in a JSON file and
//! is what the CLI uses; [`MemoryStore`] keeps it in memory for tests and
//! `--dry-run`. Both share [`ArticleTable`] for the actual bookkeeping so their
//! semantics cannot drift apart.
//!
//! Titles are unique across the whole table. The harvester checks
//! [`ArticleStore::exists_by_title`] before inserting, and `insert` refuses a
//! duplicate anyway.

use crate::error::StoreError;
use crate::models::{Article, NewArticle};
use serde::{Deserialize, Serialize};

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Storage operations the harvester and the display need.
pub trait ArticleStore {
    async fn exists_by_title(&self, title: &str) -> Result<bool, StoreError>;

    /// Store a new article, assigning the next id.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateTitle`] if an article with the same title is
    /// already stored.
    async fn insert(&mut self, article: NewArticle) -> Result<Article, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;

    /// Number of articles whose `source` equals `source` exactly.
    async fn count_by_source(&self, source: &str) -> Result<usize, StoreError>;

    /// Remove every article, returning how many were removed.
    async fn delete_all(&mut self) -> Result<usize, StoreError>;

    /// All articles, newest first.
    async fn list(&self) -> Result<Vec<Article>, StoreError>;
}

/// The serialized form of a store: the articles plus the id sequence.
///
/// `next_id` survives [`ArticleStore::delete_all`], so ids are never reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleTable {
    #[serde(default = "first_id")]
    pub next_id: u64,
    #[serde(default)]
    pub articles: Vec<Article>,
}

fn first_id() -> u64 {
    1
}

impl Default for ArticleTable {
    fn default() -> Self {
        Self {
            next_id: first_id(),
            articles: Vec::new(),
        }
    }
}

impl ArticleTable {
    pub fn contains_title(&self, title: &str) -> bool {
        self.articles.iter().any(|a| a.title == title)
    }

    pub fn insert(&mut self, new: NewArticle) -> Result<Article, StoreError> {
        if self.contains_title(&new.title) {
            return Err(StoreError::DuplicateTitle(new.title));
        }
        let article = Article::from_new(self.next_id, new);
        self.next_id += 1;
        self.articles.push(article.clone());
        Ok(article)
    }

    pub fn count_by_source(&self, source: &str) -> usize {
        self.articles.iter().filter(|a| a.source == source).count()
    }

    pub fn clear(&mut self) -> usize {
        let removed = self.articles.len();
        self.articles.clear();
        removed
    }

    pub fn newest_first(&self) -> Vec<Article> {
        let mut articles = self.articles.clone();
        articles.sort_by(|a, b| b.id.cmp(&a.id));
        articles
    }
}

/// Either store, picked at startup.
#[derive(Debug)]
pub enum AnyStore {
    File(JsonFileStore),
    Memory(MemoryStore),
}

impl ArticleStore for AnyStore {
    async fn exists_by_title(&self, title: &str) -> Result<bool, StoreError> {
        match self {
            AnyStore::File(store) => store.exists_by_title(title).await,
            AnyStore::Memory(store) => store.exists_by_title(title).await,
        }
    }

    async fn insert(&mut self, article: NewArticle) -> Result<Article, StoreError> {
        match self {
            AnyStore::File(store) => store.insert(article).await,
            AnyStore::Memory(store) => store.insert(article).await,
        }
    }

    async fn count(&self) -> Result<usize, StoreError> {
        match self {
            AnyStore::File(store) => store.count().await,
            AnyStore::Memory(store) => store.count().await,
        }
    }

    async fn count_by_source(&self, source: &str) -> Result<usize, StoreError> {
        match self {
            AnyStore::File(store) => store.count_by_source(source).await,
            AnyStore::Memory(store) => store.count_by_source(source).await,
        }
    }

    async fn delete_all(&mut self) -> Result<usize, StoreError> {
        match self {
            AnyStore::File(store) => store.delete_all().await,
            AnyStore::Memory(store) => store.delete_all().await,
        }
    }

    async fn list(&self) -> Result<Vec<Article>, StoreError> {
        match self {
            AnyStore::File(store) => store.list().await,
            AnyStore::Memory(store) => store.list().await,
        }
    }
}

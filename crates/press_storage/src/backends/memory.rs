use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use press_core::{ensure_identity, Article, ArticleRepository, ArticleStatus, Error, KeyValueStore, Result};

pub struct MemoryStore {
    articles: Vec<Article>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { articles: Vec::new() }
    }

    pub fn upsert(&mut self, article: &Article) -> Result<()> {
        ensure_identity(article)?;

        if self
            .articles
            .iter()
            .any(|a| a.slug == article.slug && a.id != article.id)
        {
            return Err(Error::Storage(format!(
                "UNIQUE constraint failed: articles.slug ({})",
                article.slug
            )));
        }

        if let Some(existing) = self.articles.iter_mut().find(|a| a.id == article.id) {
            // an edit keeps the article's place in the newest-first listing
            let created_at = existing.created_at;
            *existing = article.clone();
            existing.created_at = created_at;
        } else {
            self.articles.push(article.clone());
        }
        Ok(())
    }

    pub fn get_by_slug(&self, slug: &str) -> Option<Article> {
        self.articles.iter().find(|a| a.slug == slug).cloned()
    }

    pub fn list(&self, status: Option<ArticleStatus>) -> Vec<Article> {
        let mut articles: Vec<Article> = self
            .articles
            .iter()
            .filter(|a| status.map_or(true, |s| a.status == s))
            .cloned()
            .collect();
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        articles
    }

    pub fn delete_by_id(&mut self, id: &str) {
        self.articles.retain(|a| a.id != id);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-local article repository. Used by default and in tests.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleRepository for InMemoryRepository {
    async fn upsert(&self, article: &Article) -> Result<()> {
        let mut store = self.store.write().await;
        store.upsert(article)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        let store = self.store.read().await;
        Ok(store.get_by_slug(slug))
    }

    async fn list(&self, status: Option<ArticleStatus>) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        Ok(store.list(status))
    }

    async fn delete_by_id(&self, id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store.delete_by_id(id);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryKeyValue {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryKeyValue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValue {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

use async_trait::async_trait;
use crate::types::{Article, ArticleStatus};
use crate::{Error, Result};

/// Durable store for published articles.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Insert or replace the article keyed by `id`. Replacing keeps the stored creation time.
    async fn upsert(&self, article: &Article) -> Result<()>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>>;

    /// Most recently created first.
    async fn list(&self, status: Option<ArticleStatus>) -> Result<Vec<Article>>;

    async fn delete_by_id(&self, id: &str) -> Result<()>;
}

/// String key-value persistence used for the draft queue.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}

/// Rejects an upsert that lacks its identity keys. Backends call this before writing.
pub fn ensure_identity(article: &Article) -> Result<()> {
    if article.id.trim().is_empty() {
        return Err(Error::Validation("article id is required".to_string()));
    }
    if article.slug.trim().is_empty() {
        return Err(Error::Validation(format!("article {} has no slug", article.id)));
    }
    Ok(())
}

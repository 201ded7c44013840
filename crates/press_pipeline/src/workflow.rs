use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use press_core::{Article, ArticleRepository, Error, Result};
use press_storage::DraftStore;

/// Moves a queued draft to `published` in the repository, or discards it.
///
/// Both transitions are terminal and serialized: once either succeeds for an
/// id, the draft is gone from the queue and any later transition for that id
/// fails with `DraftNotFound`.
pub struct PublicationWorkflow {
    drafts: Arc<DraftStore>,
    repository: Arc<dyn ArticleRepository>,
    transitions: Mutex<()>,
}

impl PublicationWorkflow {
    pub fn new(drafts: Arc<DraftStore>, repository: Arc<dyn ArticleRepository>) -> Self {
        Self {
            drafts,
            repository,
            transitions: Mutex::new(()),
        }
    }

    /// Writes the draft through the repository, then drops it from the queue.
    /// The queue is only touched after the repository has confirmed the write.
    pub async fn publish(&self, id: &str) -> Result<Article> {
        let _guard = self.transitions.lock().await;

        let draft = self
            .drafts
            .get(id)
            .await?
            .ok_or_else(|| Error::DraftNotFound(id.to_string()))?;

        let article = draft.into_published();
        info!("📤 Publishing {} ({})", article.title, article.slug);
        if let Err(e) = self.repository.upsert(&article).await {
            warn!("Publish of {} rejected, draft kept: {}", id, e);
            return Err(Error::Publish(e.to_string()));
        }

        if let Err(e) = self.drafts.remove(id).await {
            error!("{} is published but is still queued: {}", id, e);
            return Err(Error::Storage(format!(
                "article {} was published but could not be removed from the draft queue: {}",
                id, e
            )));
        }

        info!("✅ Published {}", article.slug);
        Ok(article)
    }

    /// Removes the draft without writing anything to the repository.
    pub async fn discard(&self, id: &str) -> Result<Article> {
        let _guard = self.transitions.lock().await;

        let removed = self
            .drafts
            .remove(id)
            .await?
            .ok_or_else(|| Error::DraftNotFound(id.to_string()))?;
        info!("🗑️ Discarded draft {}", removed.title);
        Ok(removed)
    }
}

use std::sync::Arc;
use tokio::sync::Mutex;
use press_core::{Article, Error, KeyValueStore, Result};

pub const DRAFTS_KEY: &str = "editorial_drafts";

/// Holding area for unreviewed drafts, serialized as one JSON array in a key-value store.
///
/// Insertion order is preserved. Every mutation is a read-modify-write under a
/// single lock, so appends and removals are atomic with respect to each other.
pub struct DraftStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    lock: Mutex<()>,
}

impl DraftStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            key: DRAFTS_KEY.to_string(),
            lock: Mutex::new(()),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    async fn load(&self) -> Result<Vec<Article>> {
        match self.kv.get(&self.key).await? {
            None => Ok(Vec::new()),
            Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| Error::Storage(format!("Draft queue {} is unreadable: {}", self.key, e))),
        }
    }

    async fn save(&self, drafts: &[Article]) -> Result<()> {
        let raw = serde_json::to_string(drafts)?;
        self.kv.set(&self.key, &raw).await
    }

    /// Appends drafts in order. A draft whose id is already queued replaces the queued copy.
    /// Rejects the whole call, writing nothing, if any draft is missing required fields.
    pub async fn append(&self, drafts: &[Article]) -> Result<()> {
        if let Some((draft, missing)) = drafts
            .iter()
            .map(|d| (d, d.missing_fields()))
            .find(|(_, missing)| !missing.is_empty())
        {
            return Err(Error::Validation(format!(
                "draft {:?} is missing {}",
                draft.title,
                missing.join(", ")
            )));
        }
        if drafts.is_empty() {
            return Ok(());
        }

        let _guard = self.lock.lock().await;
        let mut queue = self.load().await?;
        for draft in drafts {
            match queue.iter_mut().find(|d| d.id == draft.id) {
                Some(existing) => *existing = draft.clone(),
                None => queue.push(draft.clone()),
            }
        }
        self.save(&queue).await?;
        tracing::debug!("Draft queue now holds {} drafts", queue.len());
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Article>> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Article>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.into_iter().find(|d| d.id == id))
    }

    /// Removes the draft and returns it, or `None` if it was not queued.
    pub async fn remove(&self, id: &str) -> Result<Option<Article>> {
        let _guard = self.lock.lock().await;
        let mut queue = self.load().await?;
        let Some(index) = queue.iter().position(|d| d.id == id) else {
            return Ok(None);
        };
        let removed = queue.remove(index);
        self.save(&queue).await?;
        Ok(Some(removed))
    }
}

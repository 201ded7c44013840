use std::sync::Arc;
use press_core::{ArticleRepository, Error, Result};

pub mod backends;
pub mod drafts;

pub use backends::*;
pub use drafts::{DraftStore, DRAFTS_KEY};

/// Builds the article repository named on the command line.
pub async fn create_repository(kind: &str, url: Option<&str>) -> Result<Arc<dyn ArticleRepository>> {
    match kind {
        "memory" => Ok(Arc::new(InMemoryRepository::new())),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let url = url.unwrap_or("sqlite://articles.db");
            Ok(Arc::new(SqliteRepository::connect(url).await?))
        }
        #[cfg(not(feature = "sqlite"))]
        "sqlite" => {
            let _ = url;
            Err(Error::Storage(
                "sqlite support was not compiled in, rebuild with --features sqlite".to_string(),
            ))
        }
        other => Err(Error::Storage(format!(
            "Unknown storage backend: {}. Available backends: memory, sqlite",
            other
        ))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::drafts::DraftStore;
    pub use super::create_repository;
}

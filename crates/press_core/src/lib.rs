pub mod error;
pub mod models;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use models::GenerativeModel;
pub use storage::{ensure_identity, ArticleRepository, KeyValueStore};
pub use types::{
    slugify, Article, ArticleStatus, Citation, GroundedText, InlineImage, RawDraft,
    ResearchContext, StructuredRequest,
};

pub mod prelude {
    pub use super::{Article, ArticleStatus, Error, Result};
}

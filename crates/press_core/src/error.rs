use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),

    #[error("Research failed: {0}")]
    Research(String),

    #[error("The generative service is rate limiting requests, wait a minute before trying again: {0}")]
    RateLimited(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Image synthesis failed: {0}")]
    Image(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Draft not found: {0}")]
    DraftNotFound(String),

    #[error("Article not found: {0}")]
    NotFound(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("An authenticated operator is required")]
    Unauthorized,
}

impl Error {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

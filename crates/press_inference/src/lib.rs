pub mod imaging;
pub mod models;
pub mod requester;
pub mod schema;

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub image_model_name: Option<String>,
    pub base_url: Option<String>,
    /// Upper bound for one call to the generative service, body included.
    pub request_timeout: Option<Duration>,
}

impl Config {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn model_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or(DEFAULT_TEXT_MODEL)
    }

    pub fn image_model_name(&self) -> &str {
        self.image_model_name.as_deref().unwrap_or(DEFAULT_IMAGE_MODEL)
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }
}

pub mod prelude {
    pub use super::imaging::ImageSynthesizer;
    pub use super::models::create_model;
    pub use super::requester::ContentRequester;
    pub use super::Config;
    pub use press_core::{GenerativeModel, RawDraft, ResearchContext, Result, Error};
}

pub use imaging::{ImageSynthesizer, DEFAULT_FALLBACK_IMAGE};
pub use models::create_model;
pub use press_core::GenerativeModel;
pub use requester::ContentRequester;

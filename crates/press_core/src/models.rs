use async_trait::async_trait;
use std::fmt;
use crate::types::{GroundedText, InlineImage, StructuredRequest};
use crate::Result;

/// The generative content service, reduced to the three call shapes the pipeline uses.
#[async_trait]
pub trait GenerativeModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Generate text with live web grounding enabled, returning the cited sources.
    async fn grounded_research(&self, prompt: &str) -> Result<GroundedText>;

    /// Generate text constrained to the JSON schema in the request. Returns the raw text.
    async fn generate_structured(&self, request: &StructuredRequest) -> Result<String>;

    /// Generate an image. `Ok(None)` means the service answered without an image payload.
    async fn generate_image(&self, prompt: &str) -> Result<Option<InlineImage>>;
}

use std::sync::Arc;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};
use press_core::{GenerativeModel, InlineImage};

pub const DEFAULT_FALLBACK_IMAGE: &str = "https://picsum.photos/seed/editorial/1200/630";

/// Requests one header image per article. Never fails: any problem yields the fallback URL.
pub struct ImageSynthesizer {
    model: Arc<dyn GenerativeModel>,
    fallback: String,
}

impl ImageSynthesizer {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model,
            fallback: DEFAULT_FALLBACK_IMAGE.to_string(),
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn default_prompt(title: &str) -> String {
        format!(
            "A striking editorial header illustration for an article titled \"{}\". \
             Modern, clean composition, 16:9, no text, letters or logos.",
            title
        )
    }

    pub async fn synthesize_image(&self, prompt: Option<&str>, fallback_title: &str) -> String {
        let prompt = match prompt.map(str::trim).filter(|p| !p.is_empty()) {
            Some(prompt) => prompt.to_string(),
            None => Self::default_prompt(fallback_title),
        };

        match self.model.generate_image(&prompt).await {
            Ok(Some(image)) if !image.data.is_empty() => {
                debug!("🖼️ Image generated for {} ({} bytes)", fallback_title, image.data.len());
                data_url(&image)
            }
            Ok(_) => {
                warn!("🖼️ No image payload for \"{}\", using fallback", fallback_title);
                self.fallback.clone()
            }
            Err(e) => {
                warn!("🖼️ Image synthesis failed for \"{}\": {}", fallback_title, e);
                self.fallback.clone()
            }
        }
    }
}

/// Encodes an inline image as a `data:` URL that can be embedded directly.
pub fn data_url(image: &InlineImage) -> String {
    let mime = if image.mime_type.trim().is_empty() {
        "image/png"
    } else {
        image.mime_type.as_str()
    };
    format!("data:{};base64,{}", mime, STANDARD.encode(&image.data))
}

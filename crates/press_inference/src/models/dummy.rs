use std::fmt;
use async_trait::async_trait;
use serde_json::json;
use press_core::{
    slugify, Citation, GenerativeModel, GroundedText, InlineImage, Result, StructuredRequest,
};

/// 1x1 transparent PNG.
const PIXEL_PNG: [u8; 67] = [
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0a, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

const TOPICS: [(&str, &str); 3] = [
    ("Small Language Models Move On-Device", "AI"),
    ("Passkeys Are Quietly Replacing Passwords", "Security"),
    ("The Return of the Personal Website", "Culture"),
];

/// Offline model with canned responses, for demos and local development.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerativeModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn grounded_research(&self, _prompt: &str) -> Result<GroundedText> {
        let text = TOPICS
            .iter()
            .map(|(title, category)| format!("{}: {} is drawing attention this week.", category, title))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(GroundedText {
            text,
            citations: vec![
                Citation {
                    title: "Example Newsroom".to_string(),
                    uri: "https://example.com/news".to_string(),
                },
                Citation {
                    title: "Example Research Blog".to_string(),
                    uri: "https://example.org/blog".to_string(),
                },
            ],
        })
    }

    async fn generate_structured(&self, _request: &StructuredRequest) -> Result<String> {
        let drafts: Vec<_> = TOPICS
            .iter()
            .enumerate()
            .map(|(i, (title, category))| {
                json!({
                    "id": format!("dummy-{}", i + 1),
                    "slug": slugify(title),
                    "title": title,
                    "excerpt": format!("A short look at why {} matters now.", title.to_lowercase()),
                    "content": format!("<h2>{}</h2><p>This is placeholder copy for local development.</p>", title),
                    "category": category,
                    "date": "2025-01-01",
                    "tags": [category.to_lowercase(), "trends"],
                    "metaTitle": title,
                    "metaDescription": format!("{} explained.", title),
                    "imagePrompt": format!("Minimal illustration representing {}", title.to_lowercase()),
                })
            })
            .collect();
        Ok(serde_json::to_string(&drafts)?)
    }

    async fn generate_image(&self, _prompt: &str) -> Result<Option<InlineImage>> {
        Ok(Some(InlineImage {
            mime_type: "image/png".to_string(),
            data: PIXEL_PNG.to_vec(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use press_core::RawDraft;

    #[tokio::test]
    async fn test_dummy_model() {
        let model = DummyModel::new();

        let research = model.grounded_research("anything").await.unwrap();
        assert!(!research.text.is_empty());
        assert_eq!(research.citations.len(), 2);

        let request = StructuredRequest {
            system_instruction: None,
            prompt: "write".to_string(),
            schema: serde_json::Value::Null,
        };
        let text = model.generate_structured(&request).await.unwrap();
        let drafts: Vec<RawDraft> = serde_json::from_str(&text).unwrap();
        assert_eq!(drafts.len(), 3);
        assert_eq!(drafts[0].slug, "small-language-models-move-on-device");

        let image = model.generate_image("a cat").await.unwrap().unwrap();
        assert_eq!(&image.data[1..4], b"PNG");
    }
}

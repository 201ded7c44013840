use std::fmt;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use press_core::{
    Citation, Error, GenerativeModel, GroundedText, InlineImage, Result, StructuredRequest,
};
use crate::Config;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<TextPart<'a>>,
}

impl<'a> Content<'a> {
    fn user(text: &'a str) -> Self {
        Self { role: Some("user"), parts: vec![TextPart { text }] }
    }

    fn system(text: &'a str) -> Self {
        Self { role: None, parts: vec![TextPart { text }] }
    }
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Tool {
    #[serde(rename = "googleSearch")]
    google_search: GoogleSearch,
}

#[derive(Serialize)]
struct GoogleSearch {}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'a str>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    data: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize, Debug)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Deserialize, Debug)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
    }

    fn text(&self) -> String {
        self.parts()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }

    fn citations(&self) -> Vec<Citation> {
        self.candidates
            .iter()
            .filter_map(|c| c.grounding_metadata.as_ref())
            .flat_map(|m| m.grounding_chunks.iter())
            .filter_map(|chunk| chunk.web.as_ref())
            .filter_map(|web| {
                let uri = web.uri.clone()?;
                let title = web.title.clone().unwrap_or_else(|| uri.clone());
                Some(Citation { title, uri })
            })
            .collect()
    }

    fn first_image(&self) -> Result<Option<InlineImage>> {
        let Some(inline) = self.parts().find_map(|p| p.inline_data.as_ref()) else {
            return Ok(None);
        };
        let data = STANDARD
            .decode(inline.data.as_bytes())
            .map_err(|e| Error::Image(format!("invalid base64 image payload: {}", e)))?;
        Ok(Some(InlineImage {
            mime_type: inline.mime_type.clone(),
            data,
        }))
    }
}

/// Maps a non-success response onto the error taxonomy. Throttling gets its own variant.
fn classify_failure(model: &str, status: StatusCode, body: &str) -> Error {
    let (message, api_status) = match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.message, envelope.error.status),
        Err(_) => (body.trim().to_string(), None),
    };
    if status == StatusCode::TOO_MANY_REQUESTS
        || api_status.as_deref() == Some("RESOURCE_EXHAUSTED")
    {
        return Error::RateLimited(message);
    }
    Error::Inference(format!("{} returned {}: {}", model, status, message))
}

/// Client for the Gemini `generateContent` REST endpoint.
pub struct GeminiModel {
    client: Client,
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
}

impl GeminiModel {
    pub fn new(config: Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Inference("Gemini API key is required".to_string()))?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            api_key,
            base_url: config.base_url().to_string(),
            text_model: config.model_name().to_string(),
            image_model: config.image_model_name().to_string(),
        })
    }

    pub fn text_model(&self) -> &str {
        &self.text_model
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest<'_>,
    ) -> Result<GenerateContentResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        tracing::debug!("Calling {}", url);

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(model, status, &body));
        }

        Ok(response.json::<GenerateContentResponse>().await?)
    }
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .finish()
    }
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn grounded_research(&self, prompt: &str) -> Result<GroundedText> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            system_instruction: None,
            tools: vec![Tool { google_search: GoogleSearch {} }],
            generation_config: None,
        };
        let response = self.generate(&self.text_model, &request).await?;
        Ok(GroundedText {
            text: response.text(),
            citations: response.citations(),
        })
    }

    async fn generate_structured(&self, request: &StructuredRequest) -> Result<String> {
        let body = GenerateContentRequest {
            contents: vec![Content::user(&request.prompt)],
            system_instruction: request.system_instruction.as_deref().map(Content::system),
            tools: Vec::new(),
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json"),
                response_schema: Some(&request.schema),
                ..GenerationConfig::default()
            }),
        };
        let response = self.generate(&self.text_model, &body).await?;
        Ok(response.text())
    }

    async fn generate_image(&self, prompt: &str) -> Result<Option<InlineImage>> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            system_instruction: None,
            tools: Vec::new(),
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["TEXT", "IMAGE"]),
                ..GenerationConfig::default()
            }),
        };
        let response = self.generate(&self.image_model, &request).await?;
        response.first_image()
    }
}

use std::collections::HashSet;
use std::sync::Arc;
use serde_json::Value;
use tracing::{info, warn};
use press_core::{
    slugify, Citation, Error, GenerativeModel, RawDraft, ResearchContext, Result,
    StructuredRequest,
};
use crate::schema::response_schema;

pub const EDITORIAL_INSTRUCTION: &str = "You are the editorial desk of an independent online \
publication. Write original articles in a confident, human editorial voice. Never mention or \
imply that the text was produced by software or an assistant. Only state facts supported by the \
research you are given; do not invent quotes, statistics, people or sources. Format article \
bodies as semantic HTML using <h2>, <h3>, <p>, <ul> and <blockquote> elements only.";

/// Builds prompts, calls the generative service and validates what comes back.
pub struct ContentRequester {
    model: Arc<dyn GenerativeModel>,
    subject: String,
    batch_size: usize,
}

impl ContentRequester {
    pub fn new(model: Arc<dyn GenerativeModel>, subject: impl Into<String>, batch_size: usize) -> Self {
        Self {
            model,
            subject: subject.into(),
            batch_size: batch_size.max(1),
        }
    }

    pub fn research_prompt(&self) -> String {
        format!(
            "You are a research analyst for an online publication covering {subject}. \
             Search the web for the most significant developments, launches and debates in \
             {subject} from the last two weeks. Describe each trend in a short paragraph with \
             concrete names, numbers and dates, and explain why readers should care.",
            subject = self.subject
        )
    }

    pub fn generation_prompt(&self, context: &ResearchContext) -> String {
        let sources = context
            .citations
            .iter()
            .map(|c| format!("- {} ({})", c.title, c.uri))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "Using the research below, write {count} distinct articles for a publication about \
             {subject}. Each article needs a URL-safe slug, a headline, a one or two sentence \
             excerpt, a body of at least five paragraphs, a single category, the date in \
             YYYY-MM-DD format, three to six tags, an SEO title and description, and an \
             imagePrompt describing a header illustration without any text in it.\n\n\
             Research:\n{synthesis}\n\nSources:\n{sources}\n\n\
             Respond with a JSON array of {count} article objects.",
            count = self.batch_size,
            subject = self.subject,
            synthesis = context.synthesis,
            sources = if sources.is_empty() { "- none reported".to_string() } else { sources },
        )
    }

    /// Stage 1: one grounded call. Throttling surfaces as `RateLimited`, anything else as `Research`.
    pub async fn run_research(&self) -> Result<ResearchContext> {
        info!("🔎 Researching current trends in {}", self.subject);
        let grounded = self
            .model
            .grounded_research(&self.research_prompt())
            .await
            .map_err(|e| match e {
                Error::RateLimited(message) => Error::RateLimited(message),
                other => Error::Research(other.to_string()),
            })?;

        let synthesis = grounded.text.trim().to_string();
        if synthesis.is_empty() {
            return Err(Error::Research("the research call returned no text".to_string()));
        }

        let citations = dedupe_citations(grounded.citations);
        info!("✨ Research complete with {} sources", citations.len());
        Ok(ResearchContext { synthesis, citations })
    }

    /// Stage 2: schema-constrained generation. Any malformed item fails the whole batch.
    pub async fn generate_drafts(&self, context: &ResearchContext) -> Result<Vec<RawDraft>> {
        info!("✍️ Generating {} drafts", self.batch_size);
        let request = StructuredRequest {
            system_instruction: Some(EDITORIAL_INSTRUCTION.to_string()),
            prompt: self.generation_prompt(context),
            schema: response_schema::<Vec<RawDraft>>(),
        };

        let text = self
            .model
            .generate_structured(&request)
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;

        let drafts = parse_drafts(&text)?;
        if drafts.len() != self.batch_size {
            warn!(
                "Requested {} drafts but the model returned {}; keeping all of them",
                self.batch_size,
                drafts.len()
            );
        }
        info!("✨ Generated {} drafts", drafts.len());
        Ok(drafts)
    }
}

/// Drops citations without a uri and repeated uris, keeping first-seen order.
pub fn dedupe_citations(citations: Vec<Citation>) -> Vec<Citation> {
    let mut seen = HashSet::new();
    citations
        .into_iter()
        .filter(|c| !c.uri.trim().is_empty())
        .filter(|c| seen.insert(c.uri.clone()))
        .collect()
}

/// Removes a surrounding Markdown code fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // skip the info string ("json") on the opening fence line
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Decodes and validates a stage-2 response.
pub fn parse_drafts(text: &str) -> Result<Vec<RawDraft>> {
    let payload = strip_code_fence(text);
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| Error::Generation(format!("response is not valid JSON: {}", e)))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(Error::Generation(format!(
                "expected a JSON array of drafts, got {}",
                kind(&other)
            )))
        }
    };

    let mut seen_slugs = HashSet::new();
    let mut drafts = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let draft: RawDraft = serde_json::from_value(item).map_err(|e| {
            Error::Generation(format!("draft {} does not match the schema: {}", index, e))
        })?;
        let mut draft = normalize_draft(draft)
            .map_err(|reason| Error::Generation(format!("draft {} {}", index, reason)))?;

        if !seen_slugs.insert(draft.slug.clone()) {
            let base = draft.slug.clone();
            let mut n = 2;
            while !seen_slugs.insert(format!("{}-{}", base, n)) {
                n += 1;
            }
            draft.slug = format!("{}-{}", base, n);
            warn!("Duplicate slug {} in batch, renamed to {}", base, draft.slug);
        }
        drafts.push(draft);
    }
    Ok(drafts)
}

fn normalize_draft(draft: RawDraft) -> std::result::Result<RawDraft, String> {
    let required = |name: &str, value: String| -> std::result::Result<String, String> {
        let value = value.trim().to_string();
        if value.is_empty() {
            Err(format!("has an empty {}", name))
        } else {
            Ok(value)
        }
    };

    let slug = slugify(&draft.slug);
    if slug.is_empty() {
        return Err(format!("has an unusable slug {:?}", draft.slug));
    }

    let tags: Vec<String> = draft
        .tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if tags.is_empty() {
        return Err("has no tags".to_string());
    }

    Ok(RawDraft {
        id: draft.id,
        slug,
        title: required("title", draft.title)?,
        excerpt: required("excerpt", draft.excerpt)?,
        content: required("content", draft.content)?,
        category: required("category", draft.category)?,
        date: required("date", draft.date)?,
        tags,
        meta_title: required("metaTitle", draft.meta_title)?,
        meta_description: required("metaDescription", draft.meta_description)?,
        image_prompt: draft
            .image_prompt
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty()),
    })
}

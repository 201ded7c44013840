use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Draft,
    Published,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArticleStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(ArticleStatus::Draft),
            "published" => Ok(ArticleStatus::Published),
            other => Err(crate::Error::Validation(format!("Unknown article status: {}", other))),
        }
    }
}

/// A source reference reported by the grounded research call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub uri: String,
}

/// Output of the research stage. Lives only for the duration of one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchContext {
    pub synthesis: String,
    pub citations: Vec<Citation>,
}

/// Text plus grounding citations, as returned by a grounded generative call.
#[derive(Debug, Clone, Default)]
pub struct GroundedText {
    pub text: String,
    pub citations: Vec<Citation>,
}

/// Outbound request for schema-constrained generation.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub system_instruction: Option<String>,
    pub prompt: String,
    pub schema: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// One article as produced by the generation stage, before identity and imagery are assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawDraft {
    /// Short identifier for the article.
    pub id: String,
    /// Lowercase, hyphen-separated, URL-safe identifier.
    pub slug: String,
    pub title: String,
    /// One or two sentence teaser shown in listings.
    pub excerpt: String,
    /// Full article body as semantic HTML.
    pub content: String,
    pub category: String,
    /// Publication date formatted as YYYY-MM-DD.
    pub date: String,
    pub tags: Vec<String>,
    /// SEO title, at most 60 characters.
    pub meta_title: String,
    /// SEO description, at most 160 characters.
    pub meta_description: String,
    /// Visual description for an illustrative header image.
    #[serde(default)]
    pub image_prompt: Option<String>,
}

/// An article in the draft queue or in the published store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub meta_title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub status: ArticleStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Article {
    /// Names of required text fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let fields = [
            ("id", &self.id),
            ("slug", &self.slug),
            ("title", &self.title),
            ("excerpt", &self.excerpt),
            ("content", &self.content),
            ("category", &self.category),
            ("date", &self.date),
            ("metaTitle", &self.meta_title),
            ("metaDescription", &self.meta_description),
            ("image", &self.image),
        ];
        let mut missing: Vec<&'static str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !self.tags.iter().any(|t| !t.trim().is_empty()) {
            missing.push("tags");
        }
        missing
    }

    pub fn is_published(&self) -> bool {
        self.status == ArticleStatus::Published
    }

    pub fn into_published(mut self) -> Self {
        self.status = ArticleStatus::Published;
        self
    }
}

/// Lowercases and collapses anything that is not ASCII alphanumeric into single hyphens.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  --AI in 2025--  "), "ai-in-2025");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
        assert_eq!(slugify("¿¡!?"), "");
    }

    #[test]
    fn test_status_round_trip_through_str() {
        assert_eq!("Published".parse::<ArticleStatus>().unwrap(), ArticleStatus::Published);
        assert_eq!(ArticleStatus::Draft.to_string(), "draft");
        assert!("archived".parse::<ArticleStatus>().is_err());
    }

    #[test]
    fn test_article_missing_identity_defaults_to_empty() {
        let article: Article = serde_json::from_str(r#"{"title": "Only a title"}"#).unwrap();
        assert!(article.id.is_empty());
        assert_eq!(article.status, ArticleStatus::Draft);
        let missing = article.missing_fields();
        assert!(missing.contains(&"id"));
        assert!(missing.contains(&"slug"));
        assert!(missing.contains(&"tags"));
        assert!(!missing.contains(&"title"));
    }

    #[test]
    fn test_article_wire_names_are_camel_case() {
        let article = Article {
            id: "a1".to_string(),
            slug: "s".to_string(),
            title: "t".to_string(),
            excerpt: "e".to_string(),
            content: "<p>c</p>".to_string(),
            category: "Tech".to_string(),
            date: "2025-01-01".to_string(),
            tags: vec!["ai".to_string()],
            meta_title: "m".to_string(),
            meta_description: "d".to_string(),
            image: "https://example.com/i.png".to_string(),
            author: "Editorial Team".to_string(),
            status: ArticleStatus::Published,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&article).unwrap();
        assert_eq!(value["metaTitle"], "m");
        assert_eq!(value["status"], "published");
        assert!(value.get("createdAt").is_some());
        assert!(article.missing_fields().is_empty());
    }
}

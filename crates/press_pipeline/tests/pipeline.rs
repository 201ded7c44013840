use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use async_trait::async_trait;
use serde_json::json;
use press_core::{
    Article, ArticleRepository, ArticleStatus, Citation, Error, GenerativeModel, GroundedText,
    InlineImage, Result, StructuredRequest,
};
use press_pipeline::{EditorialPipeline, PipelineConfig, PublicationWorkflow};
use press_storage::{DraftStore, InMemoryRepository, MemoryKeyValue};

const FALLBACK: &str = "https://cdn.example.com/fallback.png";

#[derive(Debug)]
enum Research {
    Ok,
    Throttled,
}

/// Generative model with a fixed script and call counters.
#[derive(Debug)]
struct ScriptedModel {
    research: Research,
    drafts: String,
    failing_image: Option<&'static str>,
    structured_calls: AtomicUsize,
    image_calls: AtomicUsize,
}

impl ScriptedModel {
    fn new(drafts: serde_json::Value) -> Self {
        Self {
            research: Research::Ok,
            drafts: drafts.to_string(),
            failing_image: None,
            structured_calls: AtomicUsize::new(0),
            image_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn grounded_research(&self, _prompt: &str) -> Result<GroundedText> {
        match self.research {
            Research::Ok => Ok(GroundedText {
                text: "Chip makers are shipping NPUs in every new laptop.".to_string(),
                citations: vec![
                    Citation {
                        title: "Laptop NPUs".to_string(),
                        uri: "https://news.example.com/npu".to_string(),
                    },
                    Citation {
                        title: "Laptop NPUs (again)".to_string(),
                        uri: "https://news.example.com/npu".to_string(),
                    },
                ],
            }),
            Research::Throttled => Err(Error::RateLimited("429 RESOURCE_EXHAUSTED".to_string())),
        }
    }

    async fn generate_structured(&self, request: &StructuredRequest) -> Result<String> {
        self.structured_calls.fetch_add(1, Ordering::SeqCst);
        assert!(request.prompt.contains("Chip makers"));
        Ok(self.drafts.clone())
    }

    async fn generate_image(&self, prompt: &str) -> Result<Option<InlineImage>> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_image.is_some_and(|needle| prompt.contains(needle)) {
            return Err(Error::Image("safety filter".to_string()));
        }
        Ok(Some(InlineImage {
            mime_type: "image/jpeg".to_string(),
            data: vec![0xff, 0xd8, 0xff],
        }))
    }
}

fn draft_json(slug: &str, image_prompt: &str) -> serde_json::Value {
    json!({
        "id": "model-chosen-id",
        "slug": slug,
        "title": format!("Story about {}", slug),
        "excerpt": "A short excerpt.",
        "content": "<h2>Heading</h2><p>Body.</p>",
        "category": "AI",
        "date": "2025-03-14",
        "tags": ["ai", "hardware"],
        "metaTitle": "Meta title",
        "metaDescription": "Meta description",
        "imagePrompt": image_prompt
    })
}

fn three_drafts() -> serde_json::Value {
    json!([
        draft_json("npu-laptops", "a laptop glowing"),
        draft_json("edge-inference", "broken render"),
        draft_json("battery-life", "a battery icon"),
    ])
}

struct Harness {
    model: Arc<ScriptedModel>,
    drafts: Arc<DraftStore>,
    repository: Arc<InMemoryRepository>,
    pipeline: EditorialPipeline,
    workflow: PublicationWorkflow,
}

fn harness(model: ScriptedModel) -> Harness {
    let model = Arc::new(model);
    let drafts = Arc::new(DraftStore::new(Arc::new(MemoryKeyValue::new())));
    let repository = Arc::new(InMemoryRepository::new());
    let config = PipelineConfig {
        fallback_image: FALLBACK.to_string(),
        image_concurrency: 2,
        ..PipelineConfig::default()
    };
    let pipeline = EditorialPipeline::new(model.clone(), drafts.clone(), &config);
    let workflow = PublicationWorkflow::new(drafts.clone(), repository.clone());
    Harness {
        model,
        drafts,
        repository,
        pipeline,
        workflow,
    }
}

#[tokio::test]
async fn test_one_failed_image_still_queues_three_drafts() {
    let mut model = ScriptedModel::new(three_drafts());
    model.failing_image = Some("broken");
    let h = harness(model);

    let run = h.pipeline.run().await.unwrap();
    assert_eq!(run.sources.len(), 1);

    let queued = h.drafts.list().await.unwrap();
    assert_eq!(queued.len(), 3);
    assert_eq!(h.model.image_calls.load(Ordering::SeqCst), 3);
    assert_eq!(queued.iter().filter(|a| a.image == FALLBACK).count(), 1);
    assert_eq!(queued[1].image, FALLBACK);
    for article in &queued {
        assert!(article.missing_fields().is_empty(), "{:?}", article.missing_fields());
        assert_ne!(article.id, "model-chosen-id");
        assert_eq!(article.status, ArticleStatus::Draft);
    }
}

#[tokio::test]
async fn test_throttled_research_aborts_run() {
    let mut model = ScriptedModel::new(three_drafts());
    model.research = Research::Throttled;
    let h = harness(model);

    let err = h.pipeline.run().await.unwrap_err();
    assert!(err.is_rate_limited());
    assert!(err.to_string().contains("wait a minute"));
    assert_eq!(h.model.structured_calls.load(Ordering::SeqCst), 0);
    assert!(h.drafts.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_schema_violation_queues_nothing() {
    let mut missing_slug = draft_json("ignored", "a chip");
    missing_slug.as_object_mut().unwrap().remove("slug");
    let h = harness(ScriptedModel::new(json!([
        draft_json("fine", "a chip"),
        missing_slug,
    ])));

    let err = h.pipeline.run().await.unwrap_err();
    assert!(matches!(err, Error::Generation(_)));
    assert!(err.to_string().contains("draft 1"));
    assert_eq!(h.model.image_calls.load(Ordering::SeqCst), 0);
    assert!(h.drafts.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_publish_then_discard_lifecycle() {
    let h = harness(ScriptedModel::new(three_drafts()));
    let run = h.pipeline.run().await.unwrap();
    let (first, second) = (&run.articles[0], &run.articles[1]);

    h.workflow.publish(&first.id).await.unwrap();
    assert!(h.drafts.get(&first.id).await.unwrap().is_none());
    let stored = h.repository.get_by_slug(&first.slug).await.unwrap().unwrap();
    assert_eq!(stored.id, first.id);
    assert_eq!(stored.status, ArticleStatus::Published);

    h.workflow.discard(&second.id).await.unwrap();
    assert!(h.repository.get_by_slug(&second.slug).await.unwrap().is_none());

    let remaining: Vec<String> = h.drafts.list().await.unwrap().into_iter().map(|a| a.id).collect();
    assert_eq!(remaining, vec![run.articles[2].id.clone()]);
}

#[tokio::test]
async fn test_publish_unknown_id_is_not_found() {
    let h = harness(ScriptedModel::new(three_drafts()));
    h.pipeline.run().await.unwrap();

    let err = h.workflow.publish("no-such-draft").await.unwrap_err();
    assert!(matches!(err, Error::DraftNotFound(_)));
    assert_eq!(h.drafts.list().await.unwrap().len(), 3);
    assert!(h.repository.list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_republishing_edited_article_overwrites() {
    let h = harness(ScriptedModel::new(three_drafts()));
    let run = h.pipeline.run().await.unwrap();
    let article: Article = run.articles[0].clone();
    h.workflow.publish(&article.id).await.unwrap();

    let mut edited = article.clone();
    edited.title = "A sharper headline".to_string();
    h.drafts.append(&[edited]).await.unwrap();
    h.workflow.publish(&article.id).await.unwrap();

    let published = h.repository.list(Some(ArticleStatus::Published)).await.unwrap();
    assert_eq!(published.len(), 1);
    let read_back = h.repository.get_by_slug(&article.slug).await.unwrap().unwrap();
    assert_eq!(read_back.title, "A sharper headline");
}

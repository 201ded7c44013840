use std::sync::Arc;
use chrono::Utc;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use uuid::Uuid;
use press_core::{Article, ArticleStatus, RawDraft};
use press_inference::ImageSynthesizer;

/// Turns generated drafts into complete articles, resolving one image per draft.
pub struct DraftAssembler {
    synthesizer: Arc<ImageSynthesizer>,
    semaphore: Arc<Semaphore>,
    author: String,
}

impl DraftAssembler {
    pub fn new(synthesizer: ImageSynthesizer, author: impl Into<String>, concurrency: usize) -> Self {
        Self {
            synthesizer: Arc::new(synthesizer),
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
            author: author.into(),
        }
    }

    /// Resolves every image, then returns all drafts in input order.
    ///
    /// Each branch folds its own failure into the fallback image, so the join
    /// below never loses an article. Ids coming from the model are discarded and
    /// replaced with fresh v4 uuids.
    pub async fn assemble(&self, raw_drafts: Vec<RawDraft>) -> Vec<Article> {
        let total = raw_drafts.len();
        info!("🖼️ Resolving images for {} drafts", total);

        let futures: Vec<_> = raw_drafts
            .into_iter()
            .enumerate()
            .map(|(i, draft)| {
                let synthesizer = self.synthesizer.clone();
                let semaphore = self.semaphore.clone();
                let author = self.author.clone();
                async move {
                    let image = match semaphore.acquire().await {
                        Ok(_permit) => {
                            debug!("🎨 Image {}/{}: {}", i + 1, total, draft.title);
                            synthesizer
                                .synthesize_image(draft.image_prompt.as_deref(), &draft.title)
                                .await
                        }
                        Err(e) => {
                            warn!("Image slot unavailable for {}: {}", draft.title, e);
                            synthesizer.fallback().to_string()
                        }
                    };
                    into_article(draft, image, author)
                }
            })
            .collect();

        let articles = join_all(futures).await;
        let fallbacks = articles
            .iter()
            .filter(|a| a.image == self.synthesizer.fallback())
            .count();
        info!(
            "✨ Assembled {} drafts ({} with fallback image)",
            articles.len(),
            fallbacks
        );
        articles
    }
}

fn into_article(draft: RawDraft, image: String, author: String) -> Article {
    Article {
        id: Uuid::new_v4().to_string(),
        slug: draft.slug,
        title: draft.title,
        excerpt: draft.excerpt,
        content: draft.content,
        category: draft.category,
        date: draft.date,
        tags: draft.tags,
        meta_title: draft.meta_title,
        meta_description: draft.meta_description,
        image,
        author,
        status: ArticleStatus::Draft,
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use press_core::{
        Error, GenerativeModel, GroundedText, InlineImage, Result, StructuredRequest,
    };
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fails for prompts containing "fail", and tracks peak concurrency.
    #[derive(Debug, Default)]
    struct FlakyImages {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl GenerativeModel for FlakyImages {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn grounded_research(&self, _prompt: &str) -> Result<GroundedText> {
            Ok(GroundedText::default())
        }

        async fn generate_structured(&self, _request: &StructuredRequest) -> Result<String> {
            Ok("[]".to_string())
        }

        async fn generate_image(&self, prompt: &str) -> Result<Option<InlineImage>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if prompt.contains("fail") {
                return Err(Error::Image("model refused".to_string()));
            }
            Ok(Some(InlineImage {
                mime_type: "image/png".to_string(),
                data: vec![1, 2, 3],
            }))
        }
    }

    fn raw(id: &str, image_prompt: Option<&str>) -> RawDraft {
        RawDraft {
            id: id.to_string(),
            slug: format!("slug-{}", id),
            title: format!("Title {}", id),
            excerpt: "Excerpt".to_string(),
            content: "<p>Body</p>".to_string(),
            category: "AI".to_string(),
            date: "2025-03-01".to_string(),
            tags: vec!["ai".to_string()],
            meta_title: "Meta".to_string(),
            meta_description: "Description".to_string(),
            image_prompt: image_prompt.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_failed_image_keeps_article() {
        let model = Arc::new(FlakyImages::default());
        let assembler = DraftAssembler::new(ImageSynthesizer::new(model), "Desk", 4);
        let articles = assembler
            .assemble(vec![
                raw("1", Some("sunrise")),
                raw("2", Some("please fail")),
                raw("3", None),
            ])
            .await;

        assert_eq!(articles.len(), 3);
        assert_eq!(
            articles.iter().map(|a| a.slug.as_str()).collect::<Vec<_>>(),
            vec!["slug-1", "slug-2", "slug-3"]
        );
        assert!(articles[0].image.starts_with("data:image/png;base64,"));
        assert_eq!(articles[1].image, press_inference::DEFAULT_FALLBACK_IMAGE);
        assert!(articles[2].image.starts_with("data:image/png;base64,"));
        for article in &articles {
            assert!(article.missing_fields().is_empty());
            assert_eq!(article.status, ArticleStatus::Draft);
            assert_eq!(article.author, "Desk");
        }
    }

    #[tokio::test]
    async fn test_ids_are_fresh_and_unique() {
        let model = Arc::new(FlakyImages::default());
        let assembler = DraftAssembler::new(ImageSynthesizer::new(model), "Desk", 2);
        let first = assembler.assemble(vec![raw("1", None), raw("1", None)]).await;
        let second = assembler.assemble(vec![raw("1", None)]).await;

        let ids: HashSet<&str> = first.iter().chain(second.iter()).map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        assert!(!ids.contains("1"));
    }

    #[tokio::test]
    async fn test_fan_out_is_bounded() {
        let model = Arc::new(FlakyImages::default());
        let assembler = DraftAssembler::new(ImageSynthesizer::new(model.clone()), "Desk", 2);
        let drafts = (0..6).map(|i| raw(&i.to_string(), None)).collect();
        let articles = assembler.assemble(drafts).await;
        assert_eq!(articles.len(), 6);
        assert!(model.peak.load(Ordering::SeqCst) <= 2);
        assert!(model.peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let assembler = DraftAssembler::new(
            ImageSynthesizer::new(Arc::new(FlakyImages::default())),
            "Desk",
            2,
        );
        assert!(assembler.assemble(Vec::new()).await.is_empty());
    }
}

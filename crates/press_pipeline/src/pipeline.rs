use std::sync::Arc;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;
use press_core::{Article, Citation, Error, GenerativeModel, Result};
use press_inference::{ContentRequester, ImageSynthesizer};
use press_storage::DraftStore;
use crate::assembler::DraftAssembler;
use crate::config::PipelineConfig;
use crate::logging::Logger;

/// What one generation run queued for review.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRun {
    pub articles: Vec<Article>,
    pub sources: Vec<Citation>,
}

/// Research, generation, image resolution and queueing, in that order.
pub struct EditorialPipeline {
    requester: ContentRequester,
    assembler: DraftAssembler,
    drafts: Arc<DraftStore>,
    running: Mutex<()>,
}

impl EditorialPipeline {
    pub fn new(model: Arc<dyn GenerativeModel>, drafts: Arc<DraftStore>, config: &PipelineConfig) -> Self {
        let requester = ContentRequester::new(model.clone(), config.subject.clone(), config.batch_size);
        let synthesizer = ImageSynthesizer::new(model).with_fallback(config.fallback_image.clone());
        let assembler = DraftAssembler::new(synthesizer, config.author.clone(), config.image_concurrency);
        Self {
            requester,
            assembler,
            drafts,
            running: Mutex::new(()),
        }
    }

    /// Runs one batch end to end.
    ///
    /// Any failure before the drafts are queued aborts the run and leaves the
    /// draft store untouched. Only one run may be in flight at a time.
    pub async fn run(&self) -> Result<GenerationRun> {
        let Ok(_guard) = self.running.try_lock() else {
            return Err(Error::Generation("a generation run is already in progress".to_string()));
        };

        let run_id = Uuid::new_v4().simple().to_string();
        let logger = Logger::new().with_prefix(format!("[run {}]", &run_id[..8]));
        logger.info("📰 Starting generation run");

        let context = match self.requester.run_research().await {
            Ok(context) => context,
            Err(e) => {
                logger.error(&format!("Research failed: {}", e));
                return Err(e);
            }
        };

        let raw_drafts = match self.requester.generate_drafts(&context).await {
            Ok(drafts) => drafts,
            Err(e) => {
                logger.error(&format!("Generation failed: {}", e));
                return Err(e);
            }
        };

        let articles = self.assembler.assemble(raw_drafts).await;

        if let Err(e) = self.drafts.append(&articles).await {
            logger.error(&format!("Queueing drafts failed: {}", e));
            return Err(e);
        }

        logger.info(&format!(
            "✅ Queued {} drafts from {} sources",
            articles.len(),
            context.citations.len()
        ));
        Ok(GenerationRun {
            articles,
            sources: context.citations,
        })
    }
}

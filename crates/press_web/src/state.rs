use std::sync::Arc;
use press_core::{ArticleRepository, GenerativeModel};
use press_pipeline::{EditorialPipeline, PipelineConfig, PublicationWorkflow};
use press_storage::DraftStore;

pub struct AppState {
    pub pipeline: EditorialPipeline,
    pub workflow: PublicationWorkflow,
    pub repository: Arc<dyn ArticleRepository>,
    pub drafts: Arc<DraftStore>,
    /// Bearer token required by mutating endpoints. `None` refuses every mutation.
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        repository: Arc<dyn ArticleRepository>,
        drafts: Arc<DraftStore>,
        config: &PipelineConfig,
        admin_token: Option<String>,
    ) -> Self {
        Self {
            pipeline: EditorialPipeline::new(model, drafts.clone(), config),
            workflow: PublicationWorkflow::new(drafts.clone(), repository.clone()),
            repository,
            drafts,
            admin_token: admin_token.filter(|t| !t.trim().is_empty()),
        }
    }
}

use press_inference::DEFAULT_FALLBACK_IMAGE;

pub const DEFAULT_BATCH_SIZE: usize = 3;
pub const DEFAULT_IMAGE_CONCURRENCY: usize = 4;
pub const DEFAULT_AUTHOR: &str = "Editorial Team";
pub const DEFAULT_SUBJECT: &str = "technology, AI and digital culture";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of drafts requested per run. Advisory: the model may return more or fewer.
    pub batch_size: usize,
    /// Upper bound on concurrent image requests.
    pub image_concurrency: usize,
    /// Byline stamped on every generated article.
    pub author: String,
    /// Subject domain the research prompt is oriented at.
    pub subject: String,
    pub fallback_image: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            image_concurrency: DEFAULT_IMAGE_CONCURRENCY,
            author: DEFAULT_AUTHOR.to_string(),
            subject: DEFAULT_SUBJECT.to_string(),
            fallback_image: DEFAULT_FALLBACK_IMAGE.to_string(),
        }
    }
}

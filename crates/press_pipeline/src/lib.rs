pub mod assembler;
pub mod config;
pub mod logging;
pub mod pipeline;
pub mod workflow;

pub use assembler::DraftAssembler;
pub use config::PipelineConfig;
pub use logging::{init_logging, Logger};
pub use pipeline::{EditorialPipeline, GenerationRun};
pub use workflow::PublicationWorkflow;

pub mod prelude {
    pub use super::{
        init_logging, DraftAssembler, EditorialPipeline, GenerationRun, PipelineConfig,
        PublicationWorkflow,
    };
    pub use press_core::{Article, ArticleStatus, Error, Result};
}

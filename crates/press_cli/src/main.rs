use clap::Parser;
use press_core::{Article, ArticleRepository, ArticleStatus, Error, Result};
use press_pipeline::{init_logging, EditorialPipeline, Logger, PipelineConfig, PublicationWorkflow};
use press_storage::{DraftStore, FileKeyValue};
use press_web::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if !current_number.is_empty() {
                let num = current_number
                    .parse::<u64>()
                    .map_err(|_| "Duration is too large".to_string())?;
                let unit = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(unit)
                    .and_then(|secs| total_seconds.checked_add(secs))
                    .ok_or_else(|| "Duration is too large".to_string())?;
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // a trailing bare number counts as seconds
        if !current_number.is_empty() {
            let num = current_number
                .parse::<u64>()
                .map_err(|_| "Duration is too large".to_string())?;
            total_seconds = total_seconds
                .checked_add(num)
                .ok_or_else(|| "Duration is too large".to_string())?;
            has_unit = true;
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be longer than zero".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "AI-assisted editorial pipeline", long_about = None)]
pub struct Cli {
    #[arg(long, default_value = "gemini", help = "Generative backend. Available models: gemini (default), dummy")]
    model: String,
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "PRESS_TEXT_MODEL")]
    text_model: Option<String>,
    #[arg(long, env = "PRESS_IMAGE_MODEL")]
    image_model: Option<String>,
    /// Timeout for each call to the generative service (e.g. 90s, 2m)
    #[arg(long, env = "PRESS_REQUEST_TIMEOUT")]
    request_timeout: Option<HumanDuration>,
    #[arg(long, default_value = "memory", help = "Article repository. Available backends: memory (default), sqlite")]
    storage: String,
    #[arg(long, env = "PRESS_DATABASE_URL")]
    database_url: Option<String>,
    #[arg(long, env = "PRESS_DRAFTS_DIR", default_value = ".press/drafts")]
    drafts_dir: PathBuf,
    #[arg(long, env = "PRESS_ADMIN_TOKEN", hide_env_values = true)]
    admin_token: Option<String>,
    #[arg(long, default_value_t = press_pipeline::config::DEFAULT_BATCH_SIZE)]
    batch_size: usize,
    #[arg(long, default_value_t = press_pipeline::config::DEFAULT_IMAGE_CONCURRENCY)]
    image_concurrency: usize,
    #[arg(long, default_value = press_pipeline::config::DEFAULT_SUBJECT)]
    subject: String,
    #[arg(long, default_value = press_pipeline::config::DEFAULT_AUTHOR)]
    author: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        #[arg(long, env = "PRESS_ADDR", default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
    /// Run the generation pipeline and queue the drafts for review
    Generate {
        /// Keep generating with the given interval (e.g. 6h, 30m, 1d, 1h15m)
        #[arg(long)]
        every: Option<HumanDuration>,
    },
    /// List queued drafts
    Drafts,
    /// Publish a queued draft
    Publish { id: String },
    /// Drop a queued draft without publishing it
    Discard { id: String },
    /// List stored articles, newest first
    Articles {
        #[arg(long)]
        status: Option<ArticleStatus>,
    },
    /// Print one stored article as JSON
    Article { slug: String },
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            batch_size: self.batch_size,
            image_concurrency: self.image_concurrency,
            author: self.author.clone(),
            subject: self.subject.clone(),
            ..PipelineConfig::default()
        }
    }

    fn inference_config(&self) -> press_inference::Config {
        press_inference::Config {
            api_key: self.api_key.clone(),
            model_name: self.text_model.clone(),
            image_model_name: self.image_model.clone(),
            base_url: None,
            request_timeout: self.request_timeout.as_ref().map(|t| t.0),
        }
    }
}

/// Checks the repository with a read, retrying while it comes up.
async fn check_repository(repository: &Arc<dyn ArticleRepository>, storage_type: &str, max_retries: u32, timeout: Duration) -> Result<()> {
    let mut retries = 0;
    let mut last_error = None;

    while retries < max_retries {
        match tokio::time::timeout(timeout, repository.list(Some(ArticleStatus::Published))).await {
            Ok(Ok(articles)) => {
                info!("🏦 Repository ready (using {}, {} published articles)", storage_type, articles.len());
                return Ok(());
            }
            Ok(Err(e)) => last_error = Some(e),
            Err(elapsed) => {
                last_error = Some(Error::Storage(format!("Repository health check timed out: {}", elapsed)));
            }
        }
        retries += 1;
        if retries < max_retries {
            info!("Repository health check failed, retrying {}/{}...", retries, max_retries);
            tokio::time::sleep(Duration::from_secs(2)).await;
        }
    }

    Err(last_error.unwrap_or_else(|| Error::Storage("Repository health check failed after all retries".to_string())))
}

fn print_articles(articles: &[Article]) {
    if articles.is_empty() {
        println!("(none)");
        return;
    }
    for article in articles {
        println!(
            "{}  {:<9}  {:<40}  {}",
            article.id, article.status.as_str(), article.slug, article.title
        );
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn generate_once(pipeline: &EditorialPipeline) -> Result<()> {
    let run = pipeline.run().await?;
    print_articles(&run.articles);
    if !run.sources.is_empty() {
        println!("\nSources:");
        for source in &run.sources {
            println!("- {} ({})", source.title, source.uri);
        }
    }
    Ok(())
}

/// Runs the pipeline every `interval` until `max_runs` is reached, if given.
/// A failed run is logged and the schedule continues. Returns the number of failed runs.
async fn run_every(pipeline: &EditorialPipeline, logger: &Logger, interval: Duration, max_runs: Option<usize>) -> usize {
    let mut runs = 0;
    let mut failures = 0;
    loop {
        if let Err(e) = generate_once(pipeline).await {
            failures += 1;
            logger.error(&format!("Generation run failed: {}", e));
        }
        runs += 1;
        if max_runs.is_some_and(|max| runs >= max) {
            return failures;
        }
        info!("Waiting {}s before next run", interval.as_secs());
        tokio::time::sleep(interval).await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let logger = init_logging();
    let cli = Cli::parse();

    let kv = FileKeyValue::new(&cli.drafts_dir).await?;
    info!("🗂️ Draft queue at {}", kv.dir().display());
    let drafts = Arc::new(DraftStore::new(Arc::new(kv)));

    let repository = press_storage::create_repository(&cli.storage, cli.database_url.as_deref()).await?;
    info!("💾 Checking repository connection...");
    check_repository(&repository, &cli.storage, 3, Duration::from_secs(10)).await?;

    let config = cli.pipeline_config();
    let inference_config = cli.inference_config();

    match cli.command {
        Commands::Serve { addr } => {
            let model = press_inference::create_model(&cli.model, inference_config)?;
            let state = AppState::new(model, repository, drafts, &config, cli.admin_token);
            press_web::serve(state, addr).await?;
        }
        Commands::Generate { every } => {
            let model = press_inference::create_model(&cli.model, inference_config)?;
            let pipeline = EditorialPipeline::new(model, drafts, &config);

            if let Some(interval) = every {
                info!("Running in periodic mode with {}s interval", interval.0.as_secs());
                run_every(&pipeline, &logger, interval.0, None).await;
            } else {
                generate_once(&pipeline).await?;
            }
        }
        Commands::Drafts => {
            print_articles(&drafts.list().await?);
        }
        Commands::Publish { id } => {
            let workflow = PublicationWorkflow::new(drafts, repository);
            let article = workflow.publish(&id).await?;
            println!("Published {} at /{}", article.title, article.slug);
        }
        Commands::Discard { id } => {
            let workflow = PublicationWorkflow::new(drafts, repository);
            let article = workflow.discard(&id).await?;
            println!("Discarded {}", article.title);
        }
        Commands::Articles { status } => {
            print_articles(&repository.list(status).await?);
        }
        Commands::Article { slug } => {
            let article = repository
                .get_by_slug(&slug)
                .await?
                .ok_or(Error::NotFound(slug))?;
            print_json(&article)?;
        }
    }

    Ok(())
}

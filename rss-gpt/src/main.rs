use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use rss_gpt::index::{append_readme, readme_links, render_index, write_index};
use rss_gpt::logging::configure_logging;
use rss_gpt::{
    load_config, Environment, FetchConfig, HistoryStore, HttpFeedFetcher, OpenAiSummarizer, SectionListing,
    SectionPipeline, SectionStatus, SummarizationOrchestrator, Summarizer,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Fetch the configured feeds, summarize new entries and publish one RSS
/// file per section.
#[derive(Debug, Parser)]
#[command(name = "rss-gpt", version, about)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Only run the named sections
    #[arg(long = "section")]
    sections: Vec<String>,

    /// README files whose trailing link list is rewritten
    #[arg(long = "readme", default_values = ["README.md", "README-zh.md"])]
    readmes: Vec<PathBuf>,

    /// Do not write index.html
    #[arg(long)]
    no_index: bool,

    /// Also log to a daily rolling file in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // A missing .env is normal in CI.
    let _ = dotenvy::dotenv();
    configure_logging(cli.log_dir.as_deref());

    info!("Starting RSS-GPT");

    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    let environment = Environment::from_env();
    let deployment_url = environment.deployment_url();

    fs::create_dir_all(&config.cfg.base)
        .with_context(|| format!("failed to create output directory {}", config.cfg.base.display()))?;

    let summarizer: Option<Arc<dyn Summarizer>> = match environment.api_key.clone() {
        Some(api_key) => Some(Arc::new(
            OpenAiSummarizer::new(
                api_key,
                &environment.base_url,
                environment.proxy.as_deref(),
                config.cfg.prompt_settings(),
            )
            .context("failed to build the OpenAI client")?,
        )),
        None => None,
    };

    let fetcher = HttpFeedFetcher::new(FetchConfig::default()).context("failed to build the HTTP client")?;
    let pipeline = SectionPipeline::new(
        Arc::new(fetcher),
        SummarizationOrchestrator::new(summarizer, config.cfg.summary_policy()),
        HistoryStore::new(&config.cfg.base),
        config.cfg.max_entries,
        deployment_url.clone(),
    );

    for raw in &config.sections {
        if !cli.sections.is_empty() && !cli.sections.iter().any(|name| name == raw.display_name()) {
            continue;
        }

        let report = pipeline.run(raw).await;
        match &report.status {
            SectionStatus::Completed => info!(
                "{}: completed ({} new, {} retained)",
                report.name, report.appended, report.retained
            ),
            SectionStatus::CompletedWithFetchErrors => warn!(
                "{}: completed with fetch errors for {:?} ({} new, {} retained)",
                report.name, report.failed_urls, report.appended, report.retained
            ),
            SectionStatus::Failed(reason) => error!("{}: failed: {}", report.name, reason),
        }
    }

    let listings: Vec<SectionListing> = config.sections.iter().filter_map(SectionListing::from_raw).collect();

    if !cli.no_index {
        let updated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let html = render_index(&listings, deployment_url.as_deref(), &updated_at);
        if let Err(e) = write_index(&config.cfg.base, &html) {
            error!("Failed to write index page: {}", e);
        }
    }

    let links = readme_links(&listings, deployment_url.as_deref());
    for readme in &cli.readmes {
        if let Err(e) = append_readme(readme, &links) {
            error!("Failed to update {}: {}", readme.display(), e);
        }
    }

    info!("RSS-GPT finished");
    Ok(())
}

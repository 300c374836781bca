pub mod types;
pub mod traits;
pub mod utils;
pub mod config;
pub mod environment;
pub mod logging;
pub mod sanitize;
pub mod normalizer;
pub mod filter;
pub mod fetcher;
pub mod parser;
pub mod summarizer;
pub mod orchestrator;
pub mod accumulator;
pub mod history;
pub mod render;
pub mod pipeline;
pub mod index;

pub use types::*;
pub use traits::{FeedFetcher, Summarizer};
pub use config::{load_config, ConfigFile, GlobalConfig, RawSection, SectionConfig};
pub use environment::Environment;
pub use filter::{evaluate, FeedFilter, FilterMode, FilterTarget};
pub use fetcher::{FetchLog, HttpFeedFetcher};
pub use parser::FeedParser;
pub use summarizer::{OpenAiSummarizer, PromptSettings};
pub use orchestrator::{SummarizationOrchestrator, SummaryPolicy};
pub use accumulator::RunAccumulator;
pub use history::HistoryStore;
pub use render::FeedWriter;
pub use pipeline::SectionPipeline;
pub use index::SectionListing;

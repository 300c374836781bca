use std::io;
use std::path::Path;
use tracing_appender::rolling;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Stdout logging filtered by `RUST_LOG`, plus a daily rolling file under
/// `log_dir` when one is given.
pub fn configure_logging(log_dir: Option<&Path>) {
    let stdout_log = fmt::layer().with_writer(io::stdout).with_filter(env_filter());

    let file_log = log_dir.map(|dir| {
        let file_appender = rolling::daily(dir, "rss-gpt.log");
        fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender)
            .with_filter(env_filter())
    });

    tracing_subscriber::Registry::default()
        .with(stdout_log)
        .with(file_log)
        .init();
}

use anyhow::{Context, Result};
use clap::Parser;
use postanalyzer::cli::Cli;
use postanalyzer::settings::{Config, LogLevel};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = cli
        .config
        .as_deref()
        .map(|path| {
            Config::load(path)
                .with_context(|| format!("Failed to load settings: {}", path.display()))
        })
        .transpose()?;

    let level = cli
        .log_level
        .or_else(|| config.as_ref().and_then(|c| c.log_level))
        .unwrap_or_default();
    init_logging(level);

    postanalyzer::run(&cli, config.as_ref())
}

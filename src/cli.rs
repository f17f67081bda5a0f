use crate::settings::LogLevel;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Inspect blog posts and report on SEO fields and images
#[derive(Parser, Debug)]
#[command(name = "postanalyzer", version, about)]
pub struct Cli {
    /// Settings file (TOML) with platform, API keys and author
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log verbosity. RUST_LOG takes precedence when set.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze one post and write its report
    Analyze {
        /// Path to the site snapshot (JSON)
        input: PathBuf,

        /// Id of the post to analyze
        #[arg(short, long)]
        post_id: u64,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Output file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit single-line JSON instead of pretty-printed
        #[arg(long, default_value_t = false)]
        compact: bool,
    },

    /// List posts, newest first
    Posts {
        /// Path to the site snapshot (JSON)
        input: PathBuf,

        /// Maximum number of posts; 0 lists all
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },

    /// List users who can write posts, by display name
    Users {
        /// Path to the site snapshot (JSON)
        input: PathBuf,

        /// Maximum number of users; 0 lists all
        #[arg(short, long, default_value_t = 100)]
        limit: usize,

        /// Only users with this role
        #[arg(short, long)]
        role: Option<String>,
    },

    /// Validate the settings file against the site's users
    Settings {
        /// Path to the site snapshot (JSON)
        input: PathBuf,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

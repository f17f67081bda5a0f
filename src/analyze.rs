use crate::blocks::WpBlockParser;
use crate::cli::{Cli, Command, OutputFormat};
use crate::report::{analyze_post, list_posts, list_users};
use crate::settings::Config;
use crate::snapshot::SiteSnapshot;
use crate::summary;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Execute one CLI command
pub fn run(cli: &Cli, config: Option<&Config>) -> Result<()> {
    match &cli.command {
        Command::Analyze {
            input,
            post_id,
            format,
            output,
            compact,
        } => {
            let site = open_snapshot(input)?;
            let report = analyze_post(&site, &WpBlockParser, *post_id)
                .with_context(|| format!("Failed to analyze post {}", post_id))?;

            let rendered = match format {
                OutputFormat::Json => to_json(&report, *compact)?,
                OutputFormat::Markdown => summary::format_report(&report),
            };
            emit(output.as_deref(), &rendered)?;

            if let Some(path) = output {
                let image_count = report.attached_images.len()
                    + usize::from(report.featured_image.is_some());
                eprintln!(
                    "Analyzed post {}{} to {}",
                    post_id,
                    if image_count > 0 {
                        format!(" ({} images)", image_count)
                    } else {
                        String::new()
                    },
                    path.display()
                );
            }
        }
        Command::Posts { input, limit } => {
            let site = open_snapshot(input)?;
            let posts = list_posts(&site, *limit);
            emit(None, &to_json(&posts, false)?)?;
        }
        Command::Users { input, limit, role } => {
            let site = open_snapshot(input)?;
            let users = list_users(&site, *limit, role.as_deref());
            emit(None, &to_json(&users, false)?)?;
        }
        Command::Settings { input } => {
            let Some(config) = config else {
                bail!("The settings command needs --config <FILE>");
            };
            let site = open_snapshot(input)?;
            let settings_summary = config
                .settings
                .summary(&site)
                .context("Settings are not valid for this site")?;
            emit(None, &to_json(&settings_summary, false)?)?;
        }
    }

    Ok(())
}

fn open_snapshot(path: &Path) -> Result<SiteSnapshot> {
    SiteSnapshot::open(path)
        .with_context(|| format!("Failed to load site snapshot: {}", path.display()))
}

fn to_json<T: Serialize>(value: &T, compact: bool) -> Result<String> {
    let mut json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    json.push('\n');
    Ok(json)
}

/// Write to a file, creating parent directories, or to stdout
fn emit(output: Option<&Path>, content: &str) -> Result<()> {
    let Some(path) = output else {
        print!("{}", content);
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;

    Ok(())
}

mod render;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bodystyle_common::{BodyRange, BodyRangeList};
use bodystyle_config::{AppConfig, ConfigLoader, LogConfig, OutputFormat};
use clap::Parser;
use serde::Deserialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bodystyle", version, about = "Strip inline markdown from a message body")]
struct Cli {
    /// Message body. Read from stdin when neither this nor --file is given.
    #[arg(conflicts_with = "file")]
    body: Option<String>,

    /// Read the body from a file.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// JSON file with pre-existing ranges, in the marked-up body's offsets.
    #[arg(short, long)]
    ranges: Option<PathBuf>,

    /// Config file (default: ~/.bodystyle/config.toml).
    #[arg(short, long, env = "BODYSTYLE_CONFIG")]
    config: Option<PathBuf>,

    /// Output format, overriding the config.
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Skip range validation.
    #[arg(long)]
    lenient: bool,
}

/// Ranges may be given as a full list object or as a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum RangesInput {
    Bare(Vec<BodyRange>),
    List(BodyRangeList),
}

impl From<RangesInput> for BodyRangeList {
    fn from(input: RangesInput) -> Self {
        match input {
            RangesInput::Bare(ranges) => BodyRangeList::new(ranges),
            RangesInput::List(list) => list,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        ConfigLoader::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if cli.lenient {
        config.process.strict_ranges = false;
    }

    init_tracing(&config.log);
    debug!(?config, "configuration resolved");

    run(&cli, &config)
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(cli: &Cli, config: &AppConfig) -> Result<()> {
    let body = read_body(cli)?;
    let ranges = cli.ranges.as_deref().map(read_ranges).transpose()?;

    let (plain, ranges) = if config.process.strict_ranges {
        bodystyle_markdown::try_process(&body, ranges.as_ref())
            .context("supplied ranges do not fit the body")?
    } else {
        bodystyle_markdown::process(&body, ranges.as_ref())
    };
    info!(
        ranges = ranges.as_ref().map_or(0, |r| r.len()),
        "processed body"
    );

    let rendered = match config.output.format {
        OutputFormat::Text => render::text(&plain, ranges.as_ref()),
        OutputFormat::Json => render::json(&plain, ranges.as_ref(), config.output.pretty)?,
    };
    println!("{rendered}");
    Ok(())
}

fn read_body(cli: &Cli) -> Result<String> {
    if let Some(body) = &cli.body {
        return Ok(body.clone());
    }
    if let Some(path) = &cli.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read body from {}", path.display()));
    }

    let mut body = String::new();
    std::io::stdin()
        .read_to_string(&mut body)
        .context("failed to read body from stdin")?;
    // Drop the newline a shell pipe adds.
    if body.ends_with('\n') {
        body.pop();
        if body.ends_with('\r') {
            body.pop();
        }
    }
    Ok(body)
}

fn read_ranges(path: &std::path::Path) -> Result<BodyRangeList> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read ranges from {}", path.display()))?;
    let input: RangesInput = serde_json::from_str(&content)
        .with_context(|| format!("invalid ranges JSON in {}", path.display()))?;
    Ok(input.into())
}

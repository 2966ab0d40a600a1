//! ozon-crawler - Product harvester for the Ozon storefront
//!
//! Prints a JSON array of product records for a search query.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use ozon_crawler::commands::HarvestCommand;
use ozon_crawler::config::{Config, OutputFormat};
use ozon_crawler::format::Formatter;
use std::path::PathBuf;
use tracing::{error, warn, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ozon-crawler",
    version,
    about = "Harvest product data from Ozon search results",
    long_about = "Searches Ozon in a headless browser, visits each product on the first results view and prints the extracted records as JSON."
)]
struct Cli {
    /// Search query (words are joined with spaces)
    query: Vec<String>,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Readiness wait timeout in milliseconds
    #[arg(long, env = "OZON_TIMEOUT")]
    timeout: Option<u64>,

    /// Delay between product pages in milliseconds
    #[arg(long, env = "OZON_DELAY")]
    delay: Option<u64>,

    /// Maximum number of products to visit
    #[arg(short, long)]
    max_items: Option<usize>,

    /// Path to the Chrome/Chromium executable
    #[arg(long, env = "OZON_CHROME_PATH")]
    chrome: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    headful: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let (args, ignored) = split_unknown_flags(std::env::args());
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                let _ = e.print();
                return;
            }
            eprintln!("{}", e);
            println!("{}", Formatter::new(OutputFormat::Json).format_records(&[]));
            return;
        }
    };

    // Initialize logging; stdout carries only data
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    for flag in &ignored {
        warn!("ignoring unknown flag {}", flag);
    }

    let format = cli.format.unwrap_or_default();
    let output = match run(cli).await {
        Ok(output) => output,
        Err(e) => {
            error!("{:#}", e);
            Formatter::new(format).format_records(&[])
        }
    };

    println!("{}", output);
}

/// Separates unknown long flags from the arguments clap should see.
///
/// Only the flag token itself is removed; a following value stays in place
/// and becomes a query word. Everything after a bare `--` is kept.
fn split_unknown_flags(args: impl IntoIterator<Item = String>) -> (Vec<String>, Vec<String>) {
    let command = Cli::command();
    let known: Vec<&str> = command
        .get_arguments()
        .filter_map(|arg| arg.get_long())
        .chain(["help", "version"])
        .collect();

    let mut kept = Vec::new();
    let mut ignored = Vec::new();
    let mut positional_only = false;

    for arg in args {
        if positional_only || !arg.starts_with("--") {
            kept.push(arg);
            continue;
        }
        if arg == "--" {
            positional_only = true;
            kept.push(arg);
            continue;
        }

        let name = arg[2..].split('=').next().unwrap_or_default();
        if known.contains(&name) {
            kept.push(arg);
        } else {
            ignored.push(arg);
        }
    }

    (kept, ignored)
}

async fn run(cli: Cli) -> Result<String> {
    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(timeout) = cli.timeout {
        config.wait_timeout_ms = timeout;
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(max) = cli.max_items {
        config.max_items = Some(max);
    }
    if let Some(chrome) = cli.chrome {
        config.chrome_path = Some(chrome);
    }
    if cli.headful {
        config.headless = false;
    }

    let query = cli.query.join(" ");
    let cmd = HarvestCommand::new(config);
    cmd.execute(&query).await
}

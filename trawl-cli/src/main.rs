//! trawl - parse markup into a page model and print it.
//!
//! - `trawl page.html`                  # summary of a local file
//! - `trawl --html '<a href=x>hi</a>'`  # inline markup
//! - `trawl --url https://example.com`  # fetch first
//! - `trawl --json page.html`           # the whole page model as JSON

mod summary;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, ArgGroup, Parser};
use tracing_subscriber::EnvFilter;
use trawl_browser::{Browser, BrowserConfig, HttpFetcher};
use trawl_html::{PageBuilder, ParserConfig};
use trawl_page::Page;

/// trawl - find the links, forms and frames in a page
#[derive(Parser, Debug)]
#[command(name = "trawl")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("input").required(true).args(["path", "html", "url"])))]
#[command(after_help = r#"EXAMPLES:
    # Summarise a local file
    trawl ./index.html

    # Parse inline markup, only looking at links
    trawl --tags a --html '<a href="/next">Next</a>'

    # Fetch a page and dump it as JSON
    trawl --json --url https://example.com

    # Parser settings from a file
    trawl --config parser.json ./index.html
"#)]
struct Cli {
    /// Path to an HTML file
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Parse an HTML string directly
    #[arg(long, value_name = "HTML")]
    html: Option<String>,

    /// Fetch and parse a URL
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Comma-separated tags to recognise (default: every tag the page model uses)
    #[arg(long, value_name = "TAGS", value_delimiter = ',')]
    tags: Option<Vec<String>>,

    /// Match tag names with exact case
    #[arg(long)]
    case_sensitive: bool,

    /// Read parser settings from a JSON file; other flags override it
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the page model as JSON
    #[arg(long)]
    json: bool,

    /// More logging (-v info, -vv debug, -vvv trace); RUST_LOG wins if set
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = parser_config(&cli)?;
    tracing::debug!(tags = ?config.tags, case_sensitive = config.case_sensitive, "parser config");
    let page = load_page(&cli, config)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        summary::print_page(&page);
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Parser settings: the `--config` file (or defaults), then flag overrides.
fn parser_config(cli: &Cli) -> Result<ParserConfig> {
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => ParserConfig::default(),
    };
    if let Some(tags) = &cli.tags {
        config = config.with_tags(tags.iter().map(|tag| tag.trim()).filter(|tag| !tag.is_empty()));
    }
    if cli.case_sensitive {
        config = config.with_case_sensitive(true);
    }
    Ok(config)
}

fn read_config(path: &Path) -> Result<ParserConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid config {}", path.display()))
}

fn load_page(cli: &Cli, config: ParserConfig) -> Result<Page> {
    if let Some(url) = &cli.url {
        let fetcher = HttpFetcher::new()?;
        let mut browser =
            Browser::with_config(fetcher, BrowserConfig::default().with_parser(config));
        let _ = browser
            .get(url)
            .with_context(|| format!("failed to load {url}"))?;
        if let Some(status) = browser.response_code().filter(|status| !(200..300).contains(status))
        {
            tracing::warn!(%url, status, "server returned an error status");
        }
        return browser.page().cloned().context("no page was loaded");
    }

    if let Some(html) = &cli.html {
        return PageBuilder::parse_with_config(html, &config).context("failed to parse markup");
    }

    let path = cli.path.as_deref().context("no input given")?;
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    PageBuilder::parse_with_config(&raw, &config)
        .with_context(|| format!("failed to parse {}", path.display()))
}

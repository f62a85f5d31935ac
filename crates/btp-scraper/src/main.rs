use anyhow::{Context, Result};
use btp_scraper::{ScrapeConfig, Selectors};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "btp-scraper",
    about = "Scrape the Borsa Italiana BTP listing into a CSV file",
    version,
    after_help = "Run with no arguments to scrape the full listing into data.csv."
)]
struct Cli {
    /// Output CSV path ("-" for stdout)
    #[arg(long, short, default_value = btp_scraper::config::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Listing URL; pages are requested as <URL>?page=N
    #[arg(long, default_value = btp_scraper::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// First page index (zero-based)
    #[arg(long, default_value = "0")]
    start_page: u32,

    /// Stop after this many pages
    #[arg(long)]
    max_pages: Option<u32>,

    /// Wait budget for each document lookup, in milliseconds
    #[arg(long, default_value = "10000")]
    timeout_ms: u64,

    /// Delay between document polls, in milliseconds
    #[arg(long, default_value = "500")]
    poll_ms: u64,

    /// Navigation timeout, in milliseconds
    #[arg(long, default_value = "30000")]
    nav_timeout_ms: u64,

    /// Chromium/Chrome binary to launch
    #[arg(long)]
    chrome: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    headful: bool,

    /// JSON file replacing the built-in CSS selectors
    #[arg(long)]
    selectors: Option<PathBuf>,

    /// Enable verbose/debug logging
    #[arg(long, short, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(long, short)]
    quiet: bool,
}

impl Cli {
    fn into_config(self) -> Result<ScrapeConfig> {
        let mut config = ScrapeConfig::from_env();
        config.output = self.output;
        config.base_url = self.base_url;
        config.start_page = self.start_page;
        config.max_pages = self.max_pages;
        config.wait.timeout_ms = self.timeout_ms;
        config.wait.poll_interval_ms = self.poll_ms;
        config.navigation_timeout_ms = self.nav_timeout_ms;
        if self.chrome.is_some() {
            config.browser.chrome_path = self.chrome;
        }
        config.browser.headless = !self.headful;
        if let Some(path) = &self.selectors {
            config.selectors = Selectors::load(path)
                .with_context(|| format!("failed to load selectors from {}", path.display()))?;
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default = if verbose {
        "btp_scraper=debug"
    } else if quiet {
        "btp_scraper=warn"
    } else {
        "btp_scraper=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result: Result<()> = async {
        let config = cli.into_config()?;
        let summary = btp_scraper::run(&config).await.context("scrape failed")?;
        if let Some(path) = &summary.output {
            eprintln!(
                "  Wrote {} records from {} pages to {}",
                summary.records,
                summary.pages,
                path.display()
            );
        }
        Ok(())
    }
    .await;

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = result {
        eprintln!("  Error: {e:#}");
        std::process::exit(1);
    }
}

//! Run orchestration: acquire the browser, crawl, release, write.

use crate::config::ScrapeConfig;
use crate::crawler::{Crawler, ResultSet};
use crate::error::Result;
use crate::output;
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::{RenderContext, Renderer};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub records: usize,
    pub pages: u32,
    pub empty_pages: Vec<u32>,
    /// `None` when the CSV went to stdout.
    pub output: Option<PathBuf>,
    pub elapsed_ms: u64,
}

/// Crawl with `renderer`, then release it.
///
/// The context is closed and the renderer shut down on every path, including
/// a crawl aborted by a structural fault. A crawl error takes precedence
/// over teardown errors, which are only logged in that case.
pub async fn scrape<R: Renderer>(renderer: R, config: &ScrapeConfig) -> Result<ResultSet> {
    let outcome = crawl_once(&renderer, config).await;

    let released = renderer.shutdown().await;
    match (outcome, released) {
        (Ok(results), Ok(())) => Ok(results),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), released) => {
            if let Err(teardown) = released {
                warn!(error = %teardown, "renderer shutdown failed after crawl error");
            }
            Err(e)
        }
    }
}

async fn crawl_once<R: Renderer>(renderer: &R, config: &ScrapeConfig) -> Result<ResultSet> {
    let crawler = Crawler::new(config)?;
    let mut ctx = renderer.new_context().await?;

    let outcome = crawler.crawl(&mut ctx, config.start_page).await;
    let closed = ctx.close().await;
    match (outcome, closed) {
        (Ok(results), closed) => closed.map(|()| results),
        (Err(e), closed) => {
            if let Err(teardown) = closed {
                warn!(error = %teardown, "closing context failed after crawl error");
            }
            Err(e)
        }
    }
}

/// Scrape with `renderer` and write the CSV named in `config`.
///
/// Nothing is written unless the whole crawl succeeded.
pub async fn run_with<R: Renderer>(renderer: R, config: &ScrapeConfig) -> Result<RunSummary> {
    let start = Instant::now();
    let results = scrape(renderer, config).await?;

    let output = if config.writes_to_stdout() {
        output::write_records(std::io::stdout().lock(), results.records())?;
        None
    } else {
        output::write_csv(&config.output, results.records())?;
        Some(config.output.clone())
    };

    let summary = RunSummary {
        records: results.len(),
        pages: results.pages_fetched(),
        empty_pages: results.empty_pages().to_vec(),
        output,
        elapsed_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        records = summary.records,
        pages = summary.pages,
        empty_pages = ?summary.empty_pages,
        elapsed_ms = summary.elapsed_ms,
        "run complete"
    );
    Ok(summary)
}

/// Launch Chromium and run against the live listing.
pub async fn run(config: &ScrapeConfig) -> Result<RunSummary> {
    config.validate()?;
    let renderer = ChromiumRenderer::launch(&config.browser).await?;
    run_with(renderer, config).await
}

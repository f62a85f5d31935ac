//! Pagination walker.
//!
//! Fetches `{base_url}?page=n` for n = start, start+1, ... and stops at the
//! first page without a next-page control. Each step strictly increments the
//! page index, so the walk ends once the site runs out of pages (or the
//! optional `max_pages` guard trips).

use crate::config::ScrapeConfig;
use crate::error::{Result, ScrapeError};
use crate::extraction::{Record, RecordExtractor};
use crate::locator::{Locator, Scope};
use crate::renderer::RenderContext;
use tracing::{debug, info, warn};
use url::Url;

/// Records of one listing page, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub index: u32,
    pub records: Vec<Record>,
    /// A next-page control was present.
    pub has_more: bool,
}

/// All records of a crawl, page order then document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    records: Vec<Record>,
    pages_fetched: u32,
    empty_pages: Vec<u32>,
}

impl ResultSet {
    pub fn push_page(&mut self, page: Page) {
        self.pages_fetched += 1;
        if page.records.is_empty() {
            self.empty_pages.push(page.index);
        }
        self.records.extend(page.records);
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Pages that produced no records: either genuinely empty or not
    /// rendered within the wait budget. The two cannot be told apart.
    pub fn empty_pages(&self) -> &[u32] {
        &self.empty_pages
    }
}

/// Walks the listing's pages with one render context.
pub struct Crawler<'a> {
    config: &'a ScrapeConfig,
    locator: Locator,
    base_url: Url,
}

impl<'a> Crawler<'a> {
    pub fn new(config: &'a ScrapeConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url).map_err(|e| {
            ScrapeError::Config(format!("invalid base URL {}: {e}", config.base_url))
        })?;

        // the walker owns `page`; keep every other query pair
        let kept: Vec<(String, String)> = base_url
            .query_pairs()
            .filter(|(k, _)| k != "page")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        if kept.is_empty() {
            base_url.set_query(None);
        } else {
            base_url.query_pairs_mut().clear().extend_pairs(kept);
        }
        Ok(Self {
            config,
            locator: Locator::new(config.wait),
            base_url,
        })
    }

    /// URL of listing page `index`.
    pub fn page_url(&self, index: u32) -> String {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("page", &index.to_string());
        url.to_string()
    }

    /// Fetch one page and extract every record on it.
    pub async fn fetch_page<C: RenderContext>(&self, ctx: &mut C, index: u32) -> Result<Page> {
        let selectors = &self.config.selectors;
        let url = self.page_url(index);
        info!(page = index, %url, "fetching page");

        let containers = match ctx.navigate(&url, self.config.navigation_timeout_ms).await {
            Ok(nav) => {
                debug!(page = index, load_time_ms = nav.load_time_ms, final_url = %nav.final_url, "page loaded");
                self.locator
                    .locate_all(&selectors.record_container, Scope::Document(&*ctx))
                    .await?
            }
            Err(e) if e.is_transient() => {
                warn!(page = index, error = %e, "page not loaded, no records taken from it");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        if containers.is_empty() {
            warn!(page = index, "no record containers found");
        }

        let extractor = RecordExtractor::new(&self.locator, selectors);
        let mut records = Vec::with_capacity(containers.len());
        for container in &containers {
            records.push(extractor.extract::<C>(container).await?);
        }

        let has_more = self
            .locator
            .locate(&selectors.next_page, Scope::Document(&*ctx))
            .await?
            .is_some();

        info!(page = index, records = records.len(), has_more, "page done");
        Ok(Page {
            index,
            records,
            has_more,
        })
    }

    /// Walk pages from `start_page` until no next-page control remains.
    ///
    /// Any structural fault aborts the whole walk.
    pub async fn crawl<C: RenderContext>(&self, ctx: &mut C, start_page: u32) -> Result<ResultSet> {
        let mut results = ResultSet::default();
        let mut index = start_page;

        loop {
            let page = self.fetch_page(ctx, index).await?;
            let has_more = page.has_more;
            results.push_page(page);

            if !has_more {
                break;
            }
            if let Some(max) = self.config.max_pages {
                if results.pages_fetched() >= max {
                    warn!(max_pages = max, next_page = index + 1, "page limit reached, stopping early");
                    break;
                }
            }
            index += 1;
        }

        info!(
            records = results.len(),
            pages = results.pages_fetched(),
            "crawl complete"
        );
        Ok(results)
    }
}

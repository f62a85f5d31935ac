//! btp-scraper: extracts the Borsa Italiana BTP listing into CSV.
//!
//! The listing renders client-side, so pages are loaded in a headless
//! browser. The engine waits for record containers, extracts each record,
//! follows the pagination arrow until it disappears and hands the ordered
//! records to the CSV writer.

pub mod config;
pub mod crawler;
pub mod error;
pub mod extraction;
pub mod locator;
pub mod output;
pub mod renderer;
pub mod scrape;

pub use config::{BrowserOptions, ScrapeConfig, Selectors, WaitPolicy};
pub use crawler::{Crawler, Page, ResultSet};
pub use error::{Result, ScrapeError};
pub use extraction::{Record, RecordExtractor};
pub use locator::{Locator, Scope};
pub use scrape::{run, run_with, scrape, RunSummary};

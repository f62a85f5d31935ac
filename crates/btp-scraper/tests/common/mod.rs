//! Listing fixtures shaped like the rendered BTP list.

#![allow(dead_code)]

use btp_scraper::{ScrapeConfig, WaitPolicy};

pub const BASE_URL: &str = "https://www.borsaitaliana.it/borsa/obbligazioni/mot/btp/lista.html";

pub struct Listing<'a> {
    pub isin: &'a str,
    pub description: &'a str,
    /// Raw inner HTML of the metrics block.
    pub metrics: &'a str,
}

impl<'a> Listing<'a> {
    pub fn new(isin: &'a str, description: &'a str, metrics: &'a str) -> Self {
        Self {
            isin,
            description,
            metrics,
        }
    }
}

pub fn metrics_html(ultimo: &str, cedola: &str, scadenza: &str) -> String {
    format!(
        r#"
        <div class="l-flex">
          <span class="t-text -uppercase">Ultimo:</span>
          <span class="t-text -right">{ultimo}</span>
        </div>
        <div class="l-flex">
          <span class="t-text -uppercase">Cedola:</span>
          <span class="t-text -right">{cedola}</span>
        </div>
        <div class="l-flex">
          <span class="t-text -uppercase">Scadenza:</span>
          <span class="t-text -right">{scadenza}</span>
        </div>"#
    )
}

pub fn article(listing: &Listing<'_>) -> String {
    format!(
        r#"
    <article class="u-hidden -sm -md">
      <div class="l-box -pb">
        <a href="/borsa/obbligazioni/mot/btp/scheda/{isin}.html?lang=it" class="u-block">
          <span class="t-text -flola-bold -size-xs">
            {isin} -
          </span>
        </a>
        <span class="t-text -normal"> {description} </span>
      </div>
      <div class="l-box">{metrics}
      </div>
    </article>"#,
        isin = listing.isin,
        description = listing.description,
        metrics = listing.metrics,
    )
}

/// A full listing page: desktop articles, a mobile duplicate that must be
/// ignored, and an optional next-page arrow.
pub fn listing_page(listings: &[Listing<'_>], has_next: bool) -> String {
    let articles: String = listings.iter().map(article).collect();
    let mobile: String = listings
        .iter()
        .map(|l| {
            format!(
                r#"<article class="u-hidden -lg"><div class="l-box"><a href="/m/{0}"><span class="t-text">M{0}</span></a></div></article>"#,
                l.isin
            )
        })
        .collect();
    let next = if has_next {
        r##"<a href="#"><span class="m-icon -pagination-right"></span></a>"##
    } else {
        ""
    };
    format!(
        r#"<!DOCTYPE html><html><head><title>BTP</title></head><body>
    <section class="m-list">{articles}{mobile}</section>
    <nav class="m-pagination"><span class="m-icon -pagination-left"></span>{next}</nav>
    </body></html>"#
    )
}

pub fn page_url(index: u32) -> String {
    format!("{BASE_URL}?page={index}")
}

/// Config with a short wait budget so absent lookups resolve quickly.
pub fn fast_config() -> ScrapeConfig {
    ScrapeConfig {
        wait: WaitPolicy {
            timeout_ms: 60,
            poll_interval_ms: 10,
        },
        navigation_timeout_ms: 1_000,
        ..ScrapeConfig::default()
    }
}

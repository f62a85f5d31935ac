//! Run configuration: target listing, wait policy, browser options and the
//! markup contract.
//!
//! Values resolve in three layers: built-in defaults, then environment
//! variables, then whatever the CLI overrides on top.

use crate::error::{Result, ScrapeError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Listing scraped when no base URL is given.
pub const DEFAULT_BASE_URL: &str =
    "https://www.borsaitaliana.it/borsa/obbligazioni/mot/btp/lista.html";

/// Output file written when no path is given.
pub const DEFAULT_OUTPUT: &str = "data.csv";

/// Environment variable naming the Chromium binary.
pub const CHROMIUM_PATH_ENV: &str = "BTP_SCRAPER_CHROMIUM_PATH";

/// Embedded copy of the selectors the extractor relies on.
const SELECTORS_JSON: &str = include_str!("selectors.json");

/// Bounded wait used by document-scope lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitPolicy {
    /// How long a lookup waits for the selector to match.
    pub timeout_ms: u64,
    /// Delay between two polls of the document.
    pub poll_interval_ms: u64,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            poll_interval_ms: 500,
        }
    }
}

impl WaitPolicy {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// How the browser process is launched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserOptions {
    pub headless: bool,
    /// Explicit browser binary. Falls back to discovery when unset.
    pub chrome_path: Option<PathBuf>,
    /// Additional command-line switches passed to the browser.
    pub extra_args: Vec<String>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            extra_args: Vec::new(),
        }
    }
}

/// CSS selectors describing the listing markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selectors {
    /// One bond listing in the desktop article list.
    pub record_container: String,
    /// Field blocks inside a record: identity first, metrics second.
    pub field_block: String,
    /// Link to the instrument detail page, inside the identity block.
    pub identity_anchor: String,
    /// Label carrying the ISIN, inside the identity anchor.
    pub identity_label: String,
    /// Free-text description, inside the identity block.
    pub description_label: String,
    /// Pagination arrow present while more pages exist.
    pub next_page: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self::from_json(SELECTORS_JSON).expect("embedded selectors.json is valid")
    }
}

impl Selectors {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a replacement selector set from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ScrapeError::Config(format!("cannot read selectors {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }
}

/// Everything a run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub start_page: u32,
    /// Stop after this many page fetches even if a next page exists.
    pub max_pages: Option<u32>,
    /// Output path; `-` writes to stdout.
    pub output: PathBuf,
    pub wait: WaitPolicy,
    pub navigation_timeout_ms: u64,
    pub browser: BrowserOptions,
    pub selectors: Selectors,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            start_page: 0,
            max_pages: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            wait: WaitPolicy::default(),
            navigation_timeout_ms: 30_000,
            browser: BrowserOptions::default(),
            selectors: Selectors::default(),
        }
    }
}

impl ScrapeConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(p) = std::env::var(CHROMIUM_PATH_ENV) {
            if !p.trim().is_empty() {
                config.browser.chrome_path = Some(PathBuf::from(p));
            }
        }
        config
    }

    /// Reject values that cannot produce a meaningful crawl.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)
            .map_err(|e| ScrapeError::Config(format!("invalid base URL {}: {e}", self.base_url)))?;
        if self.max_pages == Some(0) {
            return Err(ScrapeError::Config("max_pages must be at least 1".into()));
        }
        if self.wait.poll_interval_ms == 0 {
            return Err(ScrapeError::Config("poll interval must be positive".into()));
        }
        Ok(())
    }

    /// Whether output goes to stdout instead of a file.
    pub fn writes_to_stdout(&self) -> bool {
        self.output.as_os_str() == "-"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_selectors_match_listing_markup() {
        let s = Selectors::default();
        assert_eq!(s.record_container, "article.u-hidden.-sm.-md");
        assert_eq!(s.field_block, "div.l-box");
        assert_eq!(s.identity_anchor, "a");
        assert_eq!(s.identity_label, "span.t-text");
        assert_eq!(s.description_label, "span.t-text.-normal");
        assert_eq!(s.next_page, "span.m-icon.-pagination-right");
    }

    #[test]
    fn defaults() {
        let c = ScrapeConfig::default();
        assert_eq!(c.base_url, DEFAULT_BASE_URL);
        assert_eq!(c.start_page, 0);
        assert_eq!(c.wait.timeout(), Duration::from_secs(10));
        assert_eq!(c.wait.poll_interval(), Duration::from_millis(500));
        assert!(c.browser.headless);
        assert!(!c.writes_to_stdout());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let c: ScrapeConfig =
            serde_json::from_str(r#"{"start_page": 3, "wait": {"timeout_ms": 250}}"#).unwrap();
        assert_eq!(c.start_page, 3);
        assert_eq!(c.wait.timeout_ms, 250);
        assert_eq!(c.wait.poll_interval_ms, 500);
        assert_eq!(c.selectors, Selectors::default());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut c = ScrapeConfig::default();
        c.base_url = "not a url".into();
        assert!(matches!(c.validate(), Err(ScrapeError::Config(_))));

        let mut c = ScrapeConfig::default();
        c.max_pages = Some(0);
        assert!(c.validate().is_err());

        let mut c = ScrapeConfig::default();
        c.wait.poll_interval_ms = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn selectors_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sel.json");
        let mut custom = Selectors::default();
        custom.next_page = "a.next".into();
        std::fs::write(&path, serde_json::to_string(&custom).unwrap()).unwrap();
        assert_eq!(Selectors::load(&path).unwrap().next_page, "a.next");

        assert!(matches!(
            Selectors::load(&dir.path().join("missing.json")),
            Err(ScrapeError::Config(_))
        ));
        std::fs::write(&path, "{").unwrap();
        assert!(matches!(Selectors::load(&path), Err(ScrapeError::Json(_))));
    }
}

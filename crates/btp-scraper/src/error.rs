//! Error types for the scraper.

/// All errors that can occur while scraping.
///
/// Only faults reach this type. A document lookup that times out is not an
/// error: the locator resolves it to an empty result.
#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    /// A required element is missing where the page markup guarantees it.
    #[error("Structural fault: {what} not found (selector `{selector}`)")]
    Structure {
        what: &'static str,
        selector: String,
    },

    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Navigation to {url} timed out after {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Browser not available: {0}")]
    BrowserUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScrapeError {
    pub fn structure(what: &'static str, selector: impl Into<String>) -> Self {
        ScrapeError::Structure {
            what,
            selector: selector.into(),
        }
    }

    /// Whether the page did not match the expected markup.
    pub fn is_structural(&self) -> bool {
        matches!(self, ScrapeError::Structure { .. })
    }

    /// Whether the fault only means the page was not ready in time.
    pub fn is_transient(&self) -> bool {
        matches!(self, ScrapeError::NavigationTimeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

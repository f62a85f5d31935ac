//! Chromium-based renderer using chromiumoxide.

use super::{DomNode, NavigationResult, RenderContext, Renderer};
use crate::config::{BrowserOptions, CHROMIUM_PATH_ENV};
use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Find the Chromium binary path.
pub fn find_chromium(explicit: Option<&Path>) -> Option<PathBuf> {
    // 1. Configured path
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        warn!("configured browser {} does not exist", path.display());
    }

    // 2. BTP_SCRAPER_CHROMIUM_PATH env
    if let Ok(p) = std::env::var(CHROMIUM_PATH_ENV) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

fn browser_err(context: &str) -> impl Fn(chromiumoxide::error::CdpError) -> ScrapeError + '_ {
    move |e| ScrapeError::Browser(format!("{context}: {e}"))
}

/// Chromium-based renderer. Owns the browser process until `shutdown`.
pub struct ChromiumRenderer {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromiumRenderer {
    /// Launch a Chromium instance configured by `options`.
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let chrome_path = find_chromium(options.chrome_path.as_deref()).ok_or_else(|| {
            ScrapeError::BrowserUnavailable(format!(
                "Chromium not found. Install Chrome or set {CHROMIUM_PATH_ENV}."
            ))
        })?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(&chrome_path)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");
        builder = if options.headless {
            builder.arg("--headless=new")
        } else {
            builder.with_head()
        };
        for arg in &options.extra_args {
            builder = builder.arg(arg.as_str());
        }
        let config = builder
            .build()
            .map_err(|e| ScrapeError::BrowserUnavailable(format!("bad browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::BrowserUnavailable(format!("failed to launch Chromium: {e}")))?;

        // Drive the CDP connection
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler event error: {e}");
                }
            }
        });

        info!("launched Chromium from {}", chrome_path.display());
        Ok(Self { browser, handler })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    type Context = ChromiumContext;

    async fn new_context(&self) -> Result<ChromiumContext> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(browser_err("failed to create new page"))?;
        Ok(ChromiumContext { page })
    }

    async fn shutdown(mut self) -> Result<()> {
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            warn!("waiting for Chromium to exit failed: {e}");
        }
        self.handler.abort();
        closed
            .map(|_| ())
            .map_err(browser_err("failed to close browser"))
    }
}

/// A single Chromium page context.
pub struct ChromiumContext {
    page: Page,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    type Node = ChromiumNode;

    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        let start = Instant::now();

        let result =
            tokio::time::timeout(Duration::from_millis(timeout_ms), self.page.goto(url)).await;

        match result {
            Ok(Ok(_)) => {
                let final_url = self
                    .page
                    .url()
                    .await
                    .ok()
                    .flatten()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| url.to_string());

                Ok(NavigationResult {
                    final_url,
                    load_time_ms: start.elapsed().as_millis() as u64,
                })
            }
            Ok(Err(e)) => Err(ScrapeError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(ScrapeError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms,
            }),
        }
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ChromiumNode>> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(browser_err("document query failed"))?;
        Ok(elements.into_iter().map(ChromiumNode).collect())
    }

    async fn close(self) -> Result<()> {
        self.page
            .close()
            .await
            .map_err(browser_err("failed to close page"))
    }
}

/// A live element handle inside a Chromium page.
pub struct ChromiumNode(Element);

#[async_trait]
impl DomNode for ChromiumNode {
    async fn query_all(&self, selector: &str) -> Result<Vec<ChromiumNode>> {
        let elements = self
            .0
            .find_elements(selector)
            .await
            .map_err(browser_err("element query failed"))?;
        Ok(elements.into_iter().map(ChromiumNode).collect())
    }

    async fn text_content(&self) -> Result<String> {
        Ok(self.property("textContent").await?.unwrap_or_default())
    }

    async fn property(&self, name: &str) -> Result<Option<String>> {
        let value = self
            .0
            .property(name)
            .await
            .map_err(browser_err("failed to read element property"))?;
        Ok(match value {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        })
    }
}

//! Renderer abstraction for browser-based page rendering.
//!
//! Defines the `Renderer`, `RenderContext` and `DomNode` traits that abstract
//! over the engine that executes the listing's scripts and resolves CSS
//! selectors. Two engines exist: Chromium via chromiumoxide, and an offline
//! snapshot engine that serves captured HTML.

pub mod chromium;
pub mod snapshot;

use crate::error::Result;
use async_trait::async_trait;

/// Result of navigating to a URL.
#[derive(Debug, Clone)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// A browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    type Context: RenderContext;

    /// Create a new browser context (tab).
    async fn new_context(&self) -> Result<Self::Context>;
    /// Shut down the engine and release its process.
    async fn shutdown(self) -> Result<()>;
}

/// A single browser context (tab) for rendering pages.
#[async_trait]
pub trait RenderContext: Send + Sync {
    type Node: DomNode;

    /// Navigate to a URL with a timeout.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;
    /// Query the whole document once, without waiting.
    async fn query_all(&self, selector: &str) -> Result<Vec<Self::Node>>;
    /// Close this context.
    async fn close(self) -> Result<()>;
}

/// An element of a rendered page.
#[async_trait]
pub trait DomNode: Send + Sync + Sized {
    /// Query this element's descendants once, without waiting.
    async fn query_all(&self, selector: &str) -> Result<Vec<Self>>;
    /// The DOM `textContent` of the element.
    async fn text_content(&self) -> Result<String>;
    /// A DOM property, resolved the way the browser exposes it (`href` is
    /// absolute, and empty on an anchor without the attribute). `None` when
    /// the property is unset or null.
    async fn property(&self, name: &str) -> Result<Option<String>>;
}

//! Offline renderer that serves captured HTML instead of driving a browser.
//!
//! Pages are registered by URL. Selector resolution uses the `scraper`
//! crate, so the engine sees the same CSS contract it sees in Chromium, but
//! no scripts run: a snapshot must hold the already-rendered markup.
//!
//! Every navigation, context close and shutdown is recorded in a shared
//! [`SnapshotLog`] that outlives the renderer.

use super::{DomNode, NavigationResult, RenderContext, Renderer};
use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

/// What happened during a snapshot session.
#[derive(Debug, Default)]
pub struct SnapshotLog {
    visits: Mutex<Vec<String>>,
    contexts_closed: AtomicUsize,
    shut_down: AtomicBool,
}

impl SnapshotLog {
    /// URLs navigated to, in order.
    pub fn visits(&self) -> Vec<String> {
        self.visits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn contexts_closed(&self) -> usize {
        self.contexts_closed.load(Ordering::SeqCst)
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    fn record_visit(&self, url: &str) {
        self.visits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());
    }
}

/// Renderer backed by a fixed set of HTML documents.
#[derive(Debug, Default)]
pub struct SnapshotRenderer {
    pages: HashMap<String, String>,
    stalled: HashSet<String>,
    log: Arc<SnapshotLog>,
}

impl SnapshotRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` when `url` is requested.
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Make navigation to `url` time out.
    pub fn with_stalled_page(mut self, url: impl Into<String>) -> Self {
        self.stalled.insert(url.into());
        self
    }

    /// Shared handle on the session log.
    pub fn log(&self) -> Arc<SnapshotLog> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl Renderer for SnapshotRenderer {
    type Context = SnapshotContext;

    async fn new_context(&self) -> Result<SnapshotContext> {
        Ok(SnapshotContext {
            pages: self.pages.clone(),
            stalled: self.stalled.clone(),
            log: Arc::clone(&self.log),
            current: None,
        })
    }

    async fn shutdown(self) -> Result<()> {
        self.log.shut_down.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// A tab over the snapshot set.
pub struct SnapshotContext {
    pages: HashMap<String, String>,
    stalled: HashSet<String>,
    log: Arc<SnapshotLog>,
    current: Option<(String, String)>,
}

#[async_trait]
impl RenderContext for SnapshotContext {
    type Node = SnapshotNode;

    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        self.log.record_visit(url);
        if self.stalled.contains(url) {
            self.current = None;
            return Err(ScrapeError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms,
            });
        }
        let html = self.pages.get(url).ok_or_else(|| ScrapeError::Navigation {
            url: url.to_string(),
            reason: "no snapshot for this URL".into(),
        })?;
        self.current = Some((url.to_string(), html.clone()));
        Ok(NavigationResult {
            final_url: url.to_string(),
            load_time_ms: 0,
        })
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<SnapshotNode>> {
        match &self.current {
            Some((url, html)) => select_in_document(html, url, selector),
            None => {
                parse_selector(selector)?;
                Ok(Vec::new())
            }
        }
    }

    async fn close(self) -> Result<()> {
        self.log.contexts_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// An element captured as its outer HTML plus the URL of its page.
#[derive(Debug, Clone)]
pub struct SnapshotNode {
    html: String,
    page_url: String,
}

#[async_trait]
impl DomNode for SnapshotNode {
    async fn query_all(&self, selector: &str) -> Result<Vec<SnapshotNode>> {
        let selector = parse_selector(selector)?;
        let fragment = Html::parse_fragment(&self.html);
        Ok(fragment_root(&fragment)
            .map(|root| {
                root.select(&selector)
                    .map(|el| self.child(el.html()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn text_content(&self) -> Result<String> {
        let fragment = Html::parse_fragment(&self.html);
        Ok(fragment_root(&fragment)
            .map(|root| root.text().collect())
            .unwrap_or_default())
    }

    async fn property(&self, name: &str) -> Result<Option<String>> {
        if name == "textContent" {
            return self.text_content().await.map(Some);
        }
        let fragment = Html::parse_fragment(&self.html);
        let Some(root) = fragment_root(&fragment) else {
            return Ok(None);
        };
        let value = root.value().attr(name).map(str::to_string);
        Ok(match (name, value) {
            ("href" | "src", Some(raw)) => Some(resolve(&self.page_url, &raw)),
            // an anchor without the attribute reports an empty href
            ("href", None) if root.value().name() == "a" => Some(String::new()),
            (_, value) => value,
        })
    }
}

impl SnapshotNode {
    fn child(&self, html: String) -> SnapshotNode {
        SnapshotNode {
            html,
            page_url: self.page_url.clone(),
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScrapeError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn select_in_document(html: &str, url: &str, selector: &str) -> Result<Vec<SnapshotNode>> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);
    Ok(document
        .select(&selector)
        .map(|el| SnapshotNode {
            html: el.html(),
            page_url: url.to_string(),
        })
        .collect())
}

/// The element a fragment was parsed from (the parser wraps it in `<html>`).
fn fragment_root(fragment: &Html) -> Option<ElementRef<'_>> {
    fragment.root_element().children().find_map(ElementRef::wrap)
}

/// Resolve a link the way the DOM `href` property does.
fn resolve(page_url: &str, raw: &str) -> String {
    Url::parse(page_url)
        .and_then(|base| base.join(raw))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| raw.to_string())
}

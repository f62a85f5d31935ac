//! Element lookup with a bounded wait.
//!
//! Document-scope lookups race the page's own scripts, so they poll until
//! the selector matches or the wait budget runs out. Running out of budget
//! resolves to "absent" (or an empty list), never to an error.
//!
//! Element-scope lookups query content that is already rendered: they run
//! exactly once and return whatever matched.

use crate::config::WaitPolicy;
use crate::error::Result;
use crate::renderer::{DomNode, RenderContext};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Where a lookup starts.
pub enum Scope<'a, C: RenderContext> {
    /// The whole document; the wait policy applies.
    Document(&'a C),
    /// Descendants of one element; no wait.
    Element(&'a C::Node),
    /// Descendants of each element, concatenated in order; no wait.
    Elements(&'a [C::Node]),
}

/// Finds elements for a render context under an explicit wait policy.
#[derive(Debug, Clone, Copy)]
pub struct Locator {
    policy: WaitPolicy,
}

impl Locator {
    pub fn new(policy: WaitPolicy) -> Self {
        Self { policy }
    }

    /// First element matching `selector`, or `None`.
    pub async fn locate<C: RenderContext>(
        &self,
        selector: &str,
        scope: Scope<'_, C>,
    ) -> Result<Option<C::Node>> {
        self.locate_within(selector, scope, self.policy.timeout())
            .await
    }

    /// Like [`Locator::locate`] with a one-off wait budget.
    pub async fn locate_within<C: RenderContext>(
        &self,
        selector: &str,
        scope: Scope<'_, C>,
        timeout: Duration,
    ) -> Result<Option<C::Node>> {
        Ok(self
            .locate_all_within(selector, scope, timeout)
            .await?
            .into_iter()
            .next())
    }

    /// All elements matching `selector`; empty when nothing matched.
    pub async fn locate_all<C: RenderContext>(
        &self,
        selector: &str,
        scope: Scope<'_, C>,
    ) -> Result<Vec<C::Node>> {
        self.locate_all_within(selector, scope, self.policy.timeout())
            .await
    }

    /// Like [`Locator::locate_all`] with a one-off wait budget.
    pub async fn locate_all_within<C: RenderContext>(
        &self,
        selector: &str,
        scope: Scope<'_, C>,
        timeout: Duration,
    ) -> Result<Vec<C::Node>> {
        match scope {
            Scope::Document(ctx) => self.wait_for_all(ctx, selector, timeout).await,
            Scope::Element(node) => node.query_all(selector).await,
            Scope::Elements(nodes) => {
                let mut found = Vec::new();
                for node in nodes {
                    found.extend(node.query_all(selector).await?);
                }
                Ok(found)
            }
        }
    }

    async fn wait_for_all<C: RenderContext>(
        &self,
        ctx: &C,
        selector: &str,
        timeout: Duration,
    ) -> Result<Vec<C::Node>> {
        let deadline = Instant::now() + timeout;
        let mut polls = 0u32;
        loop {
            let found = ctx.query_all(selector).await?;
            polls += 1;
            if !found.is_empty() {
                debug!(selector, count = found.len(), polls, "selector matched");
                return Ok(found);
            }

            let now = Instant::now();
            if now >= deadline {
                debug!(selector, timeout_ms = timeout.as_millis() as u64, "selector absent");
                return Ok(Vec::new());
            }
            tokio::time::sleep(self.policy.poll_interval().min(deadline - now)).await;
        }
    }
}

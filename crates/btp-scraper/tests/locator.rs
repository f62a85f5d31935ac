//! Element locator: bounded document waits and immediate scoped lookups.

mod common;

use btp_scraper::renderer::snapshot::{SnapshotContext, SnapshotRenderer};
use btp_scraper::renderer::{DomNode, RenderContext, Renderer};
use btp_scraper::{Locator, Scope, ScrapeError, WaitPolicy};
use common::*;
use std::time::{Duration, Instant};

async fn context_on(html: String) -> SnapshotContext {
    let renderer = SnapshotRenderer::new().with_page(page_url(0), html);
    let mut ctx = renderer.new_context().await.unwrap();
    ctx.navigate(&page_url(0), 1000).await.unwrap();
    ctx
}

fn locator(timeout_ms: u64) -> Locator {
    Locator::new(WaitPolicy {
        timeout_ms,
        poll_interval_ms: 10,
    })
}

fn two_listings() -> String {
    listing_page(
        &[
            Listing::new("IT0005215246", "Btp Tf 3,625% Nv26", &metrics_html("109,15", "3,625", "01/11/2026")),
            Listing::new("IT0005094088", "Btp Tf 1,65% Mz32", &metrics_html("88,02", "1,65", "01/03/2032")),
        ],
        true,
    )
}

#[tokio::test]
async fn document_lookup_finds_rendered_elements() {
    let ctx = context_on(two_listings()).await;
    let loc = locator(1_000);

    let start = Instant::now();
    let articles = loc
        .locate_all("article.u-hidden.-sm.-md", Scope::Document(&ctx))
        .await
        .unwrap();
    assert_eq!(articles.len(), 2);
    assert!(start.elapsed() < Duration::from_millis(500));

    let next = loc
        .locate("span.m-icon.-pagination-right", Scope::Document(&ctx))
        .await
        .unwrap();
    assert!(next.is_some());
}

#[tokio::test]
async fn document_lookup_times_out_to_absent() {
    let ctx = context_on(listing_page(&[], false)).await;
    let loc = locator(80);

    let start = Instant::now();
    let next = loc
        .locate("span.m-icon.-pagination-right", Scope::Document(&ctx))
        .await
        .unwrap();
    assert!(next.is_none());
    assert!(start.elapsed() >= Duration::from_millis(80));

    let all = loc
        .locate_all("article.u-hidden.-sm.-md", Scope::Document(&ctx))
        .await
        .unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn per_call_timeout_overrides_policy() {
    let ctx = context_on(listing_page(&[], false)).await;
    let loc = locator(60_000);

    let start = Instant::now();
    let found = loc
        .locate_within("table.quotes", Scope::Document(&ctx), Duration::from_millis(30))
        .await
        .unwrap();
    assert!(found.is_none());
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn scoped_lookup_does_not_wait() {
    let ctx = context_on(two_listings()).await;
    let loc = locator(60_000);
    let articles = loc
        .locate_all("article.u-hidden.-sm.-md", Scope::Document(&ctx))
        .await
        .unwrap();

    let start = Instant::now();
    let missing = loc
        .locate("table", Scope::<SnapshotContext>::Element(&articles[0]))
        .await
        .unwrap();
    assert!(missing.is_none());
    assert!(start.elapsed() < Duration::from_secs(5));

    let blocks = loc
        .locate_all("div.l-box", Scope::<SnapshotContext>::Element(&articles[1]))
        .await
        .unwrap();
    assert_eq!(blocks.len(), 2);
    assert!(blocks[1].text_content().await.unwrap().contains("88,02"));
}

#[tokio::test]
async fn element_sequence_scope_concatenates_in_order() {
    let ctx = context_on(two_listings()).await;
    let loc = locator(1_000);
    let articles = loc
        .locate_all("article.u-hidden.-sm.-md", Scope::Document(&ctx))
        .await
        .unwrap();

    let labels = loc
        .locate_all("span.t-text.-normal", Scope::<SnapshotContext>::Elements(&articles))
        .await
        .unwrap();
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[0].text_content().await.unwrap().trim(), "Btp Tf 3,625% Nv26");
    assert_eq!(labels[1].text_content().await.unwrap().trim(), "Btp Tf 1,65% Mz32");
}

#[tokio::test]
async fn invalid_selector_propagates() {
    let ctx = context_on(two_listings()).await;
    let loc = locator(1_000);

    let err = loc
        .locate("article[", Scope::Document(&ctx))
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::InvalidSelector { .. }));

    let articles = ctx.query_all("article").await.unwrap();
    let err = loc
        .locate_all("div..l-box", Scope::<SnapshotContext>::Element(&articles[0]))
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::InvalidSelector { .. }));
}

//! Record extraction from one listing container.

use super::fields::{canonical_url, clean_isin, normalize_block_text, parse_metrics};
use crate::config::Selectors;
use crate::error::{Result, ScrapeError};
use crate::locator::{Locator, Scope};
use crate::renderer::{DomNode, RenderContext};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One bond listing. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub isin: String,
    pub isin_url: String,
    pub descrizione: String,
    pub cedola: Option<f64>,
    pub ultimo: Option<f64>,
    pub scadenza: Option<String>,
}

/// Column names, in output order.
pub const RECORD_FIELDS: [&str; 6] = [
    "isin",
    "isin_url",
    "descrizione",
    "cedola",
    "ultimo",
    "scadenza",
];

/// Turns record containers into [`Record`]s.
///
/// The identity fields are required: a container that lacks them means the
/// page layout changed, and extraction fails with a structural fault.
pub struct RecordExtractor<'a> {
    locator: &'a Locator,
    selectors: &'a Selectors,
}

impl<'a> RecordExtractor<'a> {
    pub fn new(locator: &'a Locator, selectors: &'a Selectors) -> Self {
        Self { locator, selectors }
    }

    pub async fn extract<C: RenderContext>(&self, container: &C::Node) -> Result<Record> {
        let s = self.selectors;

        let mut blocks = self
            .locator
            .locate_all(&s.field_block, Scope::<C>::Element(container))
            .await?
            .into_iter();
        let identity = blocks
            .next()
            .ok_or_else(|| ScrapeError::structure("identity block", &s.field_block))?;
        let metrics_block = blocks
            .next()
            .ok_or_else(|| ScrapeError::structure("metrics block", &s.field_block))?;

        let anchor = self
            .locator
            .locate(&s.identity_anchor, Scope::<C>::Element(&identity))
            .await?
            .ok_or_else(|| ScrapeError::structure("identity anchor", &s.identity_anchor))?;

        let label = self
            .locator
            .locate(&s.identity_label, Scope::<C>::Element(&anchor))
            .await?
            .ok_or_else(|| ScrapeError::structure("ISIN label", &s.identity_label))?;
        let isin = clean_isin(&label.text_content().await?);

        let href = anchor
            .property("href")
            .await?
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ScrapeError::structure("identity link target", &s.identity_anchor))?;
        let isin_url = canonical_url(&href).to_string();

        let description = self
            .locator
            .locate(&s.description_label, Scope::<C>::Element(&identity))
            .await?
            .ok_or_else(|| ScrapeError::structure("description label", &s.description_label))?;
        let descrizione = description.text_content().await?.trim().to_string();

        let line = normalize_block_text(&metrics_block.text_content().await?);
        let metrics = parse_metrics(&line);

        debug!(isin = %isin, metrics = %line, "extracted record");
        Ok(Record {
            isin,
            isin_url,
            descrizione,
            cedola: metrics.cedola,
            ultimo: metrics.ultimo,
            scadenza: metrics.scadenza,
        })
    }
}

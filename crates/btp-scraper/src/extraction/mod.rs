//! Listing extraction: DOM traversal in [`record`], text parsing in
//! [`fields`].

pub mod fields;
pub mod record;

pub use fields::{canonical_url, clean_isin, normalize_block_text, parse_metrics, Metrics};
pub use record::{Record, RecordExtractor, RECORD_FIELDS};

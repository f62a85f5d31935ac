//! Text-level field parsing, independent of any DOM.
//!
//! The metrics block of a listing renders as a handful of labelled values
//! spread over several lines. [`normalize_block_text`] flattens it to one
//! line and [`parse_metrics`] pulls the labelled tokens out of that line.

use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

/// Marker trailing the ISIN in the identity label.
pub const ISIN_MARKER: &str = " -";

/// Values read from one normalized metrics line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics {
    pub cedola: Option<f64>,
    pub ultimo: Option<f64>,
    pub scadenza: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum FieldKind {
    /// Digits with `,` as decimal separator.
    Decimal,
    /// The matched token, kept verbatim.
    Literal,
}

struct FieldPattern {
    key: &'static str,
    regex: Regex,
    kind: FieldKind,
}

fn patterns() -> &'static [FieldPattern; 3] {
    static PATTERNS: OnceLock<[FieldPattern; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            FieldPattern {
                key: "cedola",
                regex: Regex::new(r"Cedola: ([\d,]+)").expect("cedola regex is valid"),
                kind: FieldKind::Decimal,
            },
            FieldPattern {
                key: "ultimo",
                regex: Regex::new(r"Ultimo: ([\d,]+)").expect("ultimo regex is valid"),
                kind: FieldKind::Decimal,
            },
            FieldPattern {
                key: "scadenza",
                regex: Regex::new(r"Scadenza: (\d+/\d+/\d+)").expect("scadenza regex is valid"),
                kind: FieldKind::Literal,
            },
        ]
    })
}

/// Collapse every whitespace run to one space and trim.
pub fn normalize_block_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a decimal written with a comma separator (`109,15`).
pub fn parse_decimal_comma(token: &str) -> Option<f64> {
    token.replace(',', ".").parse::<f64>().ok()
}

/// Extract coupon, last price and maturity from a normalized metrics line.
///
/// Each field is matched on its own; a missing label leaves that field
/// `None` without affecting the others.
pub fn parse_metrics(line: &str) -> Metrics {
    let mut metrics = Metrics::default();
    for pattern in patterns() {
        let Some(token) = pattern
            .regex
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
        else {
            continue;
        };

        match (pattern.key, pattern.kind) {
            (key, FieldKind::Decimal) => {
                let value = parse_decimal_comma(token);
                if value.is_none() {
                    warn!(field = key, token, "unparsable decimal in metrics line");
                }
                if key == "cedola" {
                    metrics.cedola = value;
                } else {
                    metrics.ultimo = value;
                }
            }
            (_, FieldKind::Literal) => metrics.scadenza = Some(token.to_string()),
        }
    }
    metrics
}

/// Strip the trailing marker and surrounding whitespace from an ISIN label.
pub fn clean_isin(label: &str) -> String {
    label.replace(ISIN_MARKER, "").trim().to_string()
}

/// Drop the query string (everything from the first `?`).
pub fn canonical_url(href: &str) -> &str {
    href.split('?').next().unwrap_or(href)
}

//! Shared test utilities.
//!
//! Provides a fixed clock, sample documents, the fixture dataset, and
//! assertions over rendered HTML.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let source = fixture_source();
//! let ctx = PageContext::new(&config, fixed_now());
//! let html = render_route(&source, &ctx, &Route::Events).await?.markup.into_string();
//! assert_no_chrome(&studio_html);
//! ```

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};

use crate::portable_text::Block;
use crate::source::LocalSource;
use crate::types::{EventDoc, Slug};

const FIXTURE_DATASET: &str = include_str!("../fixtures/dataset.ndjson");

// =========================================================================
// Clock and documents
// =========================================================================

/// The moment every rendering test runs at: 1 June 2025, midday UTC.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

/// A minimal away event with a date and nothing optional set.
pub fn sample_event(slug: &str) -> EventDoc {
    EventDoc {
        id: format!("event-{slug}"),
        title: format!("Sample {slug}"),
        slug: Slug::new(slug),
        event_type: Some("competition".into()),
        date: Some(Utc.with_ymd_and_hms(2025, 7, 12, 10, 0, 0).unwrap()),
        ..EventDoc::default()
    }
}

/// One plain paragraph block per entry.
pub fn text_blocks(paragraphs: &[&str]) -> Vec<Block> {
    let raw: Vec<Value> = paragraphs
        .iter()
        .map(|text| {
            json!({
                "_type": "block",
                "style": "normal",
                "markDefs": [],
                "children": [{"_type": "span", "text": text, "marks": []}]
            })
        })
        .collect();
    serde_json::from_value(Value::Array(raw)).unwrap()
}

// =========================================================================
// Fixture dataset
// =========================================================================

/// The dataset export under `fixtures/`, loaded in memory.
pub fn fixture_source() -> LocalSource {
    LocalSource::from_ndjson(FIXTURE_DATASET).unwrap()
}

/// Find a raw fixture document by `_id`. Panics if not found.
pub fn fixture_document(id: &str) -> Value {
    FIXTURE_DATASET
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str::<Value>(l).unwrap())
        .find(|d| d["_id"] == id)
        .unwrap_or_else(|| panic!("fixture document '{id}' not found"))
}

// =========================================================================
// HTML assertions
// =========================================================================

/// Assert the page carries no site header, navigation or footer.
pub fn assert_no_chrome(html: &str) {
    for marker in ["site-header", "site-nav", "site-footer"] {
        assert!(
            !html.contains(&format!(r#"class="{marker}""#)),
            "expected bare document, found {marker}"
        );
    }
}

/// Assert `needles` occur in `html` in the given order.
pub fn assert_in_order(html: &str, needles: &[&str]) {
    let mut from = 0;
    for needle in needles {
        match html[from..].find(needle) {
            Some(pos) => from += pos + needle.len(),
            None => panic!("'{needle}' not found after byte {from}. Expected order: {needles:?}"),
        }
    }
}

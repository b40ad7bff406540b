//! Feed parsing: `item` elements to flat records plus an inferred schema.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, info_span};

use feed_model::{FeedData, Record, SchemaEntry};

use crate::error::{IngestError, Result};
use crate::xml::{Element, parse_document};

/// Tag name of a repeated product element.
pub const ITEM_TAG: &str = "item";

const REQUIRED_ATTR: &str = "required";
const DESCRIPTION_ATTR: &str = "description";

/// Parses a feed document.
///
/// Every `item` element at any depth becomes one record. Direct children with
/// non-empty text become fields; children without text are left out of the
/// record but still contribute to the schema. A document without `item`
/// elements yields an empty feed.
pub fn parse_feed(xml: &str) -> Result<FeedData> {
    let span = info_span!("parse_feed", bytes = xml.len());
    let _guard = span.enter();

    let root = parse_document(xml)?;
    let items = root.elements_named(ITEM_TAG);
    let records: Vec<Record> = items.iter().map(|item| item_record(item)).collect();
    let schema = infer_schema(&items);

    debug!(
        records = records.len(),
        fields = schema.len(),
        "parsed feed"
    );
    Ok(FeedData { records, schema })
}

/// Parses a feed from raw bytes. A UTF-8 byte order mark is skipped.
pub fn parse_feed_bytes(bytes: &[u8]) -> Result<FeedData> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let text = std::str::from_utf8(bytes).map_err(|e| IngestError::Encoding {
        offset: e.valid_up_to(),
    })?;
    parse_feed(text)
}

/// Reads and parses a feed file.
pub fn read_feed(path: &Path) -> Result<FeedData> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_feed_bytes(&bytes)
}

/// Number of `item` elements in a feed document.
pub fn count_items(xml: &str) -> Result<usize> {
    let root = parse_document(xml)?;
    Ok(root.elements_named(ITEM_TAG).len())
}

fn item_record(item: &Element) -> Record {
    let mut record = Record::new();
    for child in item.child_elements() {
        let text = child.text_content();
        if !text.is_empty() {
            record.insert(child.name.clone(), text);
        }
    }
    record
}

/// First sighting of a tag name defines its schema entry.
fn infer_schema(items: &[&Element]) -> Vec<SchemaEntry> {
    let mut seen = BTreeSet::new();
    let mut schema = Vec::new();
    for item in items {
        for child in item.child_elements() {
            if !seen.insert(child.name.as_str()) {
                continue;
            }
            schema.push(SchemaEntry {
                name: child.name.clone(),
                required: child.has_attribute(REQUIRED_ATTR),
                help_text: child
                    .attribute(DESCRIPTION_ATTR)
                    .filter(|text| !text.is_empty())
                    .map(str::to_string),
            });
        }
    }
    schema
}

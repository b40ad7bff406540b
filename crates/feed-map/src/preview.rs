//! Preview of one target field across a record set.
//!
//! A preview pairs every source record with the value the draft mapping set
//! produces for a chosen target field, next to the record's own value for a
//! field of the same name.

use serde::Serialize;
use tracing::debug;

use feed_model::{MappingSet, Record};

use crate::engine::apply_mappings;
use crate::error::{MappingError, Result};
use crate::utils::field_options;

/// Default number of rows per preview page.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Label used when no label field exists.
pub const FALLBACK_LABEL: &str = "Product";

const IDENTIFIER_HINTS: &[&str] = &["id", "sku", "code"];
const LABEL_HINTS: &[&str] = &["title", "name", "product"];

/// Fields chosen to identify and label records in a preview.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordIdentity {
    pub identifier_field: Option<String>,
    pub label_field: Option<String>,
}

impl RecordIdentity {
    /// Identifier of the record at `index` (0-based).
    pub fn identifier(&self, record: &Record, index: usize) -> String {
        self.identifier_field
            .as_deref()
            .and_then(|field| record.get(field))
            .filter(|value| !value.is_empty())
            .map_or_else(|| format!("ITEM_{}", index + 1), str::to_string)
    }

    pub fn label(&self, record: &Record) -> String {
        self.label_field
            .as_deref()
            .and_then(|field| record.get(field))
            .filter(|value| !value.is_empty())
            .unwrap_or(FALLBACK_LABEL)
            .to_string()
    }
}

/// Picks identifier and label fields from a list of field names.
///
/// The first name containing `id`, `sku` or `code` (case-insensitive) is the
/// identifier; the first containing `title`, `name` or `product` is the label.
pub fn infer_record_identity<I, S>(field_names: I) -> RecordIdentity
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut identity = RecordIdentity::default();
    for name in field_names {
        let name = name.as_ref();
        let lower = name.to_lowercase();
        if identity.identifier_field.is_none() && contains_any(&lower, IDENTIFIER_HINTS) {
            identity.identifier_field = Some(name.to_string());
        }
        if identity.label_field.is_none() && contains_any(&lower, LABEL_HINTS) {
            identity.label_field = Some(name.to_string());
        }
        if identity.identifier_field.is_some() && identity.label_field.is_some() {
            break;
        }
    }
    identity
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// One line of a preview. Empty values are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRow {
    pub record_id: String,
    pub record_label: String,
    pub target_field: String,
    pub original_value: Option<String>,
    pub mapped_value: Option<String>,
}

/// Builds one preview row per record for `target_field`.
///
/// Mapping application is done once for the whole record set; the result
/// must line up with the input positionally.
pub fn build_preview(
    records: &[Record],
    mappings: &MappingSet,
    target_field: &str,
) -> Result<Vec<PreviewRow>> {
    let mapped = apply_mappings(records, mappings);
    if mapped.len() != records.len() {
        return Err(MappingError::EngineCompute {
            message: format!(
                "mapped {} records from {} source records",
                mapped.len(),
                records.len()
            ),
        });
    }

    let identity = infer_record_identity(field_options(records));
    debug!(
        target_field,
        identifier = ?identity.identifier_field,
        label = ?identity.label_field,
        "building preview"
    );

    let rows = records
        .iter()
        .zip(&mapped)
        .enumerate()
        .map(|(index, (record, out))| PreviewRow {
            record_id: identity.identifier(record, index),
            record_label: identity.label(record),
            target_field: target_field.to_string(),
            original_value: non_empty(record.get(target_field)),
            mapped_value: non_empty(out.get(target_field)),
        })
        .collect();
    Ok(rows)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Paged view over preview rows.
#[derive(Debug, Clone)]
pub struct PreviewPage {
    rows: Vec<PreviewRow>,
    page_size: usize,
}

impl PreviewPage {
    /// A page size of zero is treated as one.
    pub fn new(rows: Vec<PreviewRow>, page_size: usize) -> Self {
        Self {
            rows,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn rows(&self) -> &[PreviewRow] {
        &self.rows
    }

    /// Number of pages; an empty preview still has one (empty) page.
    pub fn total_pages(&self) -> usize {
        self.rows.len().div_ceil(self.page_size).max(1)
    }

    /// Rows of page `number` (1-based). Out-of-range pages are empty.
    pub fn page(&self, number: usize) -> &[PreviewRow] {
        if number == 0 {
            return &[];
        }
        let start = (number - 1).saturating_mul(self.page_size);
        if start >= self.rows.len() {
            return &[];
        }
        let end = (start + self.page_size).min(self.rows.len());
        &self.rows[start..end]
    }
}

impl From<Vec<PreviewRow>> for PreviewPage {
    fn from(rows: Vec<PreviewRow>) -> Self {
        Self::new(rows, DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_names_win() {
        let identity = infer_record_identity(["color", "product_code", "sku", "Title"]);
        assert_eq!(identity.identifier_field.as_deref(), Some("product_code"));
        assert_eq!(identity.label_field.as_deref(), Some("product_code"));
    }

    #[test]
    fn matching_ignores_case() {
        let identity = infer_record_identity(["SKU", "NAME"]);
        assert_eq!(identity.identifier_field.as_deref(), Some("SKU"));
        assert_eq!(identity.label_field.as_deref(), Some("NAME"));
    }

    #[test]
    fn no_match_falls_back() {
        let identity = infer_record_identity(Vec::<String>::new());
        let record = Record::new();
        assert_eq!(identity.identifier(&record, 2), "ITEM_3");
        assert_eq!(identity.label(&record), FALLBACK_LABEL);
    }

    #[test]
    fn paging_bounds() {
        let rows: Vec<PreviewRow> = (0..7)
            .map(|i| PreviewRow {
                record_id: i.to_string(),
                record_label: FALLBACK_LABEL.to_string(),
                target_field: "id".to_string(),
                original_value: None,
                mapped_value: None,
            })
            .collect();
        let pages = PreviewPage::from(rows);
        assert_eq!(pages.total_pages(), 2);
        assert_eq!(pages.page(1).len(), 5);
        assert_eq!(pages.page(2).len(), 2);
        assert!(pages.page(0).is_empty());
        assert!(pages.page(3).is_empty());
        assert_eq!(PreviewPage::new(Vec::new(), 0).total_pages(), 1);
    }
}

//! Utility functions for mapping operations.

use std::collections::BTreeSet;

use feed_model::{Mapping, MappingSet, Record};

/// Distinct field names across all records, in first-seen order.
pub fn field_options(records: &[Record]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut fields = Vec::new();
    for record in records {
        for name in record.field_names() {
            if seen.insert(name) {
                fields.push(name.to_string());
            }
        }
    }
    fields
}

/// One rename mapping per field, each field mapped onto itself.
///
/// Blank names are skipped.
pub fn identity_mappings<I, S>(fields: I) -> MappingSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .filter_map(|field| {
            let field = field.as_ref();
            Mapping::rename(field, field).ok()
        })
        .collect()
}
